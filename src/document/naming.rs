//! Collision-free document naming
//!
//! Candidates run `base.ext`, `base (1).ext`, `base (2).ext`, ... and the
//! first one the container does not already hold wins.

use crate::types::{PrepareError, Result};

/// Default ceiling on candidates tried before giving up
pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// Format the `n`th candidate name. `n == 0` is the bare name.
pub fn candidate_name(base: &str, extension: &str, n: usize) -> String {
    if n == 0 {
        format!("{}.{}", base, extension)
    } else {
        format!("{} ({}).{}", base, n, extension)
    }
}

/// Iterator over candidate names, bounded by `max_attempts`
pub fn candidates<'a>(
    base: &'a str,
    extension: &'a str,
    max_attempts: usize,
) -> impl Iterator<Item = String> + 'a {
    (0..max_attempts).map(move |n| candidate_name(base, extension, n))
}

/// Allocate a name using a synchronous existence check
pub fn allocate_with<F>(
    base: &str,
    extension: &str,
    max_attempts: usize,
    mut exists: F,
) -> Result<String>
where
    F: FnMut(&str) -> bool,
{
    candidates(base, extension, max_attempts)
        .find(|name| !exists(name.as_str()))
        .ok_or_else(|| exhausted(base, max_attempts))
}

pub(crate) fn exhausted(base: &str, attempts: usize) -> PrepareError {
    PrepareError::NameExhausted {
        base: base.to_string(),
        attempts,
    }
}
