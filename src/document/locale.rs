//! Locale resolution for templates and message bundles

/// Locales that ship empty-document templates and message bundles
pub const SUPPORTED_LOCALES: &[&str] = &["de", "en", "es", "fr", "it", "ru"];

/// Fallback locale code
pub const DEFAULT_LOCALE: &str = "en";

/// Extract the primary language subtag of a BCP 47 style tag.
///
/// Accepts `-` or `_` separators. The subtag must be 2 or 3 ASCII letters,
/// anything else yields `None`.
pub fn primary_subtag(tag: &str) -> Option<String> {
    let primary = tag.trim().split(['-', '_']).next()?;
    let valid = (2..=3).contains(&primary.len()) && primary.chars().all(|c| c.is_ascii_alphabetic());
    valid.then(|| primary.to_ascii_lowercase())
}

/// Maps requested locale tags onto supported template locales
#[derive(Debug, Clone)]
pub struct LocaleResolver {
    default: String,
}

impl LocaleResolver {
    /// Create a resolver with the given fallback code.
    ///
    /// An unsupported fallback is replaced by [`DEFAULT_LOCALE`].
    pub fn new(default: &str) -> Self {
        let default = primary_subtag(default)
            .filter(|code| SUPPORTED_LOCALES.contains(&code.as_str()))
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string());
        Self { default }
    }

    pub fn default_locale(&self) -> &str {
        &self.default
    }

    /// Resolve a requested tag to a supported locale code
    pub fn resolve(&self, requested: &str) -> String {
        primary_subtag(requested)
            .filter(|code| SUPPORTED_LOCALES.contains(&code.as_str()))
            .unwrap_or_else(|| self.default.clone())
    }
}

impl Default for LocaleResolver {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

/// Pick the preferred tag from an `Accept-Language` header.
///
/// Entries are ranked by their `q` weight (default 1.0); ties keep header
/// order. Wildcards, zero-weight entries and malformed weights are skipped.
pub fn from_accept_language(header: &str) -> Option<String> {
    let mut best: Option<(f32, &str)> = None;

    for entry in header.split(',') {
        let mut parts = entry.split(';');
        let tag = parts.next().unwrap_or("").trim();
        if tag.is_empty() || tag == "*" {
            continue;
        }

        let weight = parts
            .filter_map(|p| p.trim().strip_prefix("q="))
            .find_map(|q| q.trim().parse::<f32>().ok())
            .unwrap_or(1.0);

        // NaN, infinities and out-of-range weights are malformed
        if !weight.is_finite() || weight <= 0.0 || weight > 1.0 {
            continue;
        }

        match best {
            Some((w, _)) if w >= weight => {}
            _ => best = Some((weight, tag)),
        }
    }

    best.map(|(_, tag)| tag.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_supported() {
        let resolver = LocaleResolver::default();
        assert_eq!(resolver.resolve("de-DE"), "de");
        assert_eq!(resolver.resolve("fr_CA"), "fr");
        assert_eq!(resolver.resolve("RU"), "ru");
    }

    #[test]
    fn test_resolve_falls_back() {
        let resolver = LocaleResolver::default();
        assert_eq!(resolver.resolve("zz-ZZ"), "en");
        assert_eq!(resolver.resolve(""), "en");
        assert_eq!(resolver.resolve("d"), "en");
        assert_eq!(resolver.resolve("12-34"), "en");
    }

    #[test]
    fn test_custom_default() {
        let resolver = LocaleResolver::new("de");
        assert_eq!(resolver.resolve("ja-JP"), "de");

        // Unsupported default is ignored
        let resolver = LocaleResolver::new("pt-BR");
        assert_eq!(resolver.default_locale(), "en");
    }

    #[test]
    fn test_primary_subtag() {
        assert_eq!(primary_subtag("en-US").as_deref(), Some("en"));
        assert_eq!(primary_subtag("gsw-CH").as_deref(), Some("gsw"));
        assert_eq!(primary_subtag("e"), None);
        assert_eq!(primary_subtag("english"), None);
    }

    #[test]
    fn test_accept_language() {
        assert_eq!(
            from_accept_language("fr-CH, fr;q=0.9, en;q=0.8").as_deref(),
            Some("fr-CH")
        );
        assert_eq!(
            from_accept_language("en;q=0.5, de-DE;q=0.9").as_deref(),
            Some("de-DE")
        );
        assert_eq!(from_accept_language("*, it;q=0").as_deref(), None);
        assert_eq!(from_accept_language("").as_deref(), None);
    }

    #[test]
    fn test_accept_language_malformed_weights() {
        assert_eq!(
            from_accept_language("ru;q=NaN, de;q=0.5").as_deref(),
            Some("de")
        );
        assert_eq!(
            from_accept_language("es;q=inf, it;q=7, fr;q=0.2").as_deref(),
            Some("fr")
        );
        assert_eq!(from_accept_language("ru;q=NaN").as_deref(), None);
    }
}
