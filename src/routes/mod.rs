//! HTTP routes for editor-prepare

pub mod content;
pub mod health;
pub mod prepare;

pub use content::handle_content;
pub use health::health_check;
pub use prepare::{error_response, handle_prepare};
