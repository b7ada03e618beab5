//! CLI presentation: text and json formatters per command family.

mod configuration;
mod verification;

pub use configuration::{format_config_json, format_config_text};
pub use verification::{format_verification_json, format_verification_text};
