//! Resolved configuration formatters.

use crate::config::BeanctxConfig;
use crate::error::ApiError;

pub fn format_config_text(config: &BeanctxConfig) -> String {
    let mut lines = vec![
        "[session_context]".to_string(),
        format!("wrapper = {}", config.session_context.wrapper),
        format!("strategy = {}", config.session_context.strategy()),
        String::new(),
        "[logging]".to_string(),
        format!("level = {}", config.logging.level),
        format!("format = {}", config.logging.format),
        format!("output = {}", config.logging.output),
        format!("file = {}", config.logging.file.display()),
        format!("color = {}", config.logging.color),
    ];
    let mut modules: Vec<_> = config.logging.modules.iter().collect();
    modules.sort();
    for (module, level) in modules {
        lines.push(format!("modules.{} = {}", module, level));
    }
    lines.join("\n")
}

pub fn format_config_json(config: &BeanctxConfig) -> Result<String, ApiError> {
    let value = serde_json::json!({
        "session_context": {
            "wrapper": config.session_context.wrapper,
            "strategy": config.session_context.strategy(),
        },
        "logging": config.logging,
    });
    serde_json::to_string_pretty(&value)
        .map_err(|e| ApiError::ConfigError(format!("Failed to serialize config: {}", e)))
}
