//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::command_name;
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_config_json, format_config_text, format_verification_json, format_verification_text,
};
use crate::config::{BeanctxConfig, ConfigLoader};
use crate::error::ApiError;
use crate::verify;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Runtime context for CLI execution: workspace, config path, and the resolved configuration.
/// Built from workspace path and optional config path using ConfigLoader only.
#[derive(Debug)]
pub struct RunContext {
    workspace_root: PathBuf,
    config_path: Option<PathBuf>,
    config: BeanctxConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };

        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;

        Ok(Self {
            workspace_root,
            config_path,
            config,
        })
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let name = command_name(command);
        debug!(
            command = name,
            workspace = %self.workspace_root.display(),
            config_file = ?self.config_path,
            "executing command"
        );
        let result = match command {
            Commands::Verify { format } => self.handle_verify(format),
            Commands::Config { format } => self.handle_config(format),
        };
        info!(
            command = name,
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "command finished"
        );
        result
    }

    fn handle_verify(&self, format: &str) -> Result<String, ApiError> {
        let report = verify::run_all()?;
        let output = match format {
            "json" => format_verification_json(&report)?,
            "text" => format_verification_text(&report),
            other => return Err(invalid_format(other)),
        };
        if report.passed() {
            Ok(output)
        } else {
            Err(ApiError::VerificationFailed(output))
        }
    }

    fn handle_config(&self, format: &str) -> Result<String, ApiError> {
        match format {
            "json" => format_config_json(&self.config),
            "text" => Ok(format_config_text(&self.config)),
            other => Err(invalid_format(other)),
        }
    }
}

fn invalid_format(format: &str) -> ApiError {
    ApiError::ConfigError(format!(
        "Invalid format: {} (must be 'text' or 'json')",
        format
    ))
}
