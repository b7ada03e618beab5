//! Entry point for loading configuration.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::BeanctxConfig;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix of environment overrides, e.g. `BEANCTX__SESSION_CONTEXT__WRAPPER`
pub const ENV_PREFIX: &str = "BEANCTX";

/// Separator between nested keys in environment overrides
pub const ENV_SEPARATOR: &str = "__";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for `workspace_root`.
    ///
    /// Precedence (highest last): defaults, global file, workspace
    /// `config/config.toml`, workspace `config/{BEANCTX_ENV}.toml`,
    /// environment.
    pub fn load(workspace_root: &Path) -> Result<BeanctxConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let config = Self::finish(builder)?;
        debug!(
            workspace = %workspace_root.display(),
            wrapper = %config.session_context.wrapper,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration from a single file on top of the defaults; the
    /// environment still overrides it
    pub fn load_from_file(path: &Path) -> Result<BeanctxConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true));
        Self::finish(builder)
    }

    /// Built-in defaults with no sources applied
    pub fn default() -> BeanctxConfig {
        BeanctxConfig::default()
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<BeanctxConfig, ConfigError> {
        builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR))
            .build()?
            .try_deserialize()
    }
}
