// Configuration management module
// TOML settings file plus environment-provided API credentials

pub mod interactive;
pub mod settings;

pub use interactive::{run_interactive_config, show_config};
pub use settings::{
    Config, ConfigError, Credentials, EmbeddingsConfig, GITHUB_TOKEN_VAR, GitHubConfig,
    OPENAI_API_KEY_VAR, SelectConfig,
};

/// Resolve the configuration directory, preferring an explicit override
#[inline]
pub fn resolve_config_dir(
    override_dir: Option<std::path::PathBuf>,
) -> Result<std::path::PathBuf, ConfigError> {
    override_dir.map_or_else(Config::default_dir, Ok)
}
