pub mod generate;
pub mod parse;
pub mod types;

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub use parse::{load_config, parse_config, ConfigError};
pub use types::{Config, ServerConfig, StorageBackend, StorageConfig};

/// `$env{VAR_NAME}`, where the name starts with a letter or underscore
const ENV_VAR_PATTERN: &str = r"\$env\{([A-Za-z_][A-Za-z0-9_]*)\}";

const USER_CONFIG: &str = ".config/logs-transmitter/config.yml";
const SYSTEM_CONFIG: &str = "/etc/logs-transmitter/config.yml";

pub(crate) fn env_var_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ENV_VAR_PATTERN).expect("env var pattern is valid"))
}

/// Expands `$env{VAR}` references. Unset variables are left untouched.
pub fn expand_env_vars(text: &str) -> String {
    env_var_regex()
        .replace_all(text, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// Replaces a leading `~` with the home directory, when one is known.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();

    let rest = if path_str == "~" {
        ""
    } else if let Some(rest) = path_str.strip_prefix("~/") {
        rest
    } else {
        return path.to_path_buf();
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Picks the config file to load:
/// 1. the explicit path (tilde-expanded)
/// 2. ~/.config/logs-transmitter/config.yml
/// 3. /etc/logs-transmitter/config.yml
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(expand_tilde(path));
    }

    if let Some(user_config) = user_config_path().filter(|p| p.exists()) {
        return Some(user_config);
    }

    let system_config = PathBuf::from(SYSTEM_CONFIG);
    system_config.exists().then_some(system_config)
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(USER_CONFIG))
}

pub fn system_config_path() -> PathBuf {
    PathBuf::from(SYSTEM_CONFIG)
}
