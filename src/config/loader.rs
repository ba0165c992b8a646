use std::sync::OnceLock;
use std::{fs, path::Path};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::settings::{ClientConfig, LoggingConfig};

/// Load a client config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ClientConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&content)
}

/// Expand `${VAR}` / `${VAR:default}`, parse, then apply defaults
pub fn parse_config(content: &str) -> Result<ClientConfig> {
    let expanded = expand_env_vars(content);
    let mut config: ClientConfig = serde_yaml::from_str(&expanded)
        .inspect_err(|e| error!("parse config error: {}", e))?;

    // Apply defaults
    if config.logging.is_none() {
        config.logging = Some(LoggingConfig::default());
    }

    debug!("config loaded, base_url: {:?}", config.base_url);
    Ok(config)
}

fn expand_env_vars(input: &str) -> String {
    static ENV_VAR: OnceLock<Regex> = OnceLock::new();
    let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").unwrap());
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}
