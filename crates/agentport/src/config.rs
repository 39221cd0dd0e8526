use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::capability::Capability;
use crate::naming::Target;
use crate::registry::FormatRegistry;

#[derive(Debug, Default, Deserialize)]
pub struct UserConfig {
    pub logging: Option<LoggingCfg>,
    pub convert: Option<ConvertCfg>,
    /// Per-format overrides keyed by format id.
    #[serde(default)]
    pub formats: BTreeMap<String, FormatCfg>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingCfg {
    pub to_file: Option<bool>,
    pub dir: Option<String>,
    pub json: Option<bool>,
    pub compact: Option<bool>,
    pub pretty: Option<bool>,
    pub level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConvertCfg {
    pub target: Option<Target>,
    pub model_map_file: Option<String>, // `~/` is expanded
    pub model_map_strict: Option<bool>,
    pub degrade_unsupported: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FormatCfg {
    pub capabilities: Option<Vec<Capability>>,
}

/// `$AGENTPORT_HOME` when set, else `~/.agentport`, else `./.agentport`.
pub fn resolve_home(explicit: &str) -> PathBuf {
    if !explicit.is_empty() {
        expand_home(explicit)
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".agentport")
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".agentport")
    }
}

pub fn load_user_config(home: &Path) -> anyhow::Result<Option<UserConfig>> {
    let path = home.join("config.toml");
    if !path.exists() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(&path)?;
    let cfg: UserConfig = toml::from_str(&s)?;
    Ok(Some(cfg))
}

pub fn expand_home(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

impl UserConfig {
    /// Narrow registered formats per `[formats.<id>]`.
    pub fn apply_format_overrides(&self, registry: &mut FormatRegistry) -> anyhow::Result<()> {
        for (id, cfg) in &self.formats {
            if let Some(caps) = cfg.capabilities.as_ref() {
                registry.restrict(id, caps.iter().copied().collect())?;
                tracing::debug!("format '{}' restricted to {:?}", id, caps);
            }
        }
        Ok(())
    }
}
