use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::naming::Target;

#[derive(Debug, Clone, Default)]
pub struct ModelMap {
    /// Lowercased token -> canonical model, per target.
    pub by_target: HashMap<Target, HashMap<String, Canonical>>,
    /// Tokens meaning "use whatever the host tool is configured with".
    pub inherit_tokens: HashSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Canonical {
    pub model: String,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMappingFile {
    #[serde(default)]
    pub mappings: Vec<RawEntry>,
    #[serde(default)]
    pub inherit: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawEntry {
    pub token: String,
    pub target: Target,
    pub to_model: String,
    #[serde(default)]
    pub to_provider: Option<String>,
    #[serde(default)]
    pub aliases: Option<Vec<String>>, // additional tokens mapping to the same entry
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    pub strict: bool,
}
