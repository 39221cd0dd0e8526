//! Naming helpers and target variants.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Convert a display name into a filesystem-safe, kebab-case identifier.
pub fn safe_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if out.is_empty() {
        "unnamed".to_string()
    } else {
        out
    }
}

/// Supported output targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Zed,
    Vscode,
}

impl Target {
    pub fn as_str(self) -> &'static str {
        match self {
            Target::Zed => "zed",
            Target::Vscode => "vscode",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Make names unique in place by suffixing `-2`, `-3`, ... to repeats.
///
/// Returns `(original, renamed)` pairs for every name that changed.
pub fn dedupe_names(names: &mut [String]) -> Vec<(String, String)> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut renamed = Vec::new();
    for name in names.iter_mut() {
        let key = safe_name(name);
        if let Some(mut count) = seen.get(&key).copied() {
            count += 1;
            let mut candidate = format!("{}-{}", name, count);
            while seen.contains_key(&safe_name(&candidate)) {
                count += 1;
                candidate = format!("{}-{}", name, count);
            }
            seen.insert(key, count);
            seen.insert(safe_name(&candidate), 1);
            renamed.push((name.clone(), candidate.clone()));
            *name = candidate;
        } else {
            seen.insert(key, 1);
        }
    }
    renamed
}
