//! Mapping table from provider-specific tool names to capability tags.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::capability::{Capability, CapabilitySet};

static TOOL_TABLE: Lazy<HashMap<String, Capability>> = Lazy::new(default_tool_table);

fn default_tool_table() -> HashMap<String, Capability> {
    let mut m = HashMap::new();
    // Canonical tags map to themselves.
    for cap in Capability::ALL {
        m.insert(cap.as_str().to_string(), cap);
    }

    // Claude tools
    for k in ["Read", "LS", "NotebookRead"] {
        m.insert(k.to_ascii_lowercase(), Capability::Read);
    }
    m.insert("write".to_string(), Capability::Write);
    for k in ["Edit", "MultiEdit", "NotebookEdit"] {
        m.insert(k.to_ascii_lowercase(), Capability::Edit);
    }
    for k in ["Grep", "Glob", "WebSearch", "WebFetch"] {
        m.insert(k.to_ascii_lowercase(), Capability::Search);
    }
    for k in ["Bash", "BashOutput", "KillBash"] {
        m.insert(k.to_ascii_lowercase(), Capability::Execute);
    }

    // VS Code tools
    for k in ["codebase", "search", "usages", "fetch", "githubRepo"] {
        m.insert(k.to_ascii_lowercase(), Capability::Search);
    }
    for k in ["editFiles", "edit"] {
        m.insert(k.to_ascii_lowercase(), Capability::Edit);
    }
    for k in ["new", "createFile"] {
        m.insert(k.to_ascii_lowercase(), Capability::Write);
    }
    for k in ["readFile", "problems", "changes"] {
        m.insert(k.to_ascii_lowercase(), Capability::Read);
    }
    for k in ["runCommands", "runTasks", "terminalLastCommand", "runTests"] {
        m.insert(k.to_ascii_lowercase(), Capability::Execute);
    }
    m
}

/// Resolve a single tool token, e.g. `Bash(git add:*)` or `editFiles`.
pub fn capability_for_tool(token: &str) -> Option<Capability> {
    let bare = match token.find('(') {
        Some(idx) => &token[..idx],
        None => token,
    };
    TOOL_TABLE.get(&bare.trim().to_ascii_lowercase()).copied()
}

/// Split a tool list on commas and whitespace, keeping `Tool(a b, c)` intact.
pub fn split_tool_list(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut depth = 0usize;
    for ch in s.chars() {
        match ch {
            '(' => {
                depth += 1;
                cur.push(ch);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                cur.push(ch);
            }
            c if depth == 0 && (c == ',' || c.is_whitespace()) => {
                if !cur.trim().is_empty() {
                    out.push(cur.trim().to_string());
                }
                cur.clear();
            }
            c => cur.push(c),
        }
    }
    if !cur.trim().is_empty() {
        out.push(cur.trim().to_string());
    }
    out
}

/// Resolve tokens into a capability set plus the tokens with no mapping.
pub fn resolve_tools<I, S>(tokens: I) -> (CapabilitySet, Vec<String>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut caps = CapabilitySet::new();
    let mut unmapped = Vec::new();
    for tok in tokens {
        let tok = tok.as_ref();
        match capability_for_tool(tok) {
            Some(c) => {
                caps.insert(c);
            }
            None => {
                if !unmapped.iter().any(|u: &String| u == tok) {
                    unmapped.push(tok.to_string());
                }
            }
        }
    }
    (caps, unmapped)
}
