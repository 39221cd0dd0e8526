//! Target emitters: render a `Descriptor` into output file content.
//!
//! Emitters only produce text. Capability checks and file naming belong to the
//! registered format (see `registry`), so one emitter can back several formats.

use std::path::PathBuf;

use crate::descriptor::Descriptor;
use crate::error::Result;
use crate::modelmap::{Canonical, ModelMap, ResolveOptions, resolve_model};
use crate::naming::Target;

pub mod agent_file;
pub mod rules_file;
pub mod settings_fragment;

pub use agent_file::AgentFileEmitter;
pub use rules_file::RulesFileEmitter;
pub use settings_fragment::SettingsFragmentEmitter;

/// Shared inputs for a single emission.
#[derive(Debug, Clone, Copy)]
pub struct EmitContext<'a> {
    pub target: Target,
    pub model_map: &'a ModelMap,
    pub model_options: ResolveOptions,
}

impl EmitContext<'_> {
    /// The descriptor's model hint resolved for this context's target.
    pub fn model_for(&self, d: &Descriptor) -> Option<Canonical> {
        d.model_hint()
            .and_then(|hint| resolve_model(self.model_map, self.target, hint, self.model_options))
    }
}

/// Emitter output before a path is attached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub content: String,
    pub warnings: Vec<String>,
}

impl Rendered {
    pub fn new(content: String) -> Self {
        Self {
            content,
            warnings: Vec::new(),
        }
    }
}

/// How an emission lands on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Replace,
    MergeJson,
}

impl WriteMode {
    pub fn as_str(self) -> &'static str {
        match self {
            WriteMode::Replace => "replace",
            WriteMode::MergeJson => "merge-json",
        }
    }
}

/// A rendered file for one descriptor and one format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub format: String,
    pub path: PathBuf,
    pub content: String,
    pub write_mode: WriteMode,
    pub warnings: Vec<String>,
}

/// Polymorphic renderer over target file structure.
pub trait Emitter: Send + Sync {
    fn render(&self, descriptor: &Descriptor, ctx: &EmitContext<'_>) -> Result<Rendered>;
}
