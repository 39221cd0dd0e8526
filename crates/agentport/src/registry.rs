//! Format registry: target format identifiers mapped to emitters, naming
//! functions, default descriptor kinds and representable capabilities.
//!
//! New targets register a [`FormatSpec`]; existing emitters never change.

use std::path::PathBuf;

use crate::capability::{CapabilitySet, all_capabilities};
use crate::descriptor::{Descriptor, DescriptorKind};
use crate::emit::{
    AgentFileEmitter, Emission, EmitContext, Emitter, RulesFileEmitter, SettingsFragmentEmitter,
    WriteMode,
};
use crate::error::{ConvertError, Result};
use crate::naming::{Target, safe_name};

/// Relative output path for a descriptor.
pub type NamingFn = fn(&Descriptor) -> PathBuf;

/// A registered target format.
pub struct FormatSpec {
    id: String,
    target: Target,
    kinds: Vec<DescriptorKind>,
    capabilities: CapabilitySet,
    write_mode: WriteMode,
    emitter: Box<dyn Emitter>,
    naming: NamingFn,
}

impl std::fmt::Debug for FormatSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatSpec")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("kinds", &self.kinds)
            .field("capabilities", &self.capabilities)
            .field("write_mode", &self.write_mode)
            .finish_non_exhaustive()
    }
}

impl FormatSpec {
    /// A format serving every kind and representing every capability.
    pub fn new(
        id: impl Into<String>,
        target: Target,
        emitter: impl Emitter + 'static,
        naming: NamingFn,
    ) -> Self {
        Self {
            id: id.into(),
            target,
            kinds: vec![
                DescriptorKind::Agent,
                DescriptorKind::Command,
                DescriptorKind::Settings,
            ],
            capabilities: all_capabilities(),
            write_mode: WriteMode::Replace,
            emitter: Box::new(emitter),
            naming,
        }
    }

    pub fn for_kinds(mut self, kinds: &[DescriptorKind]) -> Self {
        self.kinds = kinds.to_vec();
        self
    }

    pub fn supporting<I: IntoIterator<Item = crate::capability::Capability>>(
        mut self,
        caps: I,
    ) -> Self {
        self.capabilities = caps.into_iter().collect();
        self
    }

    pub fn merging_json(mut self) -> Self {
        self.write_mode = WriteMode::MergeJson;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn kinds(&self) -> &[DescriptorKind] {
        &self.kinds
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    pub fn path_for(&self, d: &Descriptor) -> PathBuf {
        (self.naming)(d)
    }

    /// Check capabilities, render, and attach the output path.
    pub fn emit(&self, d: &Descriptor, ctx: &EmitContext<'_>) -> Result<Emission> {
        let missing: Vec<_> = d
            .capabilities()
            .iter()
            .filter(|c| !self.capabilities.contains(c))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(ConvertError::UnsupportedCapability {
                descriptor: d.name().to_string(),
                format: self.id.clone(),
                capabilities: missing,
            });
        }
        let rendered = self.emitter.render(d, ctx)?;
        Ok(Emission {
            format: self.id.clone(),
            path: self.path_for(d),
            content: rendered.content,
            write_mode: self.write_mode,
            warnings: rendered.warnings,
        })
    }
}

/// Ordered collection of formats keyed by id.
#[derive(Debug, Default)]
pub struct FormatRegistry {
    formats: Vec<FormatSpec>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in Zed and VS Code formats.
    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        reg.register(
            FormatSpec::new("zed-rules", Target::Zed, RulesFileEmitter, |d| {
                PathBuf::from(format!("{}.rules", safe_name(d.name())))
            })
            .for_kinds(&[DescriptorKind::Agent, DescriptorKind::Command]),
        );
        reg.register(
            FormatSpec::new(
                "zed-settings",
                Target::Zed,
                SettingsFragmentEmitter::zed(),
                |_| PathBuf::from(".zed").join("settings.json"),
            )
            .for_kinds(&[DescriptorKind::Agent, DescriptorKind::Settings])
            .merging_json(),
        );
        reg.register(
            FormatSpec::new("vscode-agent", Target::Vscode, AgentFileEmitter::agent(), |d| {
                PathBuf::from(".github")
                    .join("agents")
                    .join(format!("{}.agent.md", safe_name(d.name())))
            })
            .for_kinds(&[DescriptorKind::Agent]),
        );
        reg.register(
            FormatSpec::new(
                "vscode-prompt",
                Target::Vscode,
                AgentFileEmitter::prompt("agent"),
                |d| {
                    PathBuf::from(".github")
                        .join("prompts")
                        .join(format!("{}.prompt.md", safe_name(d.name())))
                },
            )
            .for_kinds(&[DescriptorKind::Command]),
        );
        reg.register(
            FormatSpec::new(
                "vscode-settings",
                Target::Vscode,
                SettingsFragmentEmitter::vscode(),
                |_| PathBuf::from(".vscode").join("settings.json"),
            )
            .for_kinds(&[DescriptorKind::Settings])
            .merging_json(),
        );
        reg
    }

    /// Add a format, replacing any existing format with the same id.
    pub fn register(&mut self, spec: FormatSpec) {
        if let Some(existing) = self.formats.iter_mut().find(|f| f.id == spec.id) {
            tracing::debug!("replacing registered format '{}'", spec.id);
            *existing = spec;
        } else {
            self.formats.push(spec);
        }
    }

    pub fn emitter_for(&self, id: &str) -> Result<&FormatSpec> {
        self.formats
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| ConvertError::UnknownFormat(id.to_string()))
    }

    /// Ids of formats able to represent every given capability.
    pub fn emitters_for(&self, caps: &CapabilitySet) -> Vec<&str> {
        self.formats
            .iter()
            .filter(|f| caps.is_subset(&f.capabilities))
            .map(|f| f.id.as_str())
            .collect()
    }

    /// Default formats for a target and descriptor kind.
    pub fn formats_for(&self, target: Target, kind: DescriptorKind) -> Vec<&FormatSpec> {
        self.formats
            .iter()
            .filter(|f| f.target == target && f.kinds.contains(&kind))
            .collect()
    }

    /// Narrow what a registered format may represent.
    pub fn restrict(&mut self, id: &str, caps: CapabilitySet) -> Result<()> {
        let spec = self
            .formats
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| ConvertError::UnknownFormat(id.to_string()))?;
        spec.capabilities = caps;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormatSpec> {
        self.formats.iter()
    }
}
