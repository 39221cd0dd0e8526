//! Batch conversion: discover descriptor files, parse them independently,
//! render every selected format, then write.
//!
//! Responsibilities:
//! - Walk the source directory and classify files by kind.
//! - Record per-descriptor failures and keep going.
//! - Make descriptor names unique before any file is named after them.
//! - Only write a descriptor's files once all of its formats rendered.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::capability::join_capabilities;
use crate::descriptor::{Descriptor, DescriptorKind};
use crate::emit::{Emission, EmitContext};
use crate::error::ConvertError;
use crate::modelmap::{ModelMap, ResolveOptions};
use crate::naming::{Target, dedupe_names, safe_name};
use crate::parser::{InputFormat, SourceRef, UNMAPPED_TOOLS_KEY, parse_descriptor};
use crate::registry::{FormatRegistry, FormatSpec};
use crate::writer::write_emission;

/// Root-level file names that hold settings rather than agents.
const SETTINGS_FILES: &[&str] = &["settings.json", "settings.local.json", ".mcp.json"];
const AGENTS_DIR: &str = "agents";
const COMMANDS_DIR: &str = "commands";

/// Inputs for one batch run.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub source_dir: PathBuf,
    pub out_dir: PathBuf,
    pub target: Target,
    /// Explicit format ids; `None` selects the target's defaults per kind.
    pub formats: Option<Vec<String>>,
    /// Drop unsupported capabilities instead of failing the descriptor.
    pub degrade: bool,
    /// Render and report without touching the output directory.
    pub dry_run: bool,
    pub model_options: ResolveOptions,
}

/// A descriptor that converted, with the files written (or that would be).
#[derive(Debug)]
pub struct Converted {
    pub name: String,
    pub kind: DescriptorKind,
    pub files: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

/// A descriptor that failed, keyed by name when known, else by path.
#[derive(Debug)]
pub struct Failure {
    pub origin: String,
    pub error: ConvertError,
}

/// How a run ends, as seen by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Everything converted.
    Ok,
    /// At least one descriptor failed; the rest were still written.
    DescriptorsFailed,
    /// The run could not start or stopped early.
    Fatal,
}

impl RunStatus {
    pub fn exit_code(self) -> u8 {
        match self {
            RunStatus::Ok => 0,
            RunStatus::DescriptorsFailed => 1,
            RunStatus::Fatal => 2,
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<Converted>,
    pub failures: Vec<Failure>,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.converted.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn status(&self) -> RunStatus {
        if self.is_success() {
            RunStatus::Ok
        } else {
            RunStatus::DescriptorsFailed
        }
    }
}

/// Kind implied by a lone file's name and location.
pub fn kind_for_path(path: &Path) -> DescriptorKind {
    let fname = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    if SETTINGS_FILES.contains(&fname) {
        DescriptorKind::Settings
    } else if path
        .parent()
        .map(|p| p.components().any(|c| c.as_os_str() == COMMANDS_DIR))
        .unwrap_or(false)
    {
        DescriptorKind::Command
    } else {
        DescriptorKind::Agent
    }
}

/// Parse one file on its own; `kind` defaults to [`kind_for_path`].
///
/// The outer error is fatal (unknown extension, unreadable file). The inner
/// one is the descriptor's own failure.
pub fn inspect_file(
    path: &Path,
    kind: Option<DescriptorKind>,
) -> anyhow::Result<Result<Descriptor, ConvertError>> {
    let format = InputFormat::detect(path)
        .with_context(|| format!("unsupported file type: {}", path.display()))?;
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let source = SourceRef::new(path, kind.unwrap_or_else(|| kind_for_path(path)));
    Ok(parse_descriptor(&content, format, &source))
}

/// List descriptor sources below `root` in sorted order.
pub fn discover_sources(root: &Path) -> anyhow::Result<Vec<SourceRef>> {
    if !root.is_dir() {
        anyhow::bail!("source directory {} does not exist", root.display());
    }
    let mut out = Vec::new();
    for path in sorted_entries(root)? {
        let Some(fname) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if path.is_dir() {
            match fname {
                AGENTS_DIR => {
                    for p in sorted_entries(&path)? {
                        if is_descriptor_file(&p) {
                            out.push(SourceRef::new(p, DescriptorKind::Agent));
                        }
                    }
                }
                COMMANDS_DIR => collect_commands(&path, &path, &mut out)?,
                _ => tracing::debug!("ignoring directory {}", path.display()),
            }
        } else if SETTINGS_FILES.contains(&fname) {
            out.push(SourceRef::new(path, DescriptorKind::Settings));
        } else if is_descriptor_file(&path) {
            out.push(SourceRef::new(path, DescriptorKind::Agent));
        }
    }
    Ok(out)
}

/// Commands nest; `commands/git/commit.md` is named `git-commit`.
fn collect_commands(base: &Path, dir: &Path, out: &mut Vec<SourceRef>) -> anyhow::Result<()> {
    for path in sorted_entries(dir)? {
        if path.is_dir() {
            collect_commands(base, &path, out)?;
        } else if is_descriptor_file(&path) {
            let rel = path.strip_prefix(base).unwrap_or(&path).with_extension("");
            let joined = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("-");
            let source = SourceRef::new(path, DescriptorKind::Command);
            out.push(source.with_name_hint(safe_name(&joined)));
        }
    }
    Ok(())
}

fn sorted_entries(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read_dir {}", dir.display()))? {
        paths.push(entry?.path());
    }
    paths.sort();
    Ok(paths)
}

fn is_descriptor_file(path: &Path) -> bool {
    path.is_file() && InputFormat::detect(path).is_some()
}

/// Read and parse every source; failures are returned alongside successes.
pub fn load_descriptors(sources: &[SourceRef]) -> (Vec<Descriptor>, Vec<Failure>) {
    let mut loaded = Vec::new();
    let mut failures = Vec::new();
    for source in sources {
        let origin = source.origin();
        let Some(format) = InputFormat::detect(&source.path) else {
            continue;
        };
        let parsed = fs::read_to_string(&source.path)
            .map_err(ConvertError::from)
            .and_then(|content| parse_descriptor(&content, format, source));
        match parsed {
            Ok(d) => {
                if let Some(tools) = d.metadata().get(UNMAPPED_TOOLS_KEY) {
                    tracing::debug!(
                        "'{}': tools with no capability mapping: {}",
                        d.name(),
                        tools
                    );
                }
                tracing::debug!("loaded {} '{}' from {}", d.kind(), d.name(), origin);
                loaded.push(d);
            }
            Err(error) => {
                tracing::warn!("skipping {}: {}", origin, error);
                failures.push(Failure { origin, error });
            }
        }
    }
    (loaded, failures)
}

/// Rename repeated descriptor names, returning a warning per rename.
pub fn dedupe_descriptors(descriptors: &mut [Descriptor]) -> Vec<String> {
    let mut names: Vec<String> = descriptors.iter().map(|d| d.name().to_string()).collect();
    let renames = dedupe_names(&mut names);
    for (d, name) in descriptors.iter_mut().zip(&names) {
        if d.name() != name {
            *d = d.renamed(name);
        }
    }
    renames
        .into_iter()
        .map(|(from, to)| format!("duplicate name '{}' renamed to '{}'", from, to))
        .collect()
}

/// Convert every descriptor under `settings.source_dir`.
///
/// Errors returned here are fatal for the run (unreadable source directory,
/// unknown explicit format). Per-descriptor problems land in the report.
pub fn convert_batch(
    settings: &BatchSettings,
    registry: &FormatRegistry,
    model_map: &ModelMap,
) -> anyhow::Result<BatchReport> {
    let explicit: Option<Vec<&FormatSpec>> = match settings.formats.as_ref() {
        Some(ids) => Some(
            ids.iter()
                .map(|id| registry.emitter_for(id))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        None => None,
    };

    let sources = discover_sources(&settings.source_dir)?;
    tracing::info!(
        "discovered {} descriptor file(s) in {}",
        sources.len(),
        settings.source_dir.display()
    );

    let (mut descriptors, failures) = load_descriptors(&sources);
    let rename_warnings = dedupe_descriptors(&mut descriptors);
    for w in &rename_warnings {
        tracing::warn!("{}", w);
    }

    let ctx = EmitContext {
        target: settings.target,
        model_map,
        model_options: settings.model_options,
    };
    let mut report = BatchReport {
        converted: Vec::new(),
        failures,
    };
    for d in &descriptors {
        let specs = match explicit.as_ref() {
            Some(specs) => specs.clone(),
            None => registry.formats_for(settings.target, d.kind()),
        };
        if specs.is_empty() {
            tracing::warn!(
                "'{}': no {} format accepts {} descriptors",
                d.name(),
                settings.target,
                d.kind()
            );
        }
        let mut warnings: Vec<String> = rename_warnings
            .iter()
            .filter(|w| w.ends_with(&format!("'{}'", d.name())))
            .cloned()
            .collect();
        match convert_one(d, &specs, &ctx, settings, &mut warnings) {
            Ok(files) => report.converted.push(Converted {
                name: d.name().to_string(),
                kind: d.kind(),
                files,
                warnings,
            }),
            Err(error) => {
                tracing::warn!("failed to convert '{}': {}", d.name(), error);
                report.failures.push(Failure {
                    origin: d.name().to_string(),
                    error,
                });
            }
        }
    }

    tracing::info!(
        "converted {} descriptor(s), {} failure(s){}",
        report.success_count(),
        report.failure_count(),
        if settings.dry_run { " (dry run)" } else { "" }
    );
    Ok(report)
}

fn convert_one(
    d: &Descriptor,
    specs: &[&FormatSpec],
    ctx: &EmitContext<'_>,
    settings: &BatchSettings,
    warnings: &mut Vec<String>,
) -> Result<Vec<PathBuf>, ConvertError> {
    let mut emissions: Vec<Emission> = Vec::with_capacity(specs.len());
    for spec in specs {
        let emission = match spec.emit(d, ctx) {
            Err(ConvertError::UnsupportedCapability { capabilities, .. }) if settings.degrade => {
                let note = format!(
                    "'{}': dropped {} for format '{}'",
                    d.name(),
                    join_capabilities(&capabilities),
                    spec.id()
                );
                tracing::warn!("{}", note);
                warnings.push(note);
                spec.emit(&d.without_capabilities(&capabilities), ctx)?
            }
            other => other?,
        };
        emissions.push(emission);
    }

    let mut files = Vec::with_capacity(emissions.len());
    for emission in emissions {
        warnings.extend(emission.warnings.iter().cloned());
        if settings.dry_run {
            files.push(settings.out_dir.join(&emission.path));
        } else {
            files.push(write_emission(&settings.out_dir, &emission)?);
        }
    }
    Ok(files)
}
