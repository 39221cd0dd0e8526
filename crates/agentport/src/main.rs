use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use env_flags::env_flags;

use agentport::batch::{BatchSettings, RunStatus, convert_batch, inspect_file};
use agentport::capability::{Capability, CapabilitySet, join_capabilities};
use agentport::config::{UserConfig, expand_home, load_user_config, resolve_home};
use agentport::descriptor::DescriptorKind;
use agentport::logging::{LogSettings, init_tracing};
use agentport::modelmap::{ModelMap, ResolveOptions, load_default, load_from_file};
use agentport::naming::Target;
use agentport::registry::FormatRegistry;

#[derive(Parser)]
#[command(
    name = "agentport",
    about = "Convert AI agent, command and settings files between coding tools",
    version,
    propagate_version = true
)]
struct Cli {
    /// Tracing filter, overriding TRACING_FILTER/RUST_LOG and config
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every descriptor under a source directory
    Convert {
        /// Source directory (e.g. a project's .claude/)
        #[arg(long)]
        source: PathBuf,
        /// Target tool [default: [convert].target from config]
        #[arg(long, value_enum)]
        target: Option<Target>,
        /// Output directory (usually the project root)
        #[arg(long)]
        out: PathBuf,
        /// Emit only these format ids instead of the target's defaults
        #[arg(long = "format")]
        formats: Vec<String>,
        /// Drop capabilities a format cannot represent instead of failing
        #[arg(long)]
        degrade: bool,
        /// Report what would be written without writing
        #[arg(long)]
        dry_run: bool,
        /// Model map TOML layered over the built-in table
        #[arg(long)]
        model_map: Option<PathBuf>,
        /// Warn on model hints missing from the model map
        #[arg(long)]
        strict_models: bool,
    },

    /// List registered formats
    Formats {
        /// Only formats for this target
        #[arg(long, value_enum)]
        target: Option<Target>,
        /// Only formats able to represent all of these capabilities
        #[arg(long, value_delimiter = ',')]
        capabilities: Vec<Capability>,
    },

    /// Print one file's normalized descriptor as JSON
    Inspect {
        file: PathBuf,
        /// Descriptor kind [default: inferred from the file's name and location]
        #[arg(long, value_enum)]
        kind: Option<DescriptorKind>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_flags! {
        /// agentport home directory (absolute). Defaults to $HOME/.agentport
        AGENTPORT_HOME: &str = "";
    }
    let home = resolve_home(*AGENTPORT_HOME);

    // Logging is not up yet; config errors go straight to stderr.
    let user_cfg = match load_user_config(&home) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("error: {}: {:#}", home.join("config.toml").display(), e);
            return exit(RunStatus::Fatal);
        }
    };

    let mut log = LogSettings::from_env();
    if let Some(cfg) = user_cfg.as_ref().and_then(|c| c.logging.as_ref()) {
        log = log.with_config(cfg, |k| std::env::var_os(k).is_some());
    }
    if let Some(level) = cli.log_level.as_ref() {
        log.filter = level.clone();
    }
    init_tracing(&log, &home);
    tracing::debug!("agentport home {}", home.display());

    let user_cfg = user_cfg.unwrap_or_default();
    let result = match cli.command {
        Commands::Convert {
            source,
            target,
            out,
            formats,
            degrade,
            dry_run,
            model_map,
            strict_models,
        } => run_convert(
            &user_cfg,
            ConvertArgs {
                source,
                target,
                out,
                formats,
                degrade,
                dry_run,
                model_map,
                strict_models,
            },
        ),
        Commands::Formats {
            target,
            capabilities,
        } => run_formats(&user_cfg, target, &capabilities),
        Commands::Inspect { file, kind } => run_inspect(&file, kind),
    };
    match result {
        Ok(status) => exit(status),
        Err(e) => {
            eprintln!("error: {:#}", e);
            exit(RunStatus::Fatal)
        }
    }
}

fn exit(status: RunStatus) -> ExitCode {
    ExitCode::from(status.exit_code())
}

struct ConvertArgs {
    source: PathBuf,
    target: Option<Target>,
    out: PathBuf,
    formats: Vec<String>,
    degrade: bool,
    dry_run: bool,
    model_map: Option<PathBuf>,
    strict_models: bool,
}

fn run_convert(cfg: &UserConfig, args: ConvertArgs) -> anyhow::Result<RunStatus> {
    env_flags! {
        /// Model map TOML path. Overrides [convert].model_map_file
        AGENTPORT_MODEL_MAP_FILE: &str = "";
        /// Warn on unknown model hints
        AGENTPORT_MODEL_MAP_STRICT: bool = false;
        /// Drop unsupported capabilities instead of failing
        AGENTPORT_DEGRADE: bool = false;
    }
    let env_set = |k: &str| std::env::var_os(k).is_some();
    let convert_cfg = cfg.convert.as_ref();

    let target = args
        .target
        .or_else(|| convert_cfg.and_then(|c| c.target))
        .context("no target given; pass --target or set [convert].target")?;

    let model_map_file = args
        .model_map
        .or_else(|| {
            (!(*AGENTPORT_MODEL_MAP_FILE).is_empty())
                .then(|| expand_home(*AGENTPORT_MODEL_MAP_FILE))
        })
        .or_else(|| {
            convert_cfg
                .and_then(|c| c.model_map_file.as_deref())
                .map(expand_home)
        });
    let model_map = load_model_map(model_map_file.as_deref())?;

    let strict = args.strict_models
        || if env_set("AGENTPORT_MODEL_MAP_STRICT") {
            *AGENTPORT_MODEL_MAP_STRICT
        } else {
            convert_cfg
                .and_then(|c| c.model_map_strict)
                .unwrap_or(false)
        };
    let degrade = args.degrade
        || if env_set("AGENTPORT_DEGRADE") {
            *AGENTPORT_DEGRADE
        } else {
            convert_cfg
                .and_then(|c| c.degrade_unsupported)
                .unwrap_or(false)
        };

    let mut registry = FormatRegistry::with_defaults();
    cfg.apply_format_overrides(&mut registry)
        .context("applying [formats] overrides")?;

    let settings = BatchSettings {
        source_dir: args.source,
        out_dir: args.out,
        target,
        formats: (!args.formats.is_empty()).then_some(args.formats),
        degrade,
        dry_run: args.dry_run,
        model_options: ResolveOptions { strict },
    };
    tracing::info!(
        "converting {} for {} into {}",
        settings.source_dir.display(),
        target,
        settings.out_dir.display()
    );
    let report = convert_batch(&settings, &registry, &model_map)?;

    let verb = if settings.dry_run {
        "would write"
    } else {
        "wrote"
    };
    for c in &report.converted {
        for f in &c.files {
            println!("{} {}", verb, f.display());
        }
    }
    for f in &report.failures {
        eprintln!("failed: {}: {}", f.origin, f.error);
    }
    println!(
        "{} converted, {} failed",
        report.success_count(),
        report.failure_count()
    );
    Ok(report.status())
}

fn load_model_map(path: Option<&Path>) -> anyhow::Result<ModelMap> {
    match path {
        Some(p) => {
            let map = load_from_file(p)
                .with_context(|| format!("loading model map {}", p.display()))?;
            tracing::info!("loaded model map from {}", p.display());
            Ok(map)
        }
        None => Ok(load_default()),
    }
}

fn run_formats(
    cfg: &UserConfig,
    target: Option<Target>,
    capabilities: &[Capability],
) -> anyhow::Result<RunStatus> {
    let mut registry = FormatRegistry::with_defaults();
    cfg.apply_format_overrides(&mut registry)
        .context("applying [formats] overrides")?;
    let wanted: CapabilitySet = capabilities.iter().copied().collect();
    let able = registry.emitters_for(&wanted);
    for spec in registry.iter() {
        if target.is_some_and(|t| t != spec.target()) || !able.contains(&spec.id()) {
            continue;
        }
        let kinds: Vec<&str> = spec.kinds().iter().map(|k| k.as_str()).collect();
        println!(
            "{:<16} {:<7} kinds={:<22} capabilities={:<34} write={}",
            spec.id(),
            spec.target().as_str(),
            kinds.join(","),
            join_capabilities(spec.capabilities()),
            spec.write_mode().as_str()
        );
    }
    Ok(RunStatus::Ok)
}

fn run_inspect(file: &Path, kind: Option<DescriptorKind>) -> anyhow::Result<RunStatus> {
    match inspect_file(file, kind)? {
        Ok(d) => {
            println!("{}", serde_json::to_string_pretty(&d)?);
            Ok(RunStatus::Ok)
        }
        Err(e) => {
            eprintln!("failed: {}", e);
            Ok(RunStatus::DescriptorsFailed)
        }
    }
}
