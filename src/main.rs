use anyhow::{Context as _, Result};
use clap::Parser;
use glob::Pattern;
use std::io::Write as _;

use ebsynth::{
    cli::{Args, ReportMode},
    config::{locate_registry, RegistryFile},
    emit::Emitter,
    registry::EnvironmentRegistry,
    report::build_report,
    synth::{synthesize, write_outputs},
};

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    let source = locate_registry(args.config.as_deref())?;
    let file = RegistryFile::load(&source)?;
    let registry = EnvironmentRegistry::from_config(&file)
        .with_context(|| format!("invalid registry in {source}"))?;

    if args.list {
        let mut stdout = std::io::stdout().lock();
        for spec in registry.list_environments() {
            writeln!(stdout, "{}", spec.name)?;
        }
        return Ok(());
    }

    let only = args
        .only
        .as_deref()
        .map(Pattern::new)
        .transpose()
        .context("invalid --only pattern")?;

    let synthesis = synthesize(&registry, only.as_ref())?;
    let emitter = Emitter::new(args.format);

    // Render the report up front so a template error cannot leave half the outputs behind.
    let report = build_report(
        &registry.app().application_base_name,
        &source.to_string(),
        &synthesis.descriptors,
        args.report,
        args.effective_redact(),
    )?;

    // The report file goes first: if it cannot be written, no descriptor is.
    let report_file = match &args.report_out {
        Some(p) if args.report != ReportMode::Off => {
            std::fs::write(p, &report)
                .with_context(|| format!("failed to write report to {}", p.display()))?;
            Some(p)
        }
        _ => None,
    };

    let written = match &args.out_dir {
        Some(dir) => write_outputs(dir, &emitter, &synthesis.descriptors),
        None => emitter
            .render_all(&synthesis.descriptors)
            .map(|text| print!("{text}")),
    };
    if let Err(e) = written {
        if let Some(p) = report_file {
            let _ = std::fs::remove_file(p);
        }
        return Err(e);
    }

    if args.report != ReportMode::Off && report_file.is_none() {
        eprint!("{report}");
    }

    Ok(())
}

fn init_tracing(level: Option<&str>) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = match level {
        Some(l) => EnvFilter::try_new(l).unwrap_or_else(|_| EnvFilter::new("warn")),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    // stdout carries the descriptors
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
