use anyhow::{bail, Context as _, Result};
use glob::Pattern;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

use crate::{
    descriptor::{build_descriptor, ConfigDescriptor},
    emit::Emitter,
    lint::{LintWarning, Linter},
    registry::EnvironmentRegistry,
};

#[derive(Debug, Clone)]
pub struct Synthesis {
    pub descriptors: Vec<ConfigDescriptor>,
    pub warnings: Vec<LintWarning>,
}

/// Build descriptors for every selected environment in declaration order.
///
/// The registry was validated when it was built, so this only fails on a
/// selection that matches nothing.
pub fn synthesize(registry: &EnvironmentRegistry, only: Option<&Pattern>) -> Result<Synthesis> {
    let specs = match only {
        Some(p) => {
            let picked = registry.select(p);
            if picked.is_empty() {
                bail!("--only '{}' matches no registered environment", p.as_str());
            }
            picked
        }
        None => registry.list_environments().iter().collect(),
    };

    let linter = Linter::new().context("failed to compile naming rules")?;

    let mut descriptors = Vec::with_capacity(specs.len());
    let mut warnings = Vec::new();

    for spec in specs {
        let d = build_descriptor(registry.app(), spec);
        for w in linter.check(&d) {
            warn!(
                environment = %w.environment,
                subject = w.subject,
                value = %w.value,
                "{}",
                w.message
            );
            warnings.push(w);
        }
        descriptors.push(d);
    }

    info!(
        environments = descriptors.len(),
        warnings = warnings.len(),
        "synthesized descriptors"
    );

    Ok(Synthesis {
        descriptors,
        warnings,
    })
}

/// Writes one file per descriptor. Every file is rendered first so a render
/// failure leaves the directory untouched, and a failed write removes whatever
/// this call already wrote.
pub fn write_outputs(out_dir: &Path, emitter: &Emitter, descriptors: &[ConfigDescriptor]) -> Result<()> {
    let files = emitter.render_files(descriptors)?;

    let created_dir = !out_dir.exists();
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(files.len());
    for (name, text) in files {
        let path = out_dir.join(&name);
        if let Err(e) = fs::write(&path, text) {
            discard_outputs(out_dir, created_dir, &written);
            return Err(e).with_context(|| format!("failed to write {}", path.display()));
        }
        info!(path = %path.display(), "wrote descriptor");
        written.push(path);
    }

    Ok(())
}

fn discard_outputs(out_dir: &Path, created_dir: bool, written: &[PathBuf]) {
    let cleanup = if created_dir {
        fs::remove_dir_all(out_dir)
    } else {
        written.iter().try_for_each(fs::remove_file)
    };
    if let Err(e) = cleanup {
        warn!(dir = %out_dir.display(), error = %e, "failed to remove partial output");
    }
}
