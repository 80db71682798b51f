use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "ebsynth", version, about)]
pub struct Args {
    /// Path to environments.toml (overrides EBSYNTH_CONFIG and the default lookup)
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,

    /// Only synthesize environments whose name matches this glob (e.g. "production-*")
    #[arg(long)]
    pub only: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Template)]
    pub format: Format,

    /// Write one file per environment into this directory instead of stdout
    #[arg(long)]
    pub out_dir: Option<std::path::PathBuf>,

    /// Print a report of the synthesized environments
    #[arg(long, value_enum, default_value_t = ReportMode::Off)]
    pub report: ReportMode,

    /// Write the report to a file instead of stderr
    #[arg(long)]
    pub report_out: Option<std::path::PathBuf>,

    /// Show secret-looking environment variable values in the report
    #[arg(long = "no-redact", default_value_t = false)]
    pub no_redact: bool,

    /// List registered environment names and exit
    #[arg(long, default_value_t = false)]
    pub list: bool,

    /// Log filter (falls back to RUST_LOG, then "warn")
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    pub fn effective_redact(&self) -> bool {
        !self.no_redact
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Descriptors as JSON (settings, derived names, access grants)
    Json,
    /// Provider resource graph per environment
    Template,
}

impl Format {
    pub fn file_suffix(self) -> &'static str {
        match self {
            Format::Json => "descriptor.json",
            Format::Template => "template.json",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportMode {
    Off,
    Summary,
    Full,
}
