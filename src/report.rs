use anyhow::Result;
use minijinja::Environment;
use serde_json::json;

use crate::{
    cli::ReportMode,
    descriptor::{settings::NS_APP_ENV, ConfigDescriptor},
};

const REPORT_TEMPLATE: &str = include_str!("../assets/report.txt.j2");

pub fn build_report(
    application: &str,
    source: &str,
    descriptors: &[ConfigDescriptor],
    mode: ReportMode,
    redact: bool,
) -> Result<String> {
    if mode == ReportMode::Off {
        return Ok(String::new());
    }

    let shown: Vec<ConfigDescriptor> = descriptors
        .iter()
        .map(|d| if redact { redacted(d) } else { d.clone() })
        .collect();

    let ctx = json!({
        "mode": match mode {
            ReportMode::Full => "full",
            _ => "summary",
        },
        "full": mode == ReportMode::Full,
        "application": application,
        "source": source,
        "descriptors": shown,
    });

    let mut env = Environment::new();
    env.add_template("report", REPORT_TEMPLATE)?;
    let tpl = env.get_template("report")?;
    let mut out = tpl.render(minijinja::Value::from_serialize(&ctx))?;
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

fn redacted(d: &ConfigDescriptor) -> ConfigDescriptor {
    let mut d = d.clone();
    for s in d.settings.iter_mut() {
        if s.namespace == NS_APP_ENV && looks_sensitive_key(&s.option_name) {
            s.value = "<redacted>".to_string();
        }
    }
    d
}

fn looks_sensitive_key(k: &str) -> bool {
    let u = k.to_ascii_uppercase();
    u.contains("TOKEN")
        || u.contains("SECRET")
        || u.contains("PASSWORD")
        || u.contains("PRIVATE")
        || u.ends_with("_KEY")
}
