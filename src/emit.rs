use anyhow::Result;
use serde_json::{Map, Value};

use crate::{cli::Format, descriptor::ConfigDescriptor, template::render_template};

#[derive(Debug, Clone, Copy)]
pub struct Emitter {
    format: Format,
}

impl Emitter {
    pub fn new(format: Format) -> Self {
        Self { format }
    }

    pub fn file_name(&self, d: &ConfigDescriptor) -> String {
        format!("{}.{}", d.names.application_name, self.format.file_suffix())
    }

    pub fn value(&self, d: &ConfigDescriptor) -> Result<Value> {
        Ok(match self.format {
            Format::Json => serde_json::to_value(d)?,
            Format::Template => render_template(d),
        })
    }

    pub fn render_one(&self, d: &ConfigDescriptor) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&self.value(d)?)?;
        out.push('\n');
        Ok(out)
    }

    /// Everything in one document for stdout: a list of descriptors, or a map
    /// of application name to template.
    pub fn render_all(&self, descriptors: &[ConfigDescriptor]) -> Result<String> {
        let doc = match self.format {
            Format::Json => serde_json::to_value(descriptors)?,
            Format::Template => {
                let mut m = Map::new();
                for d in descriptors {
                    m.insert(d.names.application_name.clone(), render_template(d));
                }
                Value::Object(m)
            }
        };

        let mut out = serde_json::to_string_pretty(&doc)?;
        out.push('\n');
        Ok(out)
    }

    /// Render every file before anything touches the disk.
    pub fn render_files(&self, descriptors: &[ConfigDescriptor]) -> Result<Vec<(String, String)>> {
        descriptors
            .iter()
            .map(|d| Ok((self.file_name(d), self.render_one(d)?)))
            .collect()
    }
}
