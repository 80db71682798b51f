pub mod cli;
pub mod config;
pub mod descriptor;
pub mod emit;
pub mod environment;
pub mod error;
pub mod lint;
pub mod registry;
pub mod report;
pub mod resolve;
pub mod synth;
pub mod template;

// Convenience re-exports
pub use config::{AppSettings, RegistryFile, RegistrySource};
pub use descriptor::{build_descriptor, AccessGrant, ConfigDescriptor, DerivedNames, OptionSetting};
pub use environment::EnvironmentSpec;
pub use error::ConfigError;
pub use registry::EnvironmentRegistry;
