mod builder;
mod defaults;
mod file;

pub use builder::{ConfigSources, build_config};
pub use defaults::PROJECT_CONFIG_FILE;
