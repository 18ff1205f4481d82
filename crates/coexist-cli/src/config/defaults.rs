use std::path::PathBuf;

/// Name of the configuration file picked up from the project root.
pub const PROJECT_CONFIG_FILE: &str = "coexist.toml";

/// Lowest-priority values, used when neither the command line nor the
/// configuration file sets them.
pub struct DefaultsConfig {
    pub beta: f64,
    pub min_reduced_temperature: f64,
    pub standard_pressure_bar: f64,
    pub gas_constant: f64,
    pub strict_replicates: bool,
    pub temperature_key: String,
    pub replica_key: String,
    pub binary_dir: PathBuf,
    pub ncpu: usize,
    pub ngpu: usize,
    pub ensemble: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            beta: 0.325,
            min_reduced_temperature: 0.8,
            standard_pressure_bar: 1.01325,
            gas_constant: 0.008134,
            strict_replicates: false,
            temperature_key: "production_temperature_K".to_string(),
            replica_key: "replica_number_int".to_string(),
            binary_dir: PathBuf::from("."),
            ncpu: 1,
            ngpu: 0,
            ensemble: "GEMC".to_string(),
        }
    }
}
