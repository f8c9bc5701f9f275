use super::{
    evaluation::EvaluationConfig,
    evolution::EvolutionConfig,
    genome::GenomeConfig,
    reproduction::{ReproductionConfig, SpeciesConfig, StagnationConfig},
    traits::ConfigSection,
};
use crate::error::NeuroLanderError;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variables named `NEUROLANDER__<SECTION>__<KEY>` override file values.
pub const ENV_PREFIX: &str = "NEUROLANDER";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub neat: EvolutionConfig,
    pub genome: GenomeConfig,
    pub species: SpeciesConfig,
    pub stagnation: StagnationConfig,
    pub reproduction: ReproductionConfig,
    pub evaluation: EvaluationConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), NeuroLanderError> {
        self.neat.validate()?;
        self.genome.validate()?;
        self.species.validate()?;
        self.stagnation.validate()?;
        self.reproduction.validate()?;
        self.evaluation.validate()?;
        Ok(())
    }

    /// Layer the TOML file (optional) and environment overrides over the defaults,
    /// key by key.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, NeuroLanderError> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("Config file {} not found, using defaults", path.display());
        }

        // Defaults go in as a source of their own so a partial table such as
        // `[genome.bias]` only overrides the keys it names.
        let settings = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;

        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), NeuroLanderError> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| NeuroLanderError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| NeuroLanderError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }
}
