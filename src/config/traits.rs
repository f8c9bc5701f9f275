use crate::error::NeuroLanderError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), NeuroLanderError>;
}

/// Shorthand used by section validators.
pub(crate) fn invalid<S: ConfigSection>(message: &str) -> NeuroLanderError {
    NeuroLanderError::Configuration(format!("[{}] {}", S::section_name(), message))
}

pub(crate) fn check_probability<S: ConfigSection>(name: &str, value: f64) -> Result<(), NeuroLanderError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid::<S>(&format!("{} must be between 0 and 1", name)));
    }
    Ok(())
}
