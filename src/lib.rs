pub mod config;
pub mod engines;
pub mod env;
pub mod error;
pub mod io;
pub mod types;
pub mod visualize;

pub use error::{NeuroLanderError, Result};
