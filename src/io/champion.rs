use crate::config::AppConfig;
use crate::engines::generation::Genome;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The winning genome together with the configuration it was trained under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChampionRecord {
    pub genome: Genome,
    pub config: AppConfig,
    pub saved_at: DateTime<Utc>,
}

impl ChampionRecord {
    pub fn new(genome: Genome, config: AppConfig) -> Self {
        Self {
            genome,
            config,
            saved_at: Utc::now(),
        }
    }
}

pub fn save_champion<P: AsRef<Path>>(path: P, record: &ChampionRecord) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(path, json)?;

    log::info!("Saved champion genome {} to {}", record.genome.key, path.display());
    Ok(())
}

pub fn load_champion<P: AsRef<Path>>(path: P) -> Result<ChampionRecord> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let record: ChampionRecord = serde_json::from_str(&json)?;

    log::debug!(
        "Loaded champion genome {} saved at {}",
        record.genome.key,
        record.saved_at
    );
    Ok(record)
}
