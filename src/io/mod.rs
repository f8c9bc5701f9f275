pub mod champion;

pub use champion::{load_champion, save_champion, ChampionRecord};
