use neurolander::config::{AppConfig, FitnessCriterion};
use neurolander::engines::generation::Activation;
use neurolander::error::NeuroLanderError;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let config = AppConfig::load_from_file(dir.path().join("absent.toml")).unwrap();

    assert_eq!(config.neat.population_size, 150);
    assert_eq!(config.neat.generations, 500);
    assert_eq!(config.evaluation.trials, 2);
    assert_eq!(config.evaluation.max_steps, 1000);
    assert_eq!(config.genome.num_inputs, 8);
    assert_eq!(config.genome.num_outputs, 4);
}

#[test]
fn test_partial_file_overrides_only_given_keys() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[neat]
population_size = 40
fitness_criterion = "mean"

[genome]
activation_default = "tanh"

[genome.weight]
mutate_power = 0.25

[evaluation]
trials = 5
parallel = true
"#,
    )
    .unwrap();

    let config = AppConfig::load_from_file(&path).unwrap();
    assert_eq!(config.neat.population_size, 40);
    assert_eq!(config.neat.fitness_criterion, FitnessCriterion::Mean);
    assert_eq!(config.neat.generations, 500);
    assert_eq!(config.genome.activation_default, Activation::Tanh);
    assert_eq!(config.genome.weight.mutate_power, 0.25);
    assert_eq!(config.genome.weight.max_value, 30.0);
    assert_eq!(config.evaluation.trials, 5);
    assert!(config.evaluation.parallel);
    assert_eq!(config.evaluation.success_bonus, 100.0);
}

#[test]
fn test_invalid_values_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[evaluation]\ntrials = 0\n").unwrap();

    let err = AppConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, NeuroLanderError::Configuration(_)));
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("saved.toml");

    let mut config = AppConfig::default();
    config.neat.population_size = 64;
    config.neat.seed = Some(99);
    config.species.compatibility_threshold = 2.5;
    config.save_to_file(&path).unwrap();

    let loaded = AppConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded.neat.population_size, 64);
    assert_eq!(loaded.neat.seed, Some(99));
    assert_eq!(loaded.species.compatibility_threshold, 2.5);
}

#[test]
fn test_environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[evaluation]\ndemo_trials = 3\n").unwrap();

    std::env::set_var("NEUROLANDER__EVALUATION__DEMO_TRIALS", "7");
    let loaded = AppConfig::load_from_file(&path);
    std::env::remove_var("NEUROLANDER__EVALUATION__DEMO_TRIALS");

    assert_eq!(loaded.unwrap().evaluation.demo_trials, 7);
}

#[test]
fn test_bundled_config_is_valid() {
    let config = AppConfig::load_from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml")).unwrap();
    assert_eq!(config.neat.fitness_threshold, 350.0);
    assert_eq!(config.evaluation.normalization_epsilon, 1e-8);
}

#[test]
fn test_partial_attribute_table_keeps_section_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[genome.bias]\ninit_stdev = 2.0\n\n[genome.response]\ninit_mean = 1.5\n",
    )
    .unwrap();

    let config = AppConfig::load_from_file(&path).unwrap();
    assert_eq!(config.genome.bias.init_stdev, 2.0);
    assert_eq!(config.genome.bias.mutate_rate, 0.7);
    assert_eq!(config.genome.response.init_mean, 1.5);
    assert_eq!(config.genome.response.init_stdev, 0.0);
    assert_eq!(config.genome.response.mutate_rate, 0.0);
    assert_eq!(config.genome.weight.mutate_rate, 0.8);
}
