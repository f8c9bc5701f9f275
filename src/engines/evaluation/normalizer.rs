use crate::engines::metrics::FitnessMetrics;

/// Scale an observation to zero mean and unit variance using its own
/// statistics. `epsilon` keeps constant observations finite (they map to zeros).
pub fn normalize_observation(observation: &[f64], epsilon: f64) -> Vec<f64> {
    if observation.is_empty() {
        return Vec::new();
    }

    let mean = FitnessMetrics::mean(observation);
    let std_dev = FitnessMetrics::std_dev(observation);
    let scale = std_dev + epsilon;

    observation.iter().map(|x| (x - mean) / scale).collect()
}

/// Index of the largest value. Ties go to the lowest index and NaN never wins.
/// Returns `None` when there is no comparable value.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
