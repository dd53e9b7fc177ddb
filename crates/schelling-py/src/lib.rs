use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use schelling_core::config::{OutputMode, ScenarioConfig};
use schelling_core::metrics::ScenarioResult;
use schelling_core::scenario::{run_scenario as run_core_scenario, ScenarioError};

/// Minimal PyO3 module exposing schelling-core to Python sweep harnesses.
#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pyfunction]
fn default_config_json() -> PyResult<String> {
    serde_json::to_string(&ScenarioConfig::default())
        .map_err(|e| PyValueError::new_err(format!("failed to serialize default config: {e}")))
}

#[pyfunction]
fn validate_config_json(config_json: &str) -> PyResult<bool> {
    let config = parse_config(config_json)?;
    config
        .validate()
        .map(|_| true)
        .map_err(|e| PyValueError::new_err(format!("invalid scenario configuration: {e}")))
}

/// Run a scenario described by a JSON config and return the JSON-encoded result.
#[pyfunction]
fn run_scenario_json(py: Python<'_>, config_json: &str) -> PyResult<String> {
    let config = parse_config(config_json)?;
    let result = py.allow_threads(|| run_core_scenario(&config));
    encode_result(result)
}

/// Run one scenario with the harness' keyword parameters.
///
/// Returns the result as a JSON object string, so callers decode it with
/// `json.loads` before reading `grid` (or `n_patches` when `count_patches` is
/// set), `happiness`, `n_steps` and `n_agents`.
#[pyfunction]
#[pyo3(signature = (
    density,
    homophily,
    height = 30,
    width = 30,
    minority_pc = 0.5,
    max_steps = 100,
    seed = 42,
    count_patches = false
))]
#[allow(clippy::too_many_arguments)]
fn run_scenario(
    py: Python<'_>,
    density: f64,
    homophily: u32,
    height: usize,
    width: usize,
    minority_pc: f64,
    max_steps: usize,
    seed: u64,
    count_patches: bool,
) -> PyResult<String> {
    let config = scenario_config(
        density,
        homophily,
        height,
        width,
        minority_pc,
        max_steps,
        seed,
        count_patches,
    );
    let result = py.allow_threads(|| run_core_scenario(&config));
    encode_result(result)
}

#[allow(clippy::too_many_arguments)]
fn scenario_config(
    density: f64,
    homophily: u32,
    height: usize,
    width: usize,
    minority_pc: f64,
    max_steps: usize,
    seed: u64,
    count_patches: bool,
) -> ScenarioConfig {
    ScenarioConfig {
        seed,
        output: if count_patches {
            OutputMode::Patches
        } else {
            OutputMode::Grid
        },
        ..ScenarioConfig::from_params(density, homophily, height, width, minority_pc, max_steps)
    }
}

fn parse_config(config_json: &str) -> PyResult<ScenarioConfig> {
    serde_json::from_str(config_json)
        .map_err(|e| PyValueError::new_err(format!("invalid config json: {e}")))
}

fn encode_result(result: Result<ScenarioResult, ScenarioError>) -> PyResult<String> {
    let result = result.map_err(|e| PyValueError::new_err(e.to_string()))?;
    serde_json::to_string(&result)
        .map_err(|e| PyValueError::new_err(format!("failed to serialize result: {e}")))
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_function(wrap_pyfunction!(default_config_json, m)?)?;
    m.add_function(wrap_pyfunction!(validate_config_json, m)?)?;
    m.add_function(wrap_pyfunction!(run_scenario_json, m)?)?;
    m.add_function(wrap_pyfunction!(run_scenario, m)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_patches_flag_selects_patch_output() {
        let config = scenario_config(0.8, 3, 30, 30, 0.5, 100, 42, true);
        assert_eq!(config.output, OutputMode::Patches);
        let config = scenario_config(0.8, 3, 30, 30, 0.5, 100, 42, false);
        assert_eq!(config.output, OutputMode::Grid);
    }

    #[test]
    fn encoded_result_is_a_json_object_with_harness_keys() {
        let config = scenario_config(0.5, 2, 8, 8, 0.5, 10, 3, true);
        let encoded = encode_result(run_core_scenario(&config)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        let object = value.as_object().unwrap();
        for key in ["n_patches", "happiness", "n_steps", "n_agents"] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert!(!object.contains_key("grid"));
    }

    #[test]
    fn keyword_defaults_match_default_config() {
        let config = scenario_config(0.8, 3, 30, 30, 0.5, 100, 42, false);
        assert_eq!(config, ScenarioConfig::default());
    }
}
