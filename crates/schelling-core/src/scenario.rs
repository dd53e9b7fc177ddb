use crate::config::{OutputMode, ScenarioConfig, ScenarioConfigError, SeamStitching};
use crate::metrics::{RunSummary, ScenarioResult};
use crate::patches::PatchAnalyzer;
use crate::rng::derive_replicate_seed;
use crate::snapshot::GridSnapshot;
use crate::world::{RunError, World, WorldInitError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioError {
    Init(WorldInitError),
    Run(RunError),
}

impl ScenarioError {
    /// True when the scenario was rejected before seeding because of its parameters.
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, ScenarioError::Init(WorldInitError::Config(_)))
    }
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioError::Init(e) => write!(f, "invalid scenario: {e}"),
            ScenarioError::Run(e) => write!(f, "scenario aborted: {e}"),
        }
    }
}

impl From<WorldInitError> for ScenarioError {
    fn from(err: WorldInitError) -> Self {
        ScenarioError::Init(err)
    }
}

impl From<ScenarioConfigError> for ScenarioError {
    fn from(err: ScenarioConfigError) -> Self {
        ScenarioError::Init(WorldInitError::Config(err))
    }
}

impl From<RunError> for ScenarioError {
    fn from(err: RunError) -> Self {
        ScenarioError::Run(err)
    }
}

impl Error for ScenarioError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ScenarioError::Init(e) => Some(e),
            ScenarioError::Run(e) => Some(e),
        }
    }
}

/// Final state of one simulated scenario, before it is reduced to scalars.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRun {
    pub summary: RunSummary,
    pub snapshot: GridSnapshot,
}

impl ScenarioRun {
    /// Reduce to the summary contract consumed by sweep harnesses.
    pub fn to_result(&self, output: OutputMode, stitching: SeamStitching) -> ScenarioResult {
        let (grid, n_patches) = match output {
            OutputMode::Grid => (Some(self.snapshot.rows()), None),
            OutputMode::Patches => {
                let patches = PatchAnalyzer::new(stitching).count_total(&self.snapshot);
                (None, Some(patches as f64))
            }
        };
        ScenarioResult {
            grid,
            n_patches,
            happiness: self.summary.happiness(),
            n_steps: self.summary.steps as f64,
            n_agents: self.summary.n_agents as f64,
        }
    }
}

impl ScenarioConfig {
    /// Config with the sweep harness' positional parameters and default seed/output.
    pub fn from_params(
        density: f64,
        homophily: u32,
        height: usize,
        width: usize,
        minority_fraction: f64,
        max_steps: usize,
    ) -> Self {
        Self {
            density,
            homophily,
            height,
            width,
            minority_fraction,
            max_steps,
            ..Self::default()
        }
    }
}

/// Seed a world from `config` and run it to convergence or the step budget.
pub fn simulate(config: &ScenarioConfig) -> Result<ScenarioRun, ScenarioError> {
    let mut world = World::seed(config)?;
    let summary = world.run(config.max_steps)?;
    Ok(ScenarioRun {
        summary,
        snapshot: world.snapshot(),
    })
}

/// Run one scenario and return the summary statistics for the configured output mode.
pub fn run_scenario(config: &ScenarioConfig) -> Result<ScenarioResult, ScenarioError> {
    let run = simulate(config)?;
    Ok(run.to_result(config.output, config.seam_stitching))
}

/// Run `count` independent replicates of `config` in parallel.
///
/// Replicate `i` uses a seed derived from `config.seed` and `i`, so results are the
/// same as running the replicates one after another, in replicate order.
pub fn run_replicates(
    config: &ScenarioConfig,
    count: usize,
) -> Result<Vec<ScenarioResult>, ScenarioError> {
    config.validate()?;
    (0..count)
        .into_par_iter()
        .map(|replicate| {
            let replicate_config = ScenarioConfig {
                seed: derive_replicate_seed(config.seed, replicate),
                ..config.clone()
            };
            run_scenario(&replicate_config)
        })
        .collect()
}
