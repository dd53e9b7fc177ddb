pub mod agent;
pub mod config;
pub mod constants;
pub mod grid;
pub mod metrics;
pub mod patches;
pub mod rng;
pub mod scenario;
pub mod scheduler;
pub mod snapshot;
pub mod world;

pub use config::{OutputMode, ScenarioConfig, ScenarioConfigError, SeamStitching};
pub use metrics::{PatchCounts, RunOutcome, RunSummary, ScenarioResult, TickMetrics};
pub use patches::{count_patches, PatchAnalyzer};
pub use scenario::{run_replicates, run_scenario, simulate, ScenarioError, ScenarioRun};
pub use snapshot::GridSnapshot;
pub use world::{RunError, RunState, World, WorldInitError};
