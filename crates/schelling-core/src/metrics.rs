use serde::{Deserialize, Serialize};

/// Terminal state of a run.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every agent was happy at the end of the last tick.
    Converged,
    /// The tick budget ran out first.
    BudgetExhausted,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TickMetrics {
    pub tick: usize,
    pub happy: usize,
    pub moved: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub steps: usize,
    pub n_agents: usize,
    pub final_happy: usize,
    /// Happy count recorded at the end of every tick.
    #[serde(default)]
    pub happy_history: Vec<usize>,
}

impl RunSummary {
    /// Share of agents happy at the end of the run. An empty world counts as fully
    /// happy.
    pub fn happiness(&self) -> f64 {
        happiness_ratio(self.final_happy, self.n_agents)
    }
}

pub fn happiness_ratio(happy: usize, n_agents: usize) -> f64 {
    if n_agents == 0 {
        return 1.0;
    }
    happy as f64 / n_agents as f64
}

/// Patch counts per encoded type. Index 0 holds type code 1.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PatchCounts {
    pub per_type: Vec<usize>,
}

impl PatchCounts {
    pub fn total(&self) -> usize {
        self.per_type.iter().sum()
    }

    /// Patch count for an encoded type code (`1..`); zero for unknown codes.
    pub fn for_code(&self, code: u8) -> usize {
        usize::from(code)
            .checked_sub(1)
            .and_then(|i| self.per_type.get(i))
            .copied()
            .unwrap_or(0)
    }
}

/// Summary handed back to the sweep harness for one scenario.
///
/// Exactly one of `grid` and `n_patches` is present, depending on the requested
/// output mode.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScenarioResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<Vec<Vec<u8>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_patches: Option<f64>,
    pub happiness: f64,
    pub n_steps: f64,
    pub n_agents: f64,
}
