use crate::agent::{Agent, AgentId, AgentType, Position};
use crate::config::{ScenarioConfig, ScenarioConfigError};
use crate::grid::{Grid, GridError};
use crate::metrics::{RunOutcome, RunSummary, TickMetrics};
use crate::rng::create_rng;
use crate::scheduler::RandomActivation;
use crate::snapshot::GridSnapshot;
use rand::Rng;
use rand_chacha::ChaCha12Rng;
use std::{error::Error, fmt};
use tracing::{debug, info, warn};

mod phases;


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Running,
    Converged,
    BudgetExhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorldInitError {
    Config(ScenarioConfigError),
    Grid(GridError),
}

impl fmt::Display for WorldInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldInitError::Config(e) => write!(f, "{e}"),
            WorldInitError::Grid(e) => write!(f, "failed to seed grid: {e}"),
        }
    }
}

impl From<ScenarioConfigError> for WorldInitError {
    fn from(err: ScenarioConfigError) -> Self {
        WorldInitError::Config(err)
    }
}

impl From<GridError> for WorldInitError {
    fn from(err: GridError) -> Self {
        WorldInitError::Grid(err)
    }
}

impl Error for WorldInitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorldInitError::Config(e) => Some(e),
            WorldInitError::Grid(e) => Some(e),
        }
    }
}

/// Failure that aborts a run. `tick` is the 1-based tick in which it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    NoCapacity { tick: usize },
    Grid { tick: usize, source: GridError },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::NoCapacity { tick } => write!(
                f,
                "tick {tick}: no empty cell to relocate an unhappy agent (density leaves no free cell)"
            ),
            RunError::Grid { tick, source } => write!(f, "tick {tick}: {source}"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RunError::NoCapacity { .. } => None,
            RunError::Grid { source, .. } => Some(source),
        }
    }
}

impl RunError {
    fn from_grid(tick: usize, err: GridError) -> Self {
        match err {
            GridError::NoCapacity => RunError::NoCapacity { tick },
            source => RunError::Grid { tick, source },
        }
    }
}

/// Schelling model state: the grid, its agents and the activation schedule.
pub struct World {
    grid: Grid,
    agents: Vec<Agent>,
    scheduler: RandomActivation,
    rng: ChaCha12Rng,
    homophily: u32,
    happy: usize,
    state: RunState,
    happy_history: Vec<usize>,
}

impl World {
    /// Empty world with a caller-supplied random stream.
    pub fn new(height: usize, width: usize, homophily: u32, rng: ChaCha12Rng) -> Self {
        Self {
            grid: Grid::new(height, width),
            agents: Vec::new(),
            scheduler: RandomActivation::new(),
            rng,
            homophily,
            happy: 0,
            state: RunState::Running,
            happy_history: Vec::new(),
        }
    }

    /// Validate `config` and populate the grid.
    ///
    /// Cells are visited row-major; each is occupied with probability `density`, and
    /// an occupant is a minority agent with probability `minority_fraction`. Both
    /// draws come from the world's RNG, so the seed fixes the layout.
    pub fn seed(config: &ScenarioConfig) -> Result<Self, WorldInitError> {
        config.validate()?;
        let mut world = Self::new(
            config.height,
            config.width,
            config.homophily,
            create_rng(config.seed),
        );
        let cells: Vec<Position> = world.grid.positions().collect();
        for pos in cells {
            if world.rng.random::<f64>() < config.density {
                let kind = if world.rng.random::<f64>() < config.minority_fraction {
                    AgentType::Minority
                } else {
                    AgentType::Majority
                };
                world.add_agent(kind, pos)?;
            }
        }
        debug!(
            agents = world.agents.len(),
            cells = world.grid.cell_count(),
            seed = config.seed,
            "seeded world"
        );
        Ok(world)
    }

    /// Place a new agent and register it with the scheduler.
    pub fn add_agent(&mut self, kind: AgentType, position: Position) -> Result<AgentId, GridError> {
        let id = self.agents.len();
        let agent = Agent::new(id, kind, position);
        self.grid.place(&agent)?;
        self.agents.push(agent);
        self.scheduler.add(id);
        Ok(id)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent_count(&self) -> usize {
        self.scheduler.agent_count()
    }

    pub fn steps_taken(&self) -> usize {
        self.scheduler.steps_taken()
    }

    /// Happy agents counted during the most recent tick.
    pub fn happy_count(&self) -> usize {
        self.happy
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Whether `id` currently has enough same-type neighbours to stay put.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not returned by [`World::add_agent`] or seeding.
    pub fn is_happy(&self, id: AgentId) -> bool {
        let agent = &self.agents[id];
        phases::similar_neighbours(&self.grid, &self.agents, agent.kind, agent.position)
            >= self.homophily as usize
    }

    /// Activate every agent once. Unhappy agents relocate immediately, so later
    /// agents in the same tick see the grid as already changed.
    pub fn tick(&mut self) -> Result<TickMetrics, RunError> {
        let tick = self.scheduler.steps_taken() + 1;
        self.happy = 0;
        let moved = match self.step_agents(tick) {
            Ok(moved) => moved,
            Err(err) => {
                warn!(tick, error = %err, "run aborted");
                return Err(err);
            }
        };
        self.happy_history.push(self.happy);
        if self.happy == self.scheduler.agent_count() {
            self.state = RunState::Converged;
        }
        debug!(tick, happy = self.happy, moved, "tick complete");
        Ok(TickMetrics {
            tick,
            happy: self.happy,
            moved,
        })
    }

    /// Tick until every agent is happy or `max_steps` ticks have run in total.
    pub fn run(&mut self, max_steps: usize) -> Result<RunSummary, RunError> {
        while self.is_running() && self.scheduler.steps_taken() < max_steps {
            self.tick()?;
        }
        if self.state == RunState::Running {
            self.state = RunState::BudgetExhausted;
        }
        let outcome = match self.state {
            RunState::Converged => RunOutcome::Converged,
            RunState::Running | RunState::BudgetExhausted => RunOutcome::BudgetExhausted,
        };
        info!(
            ?outcome,
            steps = self.steps_taken(),
            agents = self.agent_count(),
            happy = self.happy,
            "run finished"
        );
        Ok(RunSummary {
            outcome,
            steps: self.steps_taken(),
            n_agents: self.agent_count(),
            final_happy: self.happy,
            happy_history: self.happy_history.clone(),
        })
    }

    /// Encoded copy of the grid: `0` empty, otherwise the occupant's type code.
    pub fn snapshot(&self) -> GridSnapshot {
        let cells = self
            .grid
            .positions()
            .map(|pos| {
                self.grid
                    .get(pos)
                    .map(|id| self.agents[id].kind.code())
                    .unwrap_or(0)
            })
            .collect();
        GridSnapshot::new(self.grid.height(), self.grid.width(), cells)
    }
}
