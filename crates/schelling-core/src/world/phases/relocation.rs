use super::super::{RunError, World};
use crate::agent::{Agent, AgentType, Position};
use crate::grid::Grid;

/// Count agents of `kind` in the Moore neighbourhood of `position`.
pub(in crate::world) fn similar_neighbours(
    grid: &Grid,
    agents: &[Agent],
    kind: AgentType,
    position: Position,
) -> usize {
    let mut similar = 0usize;
    grid.for_each_neighbor(position, |id| {
        if agents[id].kind == kind {
            similar += 1;
        }
    });
    similar
}

impl World {
    /// Run the happiness rule for every agent in random order. Returns how many
    /// agents relocated.
    pub(in crate::world) fn step_agents(&mut self, tick: usize) -> Result<usize, RunError> {
        let Self {
            grid,
            agents,
            scheduler,
            rng,
            homophily,
            happy,
            ..
        } = self;
        let threshold = *homophily as usize;
        let mut moved = 0usize;

        scheduler.step(rng, |rng, id| {
            let Agent { kind, position, .. } = agents[id];
            if similar_neighbours(grid, agents, kind, position) < threshold {
                if let Err(err) = grid.move_to_empty(&mut agents[id], rng) {
                    return Err(RunError::from_grid(tick, err));
                }
                moved += 1;
            } else {
                *happy += 1;
            }
            Ok(())
        })?;

        Ok(moved)
    }
}
