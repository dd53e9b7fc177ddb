use crate::agent::AgentId;
use rand::seq::SliceRandom;
use rand::Rng;

/// Random activation: every registered agent acts once per step, in a freshly
/// shuffled order each step.
#[derive(Clone, Debug, Default)]
pub struct RandomActivation {
    agents: Vec<AgentId>,
    order: Vec<AgentId>,
    steps: usize,
}

impl RandomActivation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: AgentId) {
        self.agents.push(id);
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn steps_taken(&self) -> usize {
        self.steps
    }

    /// Activate every agent once in a uniformly random order.
    ///
    /// `activate` receives the RNG back so the caller can draw from the same stream
    /// inside the callback. The step counter only advances once every agent has been
    /// activated; an error from `activate` aborts the step.
    pub fn step<R, E>(
        &mut self,
        rng: &mut R,
        mut activate: impl FnMut(&mut R, AgentId) -> Result<(), E>,
    ) -> Result<(), E>
    where
        R: Rng,
    {
        self.order.clear();
        self.order.extend_from_slice(&self.agents);
        self.order.shuffle(rng);
        for &id in &self.order {
            activate(rng, id)?;
        }
        self.steps += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;
    use std::convert::Infallible;

    fn scheduler_with(n: usize) -> RandomActivation {
        let mut scheduler = RandomActivation::new();
        for id in 0..n {
            scheduler.add(id);
        }
        scheduler
    }

    fn record_step(scheduler: &mut RandomActivation, rng: &mut impl Rng) -> Vec<AgentId> {
        let mut seen = Vec::new();
        scheduler
            .step(rng, |_, id| {
                seen.push(id);
                Ok::<(), Infallible>(())
            })
            .unwrap();
        seen
    }

    #[test]
    fn each_agent_activates_exactly_once_per_step() {
        let mut scheduler = scheduler_with(50);
        let mut rng = create_rng(11);
        let mut seen = record_step(&mut scheduler, &mut rng);
        seen.sort_unstable();
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
        assert_eq!(scheduler.steps_taken(), 1);
    }

    #[test]
    fn order_is_reshuffled_between_steps() {
        let mut scheduler = scheduler_with(50);
        let mut rng = create_rng(11);
        let first = record_step(&mut scheduler, &mut rng);
        let second = record_step(&mut scheduler, &mut rng);
        assert_ne!(first, second);
        assert_eq!(scheduler.steps_taken(), 2);
    }

    #[test]
    fn failed_activation_does_not_count_as_a_step() {
        let mut scheduler = scheduler_with(3);
        let mut rng = create_rng(0);
        let result = scheduler.step(&mut rng, |_, _| Err("boom"));
        assert_eq!(result, Err("boom"));
        assert_eq!(scheduler.steps_taken(), 0);
    }

    #[test]
    fn empty_scheduler_still_counts_steps() {
        let mut scheduler = RandomActivation::new();
        let mut rng = create_rng(0);
        assert!(record_step(&mut scheduler, &mut rng).is_empty());
        assert_eq!(scheduler.steps_taken(), 1);
    }
}
