use serde::{Deserialize, Serialize};

/// Index of an agent in the world's agent table. Stable for the whole run.
pub type AgentId = usize;

/// Cell coordinate on the torus, `row` in `[0, height)` and `col` in `[0, width)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Group membership of an agent.
///
/// Seeding only produces these two types, so the output encoding is total:
/// `Majority` is reported as `1`, `Minority` as `2`, and empty cells as `0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    Majority,
    Minority,
}

impl AgentType {
    /// Internal type index (0 for majority, 1 for minority).
    pub const fn index(self) -> usize {
        match self {
            AgentType::Majority => 0,
            AgentType::Minority => 1,
        }
    }

    /// Output encoding for grid snapshots. Zero is reserved for empty cells.
    pub const fn code(self) -> u8 {
        self.index() as u8 + 1
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Agent {
    pub id: AgentId,
    pub kind: AgentType,
    pub position: Position,
}

impl Agent {
    pub fn new(id: AgentId, kind: AgentType, position: Position) -> Self {
        Self { id, kind, position }
    }
}
