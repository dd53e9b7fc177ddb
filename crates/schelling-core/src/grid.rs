use crate::agent::{Agent, AgentId, Position};
use crate::constants::MOORE_NEIGHBOURHOOD;
use rand::Rng;
use std::{error::Error, fmt};

const NOT_EMPTY: usize = usize::MAX;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    OutOfBounds { row: usize, col: usize },
    Occupied { row: usize, col: usize },
    Vacant { row: usize, col: usize },
    NoCapacity,
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::OutOfBounds { row, col } => {
                write!(f, "cell ({row}, {col}) lies outside the grid")
            }
            GridError::Occupied { row, col } => write!(f, "cell ({row}, {col}) is occupied"),
            GridError::Vacant { row, col } => write!(f, "cell ({row}, {col}) is empty"),
            GridError::NoCapacity => write!(f, "no empty cell available"),
        }
    }
}

impl Error for GridError {}

/// Fixed-size toroidal grid holding at most one agent per cell.
///
/// Empty cells are tracked in an index set so a uniformly random empty cell can be
/// drawn in O(1) and occupancy changes stay O(1).
#[derive(Clone, Debug)]
pub struct Grid {
    height: usize,
    width: usize,
    cells: Vec<Option<AgentId>>,
    empties: Vec<usize>,
    empty_slot: Vec<usize>,
}

impl Grid {
    pub fn new(height: usize, width: usize) -> Self {
        assert!(height > 0, "height must be positive");
        assert!(width > 0, "width must be positive");
        let n = height * width;
        Self {
            height,
            width,
            cells: vec![None; n],
            empties: (0..n).collect(),
            empty_slot: (0..n).collect(),
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn empty_count(&self) -> usize {
        self.empties.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.len() - self.empties.len()
    }

    /// Row-major iterator over every cell position.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |row| (0..self.width).map(move |col| Position::new(row, col)))
    }

    pub fn get(&self, pos: Position) -> Option<AgentId> {
        self.index_of(pos).ok().and_then(|idx| self.cells[idx])
    }

    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos).is_none()
    }

    /// Wrap a signed offset from `pos` onto the torus.
    pub fn wrap(&self, pos: Position, d_row: isize, d_col: isize) -> Position {
        let row = (pos.row as isize + d_row).rem_euclid(self.height as isize) as usize;
        let col = (pos.col as isize + d_col).rem_euclid(self.width as isize) as usize;
        Position::new(row, col)
    }

    /// Distinct Moore-neighbourhood cells of `pos`, excluding `pos` itself.
    ///
    /// On grids narrower than three cells along an axis the wrapped offsets collide;
    /// each distinct cell is reported once.
    pub fn neighbourhood(&self, pos: Position) -> ([Position; MOORE_NEIGHBOURHOOD], usize) {
        let mut out = [pos; MOORE_NEIGHBOURHOOD];
        let mut len = 0usize;
        for d_row in -1..=1isize {
            for d_col in -1..=1isize {
                if d_row == 0 && d_col == 0 {
                    continue;
                }
                let candidate = self.wrap(pos, d_row, d_col);
                if candidate == pos || out[..len].contains(&candidate) {
                    continue;
                }
                out[len] = candidate;
                len += 1;
            }
        }
        (out, len)
    }

    /// Visit every agent in the Moore neighbourhood of `pos`.
    pub fn for_each_neighbor(&self, pos: Position, mut visitor: impl FnMut(AgentId)) {
        let (cells, len) = self.neighbourhood(pos);
        for cell in &cells[..len] {
            if let Some(id) = self.cells[self.flat(*cell)] {
                visitor(id);
            }
        }
    }

    /// Agents occupying the Moore neighbourhood of `pos`.
    pub fn neighbors(&self, pos: Position) -> Vec<AgentId> {
        let mut out = Vec::with_capacity(MOORE_NEIGHBOURHOOD);
        self.for_each_neighbor(pos, |id| out.push(id));
        out
    }

    /// Uniformly random empty cell.
    pub fn random_empty_cell(&self, rng: &mut impl Rng) -> Result<Position, GridError> {
        if self.empties.is_empty() {
            return Err(GridError::NoCapacity);
        }
        let idx = self.empties[rng.random_range(0..self.empties.len())];
        Ok(self.position_of(idx))
    }

    pub fn place(&mut self, agent: &Agent) -> Result<(), GridError> {
        let idx = self.index_of(agent.position)?;
        if self.cells[idx].is_some() {
            return Err(occupied(agent.position));
        }
        self.cells[idx] = Some(agent.id);
        self.mark_occupied(idx);
        Ok(())
    }

    pub fn remove(&mut self, pos: Position) -> Result<AgentId, GridError> {
        let idx = self.index_of(pos)?;
        let id = self.cells[idx].take().ok_or(GridError::Vacant {
            row: pos.row,
            col: pos.col,
        })?;
        self.mark_empty(idx);
        Ok(id)
    }

    /// Move `agent` to `to`, vacating its current cell and updating its position.
    ///
    /// Validation happens before any mutation, so on error neither the grid nor the
    /// agent changes.
    pub fn move_agent(&mut self, agent: &mut Agent, to: Position) -> Result<(), GridError> {
        let from = self.index_of(agent.position)?;
        let dest = self.index_of(to)?;
        if self.cells[from] != Some(agent.id) {
            return Err(GridError::Vacant {
                row: agent.position.row,
                col: agent.position.col,
            });
        }
        if self.cells[dest].is_some() {
            return Err(occupied(to));
        }
        self.cells[from] = None;
        self.mark_empty(from);
        self.cells[dest] = Some(agent.id);
        self.mark_occupied(dest);
        agent.position = to;
        Ok(())
    }

    /// Relocate `agent` to a uniformly random empty cell other than its own.
    pub fn move_to_empty(
        &mut self,
        agent: &mut Agent,
        rng: &mut impl Rng,
    ) -> Result<Position, GridError> {
        let to = self.random_empty_cell(rng)?;
        self.move_agent(agent, to)?;
        Ok(to)
    }

    fn index_of(&self, pos: Position) -> Result<usize, GridError> {
        if pos.row >= self.height || pos.col >= self.width {
            return Err(GridError::OutOfBounds {
                row: pos.row,
                col: pos.col,
            });
        }
        Ok(self.flat(pos))
    }

    fn flat(&self, pos: Position) -> usize {
        pos.row * self.width + pos.col
    }

    fn position_of(&self, idx: usize) -> Position {
        Position::new(idx / self.width, idx % self.width)
    }

    fn mark_occupied(&mut self, idx: usize) {
        let slot = self.empty_slot[idx];
        debug_assert_ne!(slot, NOT_EMPTY, "cell already marked occupied");
        self.empties.swap_remove(slot);
        if let Some(&moved) = self.empties.get(slot) {
            self.empty_slot[moved] = slot;
        }
        self.empty_slot[idx] = NOT_EMPTY;
    }

    fn mark_empty(&mut self, idx: usize) {
        debug_assert_eq!(self.empty_slot[idx], NOT_EMPTY, "cell already marked empty");
        self.empty_slot[idx] = self.empties.len();
        self.empties.push(idx);
    }
}

fn occupied(pos: Position) -> GridError {
    GridError::Occupied {
        row: pos.row,
        col: pos.col,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentType;
    use crate::rng::create_rng;

    fn agent_at(id: AgentId, row: usize, col: usize) -> Agent {
        Agent::new(id, AgentType::Majority, Position::new(row, col))
    }

    #[test]
    fn neighbourhood_wraps_at_corner() {
        let grid = Grid::new(5, 5);
        let (cells, len) = grid.neighbourhood(Position::new(0, 0));
        assert_eq!(len, 8);
        let cells = &cells[..len];
        assert!(cells.contains(&Position::new(4, 4)));
        assert!(cells.contains(&Position::new(4, 0)));
        assert!(cells.contains(&Position::new(0, 4)));
        assert!(cells.contains(&Position::new(1, 1)));
        assert!(!cells.contains(&Position::new(0, 0)));
    }

    #[test]
    fn neighbourhood_deduplicates_on_tiny_grids() {
        let grid = Grid::new(2, 2);
        let (_, len) = grid.neighbourhood(Position::new(0, 0));
        assert_eq!(len, 3);

        let grid = Grid::new(1, 1);
        let (_, len) = grid.neighbourhood(Position::new(0, 0));
        assert_eq!(len, 0);
    }

    #[test]
    fn neighbors_reports_only_occupied_cells() {
        let mut grid = Grid::new(4, 4);
        grid.place(&agent_at(0, 0, 0)).unwrap();
        grid.place(&agent_at(1, 3, 3)).unwrap();
        grid.place(&agent_at(2, 2, 2)).unwrap();
        let mut found = grid.neighbors(Position::new(0, 0));
        found.sort_unstable();
        assert_eq!(found, vec![1]);
    }

    #[test]
    fn place_rejects_occupied_and_out_of_bounds() {
        let mut grid = Grid::new(3, 3);
        grid.place(&agent_at(0, 1, 1)).unwrap();
        assert_eq!(
            grid.place(&agent_at(1, 1, 1)),
            Err(GridError::Occupied { row: 1, col: 1 })
        );
        assert_eq!(
            grid.place(&agent_at(2, 3, 0)),
            Err(GridError::OutOfBounds { row: 3, col: 0 })
        );
    }

    #[test]
    fn move_agent_updates_cells_and_position_together() {
        let mut grid = Grid::new(3, 3);
        let mut agent = agent_at(7, 0, 0);
        grid.place(&agent).unwrap();
        grid.move_agent(&mut agent, Position::new(2, 1)).unwrap();
        assert_eq!(agent.position, Position::new(2, 1));
        assert_eq!(grid.get(Position::new(2, 1)), Some(7));
        assert!(grid.is_empty(Position::new(0, 0)));
        assert_eq!(grid.occupied_count(), 1);
        assert_eq!(grid.empty_count(), 8);
    }

    #[test]
    fn failed_move_leaves_state_untouched() {
        let mut grid = Grid::new(3, 3);
        let mut a = agent_at(0, 0, 0);
        let b = agent_at(1, 1, 1);
        grid.place(&a).unwrap();
        grid.place(&b).unwrap();
        assert!(grid.move_agent(&mut a, Position::new(1, 1)).is_err());
        assert_eq!(a.position, Position::new(0, 0));
        assert_eq!(grid.get(Position::new(0, 0)), Some(0));
        assert_eq!(grid.empty_count(), 7);
    }

    #[test]
    fn remove_vacates_cell() {
        let mut grid = Grid::new(2, 3);
        grid.place(&agent_at(4, 1, 2)).unwrap();
        assert_eq!(grid.remove(Position::new(1, 2)), Ok(4));
        assert_eq!(
            grid.remove(Position::new(1, 2)),
            Err(GridError::Vacant { row: 1, col: 2 })
        );
        assert_eq!(grid.empty_count(), 6);
    }

    #[test]
    fn random_empty_cell_fails_on_full_grid() {
        let mut grid = Grid::new(1, 2);
        grid.place(&agent_at(0, 0, 0)).unwrap();
        grid.place(&agent_at(1, 0, 1)).unwrap();
        let mut rng = create_rng(1);
        assert_eq!(grid.random_empty_cell(&mut rng), Err(GridError::NoCapacity));
    }

    #[test]
    fn move_to_empty_never_picks_an_occupied_cell() {
        let mut grid = Grid::new(3, 3);
        let mut agents: Vec<Agent> = (0..8).map(|i| agent_at(i, i / 3, i % 3)).collect();
        for agent in &agents {
            grid.place(agent).unwrap();
        }
        let mut rng = create_rng(3);
        let dest = grid.move_to_empty(&mut agents[0], &mut rng).unwrap();
        assert_eq!(dest, Position::new(2, 2));
        assert!(grid.is_empty(Position::new(0, 0)));
    }

    #[test]
    fn positions_are_row_major() {
        let grid = Grid::new(2, 3);
        let order: Vec<Position> = grid.positions().collect();
        assert_eq!(order[0], Position::new(0, 0));
        assert_eq!(order[1], Position::new(0, 1));
        assert_eq!(order[3], Position::new(1, 0));
        assert_eq!(order.len(), 6);
    }
}
