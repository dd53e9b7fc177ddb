/// Largest supported grid, in cells. Keeps label and empty-cell buffers bounded.
pub const MAX_GRID_CELLS: usize = 4_194_304;

/// Largest step budget a single run may request.
pub const MAX_STEPS: usize = 1_000_000;

/// Prime multiplier used to derive replicate RNG streams from a base seed.
/// Chosen so streams for consecutive replicate indices have minimal overlap.
pub const RNG_DERIVATION_PRIME: u64 = 7919;

/// Size of the Moore neighbourhood around a cell.
pub const MOORE_NEIGHBOURHOOD: usize = 8;
