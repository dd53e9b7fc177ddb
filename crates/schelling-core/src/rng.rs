use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

/// Create a deterministic RNG from a seed.
pub fn create_rng(seed: u64) -> ChaCha12Rng {
    ChaCha12Rng::seed_from_u64(seed)
}

/// Derive the seed for one replicate of a scenario, ensuring independent streams.
pub fn derive_replicate_seed(base_seed: u64, replicate: usize) -> u64 {
    base_seed.wrapping_add(replicate as u64 * crate::constants::RNG_DERIVATION_PRIME)
}
