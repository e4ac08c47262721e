//! Random number generator of the search.
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Seedable generator owned by the search context.
pub struct SearchRng {
    rng: SmallRng,
}

impl Default for SearchRng {
    fn default() -> SearchRng {
        SearchRng::new(0)
    }
}

impl SearchRng {
    pub fn new(seed: u64) -> SearchRng {
        SearchRng {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Restart the sequence of random numbers from the given seed.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }
}
