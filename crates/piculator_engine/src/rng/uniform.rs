//! Entropy-seeded uniform point source.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};

use super::PointSource;

/// Golden-ratio increment used to spread derived stream seeds apart.
const STREAM_SPREAD: u64 = 0x9E37_79B9_7F4A_7C15;

/// Uniform point source backed by one generator per coordinate.
///
/// The x and y coordinates come from two independently seeded `StdRng`
/// instances so that neither coordinate stream is correlated with the other.
/// All sources use the same `Uniform[0, 1)` distribution, which keeps counts
/// from different workers statistically comparable.
pub struct UniformPointSource {
    x_rng: StdRng,
    y_rng: StdRng,
    unit: Uniform<f64>,
}

impl UniformPointSource {
    /// Creates a source seeded from operating-system entropy.
    pub fn from_entropy() -> Self {
        Self::from_rngs(StdRng::from_entropy(), StdRng::from_entropy())
    }

    /// Creates a reproducible source for stream `stream` of base seed `seed`.
    ///
    /// The x and y generators receive distinct seeds derived from both
    /// arguments, so the same `(seed, stream)` always yields the same points.
    pub fn from_seed(seed: u64, stream: u64) -> Self {
        let x_seed = seed ^ (2 * stream + 1).wrapping_mul(STREAM_SPREAD);
        let y_seed = seed ^ (2 * stream + 2).wrapping_mul(STREAM_SPREAD);
        Self::from_rngs(StdRng::seed_from_u64(x_seed), StdRng::seed_from_u64(y_seed))
    }

    /// Creates the source for worker `index`.
    ///
    /// With a base seed the source is reproducible; without one it is seeded
    /// from entropy.
    pub fn for_worker(seed: Option<u64>, index: usize) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed, index as u64),
            None => Self::from_entropy(),
        }
    }

    fn from_rngs(x_rng: StdRng, y_rng: StdRng) -> Self {
        Self {
            x_rng,
            y_rng,
            unit: Uniform::new(0.0, 1.0),
        }
    }
}

impl PointSource for UniformPointSource {
    #[inline]
    fn next_point(&mut self) -> (f64, f64) {
        (
            self.unit.sample(&mut self.x_rng),
            self.unit.sample(&mut self.y_rng),
        )
    }
}
