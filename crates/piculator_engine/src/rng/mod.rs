//! # Random Point Sources
//!
//! Every worker draws its points from its own [`PointSource`]. Sources are
//! never shared between threads, so generation needs no synchronisation.
//!
//! ## Module Structure
//!
//! - [`uniform`]: production source, two independent `StdRng` streams (one
//!   per coordinate) over an identically configured `Uniform[0, 1)`
//! - [`scripted`]: deterministic cyclic source for tests and benchmarks
//!
//! ## Usage Example
//!
//! ```rust
//! use piculator_engine::rng::{PointSource, UniformPointSource};
//!
//! // Seeded source for reproducible runs; worker 0 of the pool
//! let mut source = UniformPointSource::for_worker(Some(12345), 0);
//!
//! let (x, y) = source.next_point();
//! assert!((0.0..1.0).contains(&x));
//! assert!((0.0..1.0).contains(&y));
//! ```

mod scripted;
mod uniform;

pub use scripted::ScriptedPointSource;
pub use uniform::UniformPointSource;

/// An unbounded stream of points in the unit square.
///
/// Implementations must never fail once constructed.
pub trait PointSource: Send {
    /// Draws the next `(x, y)` pair.
    fn next_point(&mut self) -> (f64, f64);
}

impl<S: PointSource + ?Sized> PointSource for Box<S> {
    #[inline]
    fn next_point(&mut self) -> (f64, f64) {
        (**self).next_point()
    }
}
