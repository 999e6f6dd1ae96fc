//! Deterministic point source replaying a fixed cycle of points.

use super::PointSource;

/// A point strictly inside the quarter circle.
const INSIDE_POINT: (f64, f64) = (0.5, 0.5);

/// A point strictly outside the quarter circle.
const OUTSIDE_POINT: (f64, f64) = (0.9, 0.9);

/// Replays a fixed cycle of points forever.
///
/// Used to drive the engine with an exactly known inside/outside ratio.
///
/// # Examples
///
/// ```rust
/// use piculator_engine::rng::{PointSource, ScriptedPointSource};
///
/// let mut source = ScriptedPointSource::with_split(3, 1);
/// let inside = (0..4)
///     .map(|_| source.next_point())
///     .filter(|&(x, y)| x * x + y * y <= 1.0)
///     .count();
/// assert_eq!(inside, 3);
/// ```
#[derive(Clone, Debug)]
pub struct ScriptedPointSource {
    points: Vec<(f64, f64)>,
    cursor: usize,
}

impl ScriptedPointSource {
    /// Creates a source cycling through `points`.
    ///
    /// # Panics
    ///
    /// Panics if `points` is empty.
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        assert!(!points.is_empty(), "scripted source needs at least one point");
        Self { points, cursor: 0 }
    }

    /// Creates a source whose cycle holds `inside` points within the circle
    /// followed by `outside` points beyond it.
    ///
    /// Every `inside + outside` draws reproduce the exact ratio.
    pub fn with_split(inside: usize, outside: usize) -> Self {
        let mut points = vec![INSIDE_POINT; inside];
        points.resize(inside + outside, OUTSIDE_POINT);
        Self::new(points)
    }

    /// Returns the length of one cycle.
    #[inline]
    pub fn cycle_len(&self) -> usize {
        self.points.len()
    }
}

impl PointSource for ScriptedPointSource {
    #[inline]
    fn next_point(&mut self) -> (f64, f64) {
        let point = self.points[self.cursor];
        self.cursor = (self.cursor + 1) % self.points.len();
        point
    }
}
