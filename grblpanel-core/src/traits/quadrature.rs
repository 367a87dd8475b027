//! MPG encoder input

/// Per-axis jog wheel position and speed
///
/// Counts are free running and may wrap; only differences are used.
pub trait QuadratureSource {
    /// Current raw count for an axis
    fn count(&self, axis: usize) -> i32;

    /// Recent speed in counts per second, sign gives direction
    fn velocity(&self, axis: usize) -> f32;
}
