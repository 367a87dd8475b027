//! Millisecond tick source

/// Free-running millisecond counter
///
/// Wraps around after ~49 days; use [`elapsed_ms`] for differences.
pub trait Clock {
    /// Milliseconds since an arbitrary epoch
    fn now_ms(&self) -> u32;
}

/// Milliseconds elapsed from `start` to `now`, wrap-safe
pub fn elapsed_ms(start: u32, now: u32) -> u32 {
    now.wrapping_sub(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_simple() {
        assert_eq!(elapsed_ms(100, 350), 250);
    }

    #[test]
    fn test_elapsed_across_wrap() {
        assert_eq!(elapsed_ms(u32::MAX - 9, 10), 20);
    }
}
