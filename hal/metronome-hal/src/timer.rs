//! Periodic tick source abstraction
//!
//! The scheduler consumes a single notification, "one tick elapsed",
//! delivered at a fixed rate. A tick source only controls whether those
//! notifications are delivered; it never touches scheduler state.

/// Hardware tick source
pub trait TickSource {
    /// Tick period in milliseconds
    ///
    /// Fixed for the lifetime of the source.
    fn tick_ms(&self) -> u32;

    /// Enable delivery of tick notifications
    fn start(&mut self);

    /// Disable delivery of tick notifications
    fn stop(&mut self);

    /// Tick rate in Hz (rounded down)
    fn frequency_hz(&self) -> u32 {
        1000 / self.tick_ms().max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTick(u32);

    impl TickSource for FixedTick {
        fn tick_ms(&self) -> u32 {
            self.0
        }

        fn start(&mut self) {}

        fn stop(&mut self) {}
    }

    #[test]
    fn test_frequency() {
        // 25 ms tick is the 40 Hz scheduler interrupt
        assert_eq!(FixedTick(25).frequency_hz(), 40);
        assert_eq!(FixedTick(10).frequency_hz(), 100);
        assert_eq!(FixedTick(0).frequency_hz(), 1000);
    }
}
