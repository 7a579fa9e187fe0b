use agora_core::Timestamp;

/// Port for time abstraction
///
/// This allows the marketplace to use different time sources:
/// - Real system time for production
/// - Frozen, manually-advanced time for deterministic auction tests
pub trait Clock: Send + Sync {
    /// Get the current time according to this clock
    fn now(&self) -> Timestamp;

    /// Get the clock's name/identifier for debugging
    fn name(&self) -> &str {
        "Clock"
    }
}
