/// Wall-clock source, injectable so cache expiry can be tested.
pub trait ClockPort: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}
