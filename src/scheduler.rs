//! Turns host frame timestamps into simulation time steps.

/// Longest step the simulation is ever asked to take, in seconds. Long gaps
/// (a suspended terminal, a stalled host) collapse to this.
pub const MAX_FRAME_DT: f32 = 0.05;

#[derive(Debug, Default)]
pub struct Scheduler {
    last_timestamp: Option<f64>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame timestamp in milliseconds.
    ///
    /// The first call only records the baseline and returns `None`. Later
    /// calls return the elapsed seconds, clamped to `0..=MAX_FRAME_DT`.
    pub fn tick(&mut self, timestamp_ms: f64) -> Option<f32> {
        let last = self.last_timestamp.replace(timestamp_ms)?;
        let dt = ((timestamp_ms - last) / 1000.0) as f32;
        Some(dt.clamp(0.0, MAX_FRAME_DT))
    }

    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }
}
