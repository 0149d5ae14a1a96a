//! Time-of-day window.
//!
//! The window is open strictly between `on_time` and `off_time`. When
//! `on_time >= off_time` the window wraps past midnight (e.g. 23:00–01:00).

/// Seconds in one day; schedule times live in `[0, SECONDS_PER_DAY)`.
pub const SECONDS_PER_DAY: u32 = 86_400;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleBlock {
    pub enabled: bool,
    pub state: bool,
    /// Seconds-of-day the window opens (exclusive).
    pub on_time: i32,
    /// Seconds-of-day the window closes (exclusive).
    pub off_time: i32,
}

impl ScheduleBlock {
    pub const fn new(enabled: bool) -> Self {
        Self {
            enabled,
            state: false,
            on_time: 0,
            off_time: 0,
        }
    }

    /// Whether `ctod` falls inside the window.
    pub fn is_open(&self, ctod: u32) -> bool {
        let ctod = i64::from(ctod);
        let (on, off) = (i64::from(self.on_time), i64::from(self.off_time));
        if on < off {
            on < ctod && ctod < off
        } else {
            ctod < off || ctod > on
        }
    }

    /// Recompute the state. With no wall-clock time available the previous
    /// state is kept.
    pub fn update(&mut self, ctod: Option<u32>) -> bool {
        if let Some(ctod) = ctod {
            self.state = self.is_open(ctod);
        }
        self.state
    }
}
