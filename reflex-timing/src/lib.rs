pub mod schedule;
pub mod timer;

pub use schedule::{Scheduled, Scheduler, TimerToken};
pub use timer::{ManualTimer, MonotonicTimer, Timer};
