//! Time utilities.

pub mod clock;

pub use clock::{Clock, MockClock, SharedClock, SystemClock};
