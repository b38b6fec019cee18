//! Registry Core - Shared functionality for the dapp registry tools
//!
//! Where things live on disk, and what time it is.

pub mod clock;
pub mod paths;

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use paths::Paths;
