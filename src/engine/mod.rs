//! Render-clock coordination.
//!
//! The scheduler is the one component shared across threads: the render
//! thread advances it once per rendered sample while control threads park on
//! future tick values or push transport commands through a lock-free queue.

pub mod scheduler;

pub use scheduler::{TickHandle, TickScheduler};
#[cfg(feature = "rtrb")]
pub use scheduler::{TransportHandle, TransportMessage};
