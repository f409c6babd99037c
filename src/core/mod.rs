//! Framework pieces shared by every component: event bus, time, timers

pub mod clock;
pub mod events;
pub mod timers;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use events::{Event, EventBus, ListenerId};
pub use timers::{TimerId, TimerQueue};
