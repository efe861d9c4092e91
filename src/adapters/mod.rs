// Adapters layer: concrete implementations of the domain ports.

pub mod clock;
pub mod notifier;
pub mod rest;

pub use clock::{FixedClock, SystemClock};
pub use notifier::HttpNotifier;
pub use rest::RestStore;
