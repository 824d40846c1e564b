pub mod observers;
pub mod scheduler;
pub mod signal;

pub use observers::{Observe, ObserverId, ObserverList, Subscription};
pub use scheduler::{AnimationStatus, Scheduler};
pub use signal::{create_signal, Signal};
