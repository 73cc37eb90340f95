// Event-driven plumbing between the online game service and the components
// that react to committed changes.

pub use bus::EventBus;
pub use events::GameEvent;
pub use handler::{GameEventError, GameEventHandler};
pub use subscription::GameSubscription;

mod bus;
mod events;
mod handler;
mod subscription;
