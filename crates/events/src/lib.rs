//! Roofdesk event bus and notification delivery.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the event envelope carried on the bus.
//! - [`ProjectNotice`]: the workflow notification payload, with the event
//!   type names in [`notice`].
//! - [`delivery`]: SMTP email delivery.

pub mod bus;
pub mod delivery;
pub mod notice;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use notice::ProjectNotice;
