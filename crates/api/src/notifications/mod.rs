//! Background delivery of workflow notifications.

pub mod dispatcher;

pub use dispatcher::NotificationDispatcher;
