//! External delivery channels for project notifications.

pub mod email;
