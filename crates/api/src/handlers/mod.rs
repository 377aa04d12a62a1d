pub mod activity;
pub mod auth;
pub mod inventory;
pub mod notification;
pub mod pricing;
pub mod project;
pub mod project_material;
pub mod user;
pub mod warehouse;
pub mod workflow;
