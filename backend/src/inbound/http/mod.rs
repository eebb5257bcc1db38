//! Actix HTTP adapter: route modules, extractors, and error mapping.

pub mod articles;
pub mod audit;
pub mod auth_routes;
pub mod domains;
pub mod error;
pub mod health;
pub mod identity;
pub mod state;
pub mod subscribers;
pub mod users;
