//! Newsletter platform backend.
//!
//! Hexagonal layout: `domain` holds the entities, policy table, and
//! services behind ports; `inbound` and `outbound` hold the Actix,
//! Diesel, and Redis adapters; `server` wires them together.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;
