//! Library exports for the recipe book backend
//!
//! `main.rs` wires these together; tests drive them directly.

pub mod config;
pub mod database;
pub mod error;
pub mod handler;
pub mod model;
pub mod route;
pub mod seed;
pub mod store;
pub mod upload;
