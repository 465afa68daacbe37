//! # Aerial Common Library
//!
//! Shared code for all Aerial microservices including:
//! - Error types
//! - Bootstrap configuration loading
//! - Database initialization and schema migrations
//! - Song identity hashing
//! - Timestamp utilities

pub mod config;
pub mod db;
pub mod error;
pub mod song_id;
pub mod time;

pub use error::{Error, Result};
