//! # Bookstore Domain
//!
//! Domain types shared by the bookstore storefront client.
//!
//! This crate contains:
//! - The domain error type and Result definition
//! - Backend envelope shapes (success payloads, error bodies, token pairs)
//! - Configuration structures for the API client
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other bookstore crates
//! - No I/O; everything here is plain data

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
