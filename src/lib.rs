// src/lib.rs

//! reelscout library
//!
//! Fan-out movie-site search scraper with hub-based domain discovery.

pub mod cache;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod services;
pub mod utils;
