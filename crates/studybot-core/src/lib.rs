//! Core domain + application logic for the study-group bot.
//!
//! This crate is framework-agnostic. The chat platform lives behind the
//! messaging port implemented in adapter crates.

pub mod audit;
pub mod bot;
pub mod commands;
pub mod config;
pub mod directory;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod registry;
pub mod service;

pub use errors::{Error, Result};
