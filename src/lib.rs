// src/lib.rs

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

pub mod config;
pub mod core;
pub mod error;

pub mod bill;
pub mod features;
pub mod model;
pub mod table;

pub mod collect;
pub mod file;
pub mod progress;
pub mod runner;
pub mod specs;
pub mod store;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{Error, Result};
