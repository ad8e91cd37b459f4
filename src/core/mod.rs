// src/core/mod.rs

pub mod dates;
pub mod literal;
pub mod net;
pub mod sanitize;
