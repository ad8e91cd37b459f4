// src/features/mod.rs
//! Dataset assembly: parse → extract → encode → matrix.

pub mod assemble;
pub mod encode;
pub mod extract;
pub mod parse;

pub use assemble::{Assembled, Assembler, FeatureMatrix, assemble_numeric};
pub use encode::{FeatureSchema, OneHotEncoder};
