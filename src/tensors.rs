//! Linear algebra over exact fields.

pub mod matrix;
