// src/models/mod.rs

pub mod field;
pub mod force;
pub mod spectral;

pub use field::FieldState;
pub use force::{masked_log, ForceEvaluator, FIELD_FLOOR};
pub use spectral::{SpectralSeries, RIEMANN_ZERO_ORDINATES};
