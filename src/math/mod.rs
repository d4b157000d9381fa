// src/math/mod.rs

pub mod error;
pub mod stencil;
pub mod tridiagonal;

pub use error::{InstabilityStage, SimError};
pub use stencil::{centered_gradient, laplacian, laplacian_into, BoundaryPolicy};
pub use tridiagonal::TridiagonalOperator;
