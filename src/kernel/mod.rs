//! Kernel functions for SVM

pub mod matrix;
pub mod traits;
pub mod weighted_degree;

pub use self::matrix::*;
pub use self::traits::*;
pub use self::weighted_degree::*;
