//! Sequence features: alphabets and the validated sequence table

pub mod alphabet;
pub mod store;

pub use self::alphabet::*;
pub use self::store::*;
