//! Market data aggregate containing entities, indicators and value objects.

pub mod entities;
pub mod indicators;
pub mod value_objects;

pub use entities::*;
pub use indicators::*;
pub use value_objects::*;
