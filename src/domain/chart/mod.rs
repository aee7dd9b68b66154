//! Chart aggregate: zoom/brush value objects and the zoom window controller.

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
