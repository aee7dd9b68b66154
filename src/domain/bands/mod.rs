//! Band aggregate: raw liquidation bands, display entries and the services
//! turning one into the other.

pub mod entities;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use services::*;
pub use value_objects::*;
