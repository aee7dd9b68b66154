pub mod chart_service;
pub mod sequence_memo;
pub mod settings;

pub use chart_service::*;
pub use sequence_memo::*;
pub use settings::*;
