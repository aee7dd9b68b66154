pub mod bands;
pub mod chart;
pub mod errors;
pub mod logging;
