//! Browser-backed implementations of the domain's logging abstractions.

pub mod services;
