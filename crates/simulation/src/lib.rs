//! Simulation du canal de synthèse et de séquençage des oligos

pub mod channel;
pub mod error_model;
pub mod metrics;

pub use channel::OligoChannel;
pub use error_model::{ErrorModel, ErrorType};
pub use metrics::{RecoveryMetrics, SimulationMetrics};
