//! Error type and the seam between the sweep and the torque sources
pub mod error;
pub mod traits;
