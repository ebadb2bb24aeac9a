//! Simulated single-cylinder engine: geometry, valves, charge, combustion and cycle bookkeeping
pub mod combustion;
pub mod cycle_log;
pub mod engine;
pub mod gas;
pub mod geometry;
pub mod json_reader;
pub mod piston;
pub mod valve;
