//! Port traits at the boundary of the core pipeline.

pub mod config_port;
pub mod data_port;
