//! Port traits at the I/O boundaries of the domain.

pub mod config_port;
pub mod data_port;
pub mod report_port;
