//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod log_notifier;
pub mod paper_account;
pub mod system_clock;
