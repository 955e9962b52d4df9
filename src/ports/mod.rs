//! Port traits: the collaborators the domain consumes.

pub mod account_port;
pub mod clock_port;
pub mod config_port;
pub mod market_data_port;
pub mod notification_port;
