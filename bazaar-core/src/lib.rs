pub mod app_config;
pub mod gateway;
pub mod identity;

/// Amounts are carried as integer minor units (cents) end to end.
pub type Cents = i64;
