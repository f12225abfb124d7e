pub mod app_config;
pub mod catalog;
pub mod editing_session;
pub mod record_table;
pub mod role_policy;
pub mod view_gate;

#[cfg(any(feature = "telemetry", test))]
pub mod telemetry;
