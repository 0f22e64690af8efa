pub mod store;
pub mod mongo_store;
pub mod memory_store;
pub mod db_init;

pub mod options_code;
pub mod market_hours;
pub mod cancel_registry;
pub mod alert_lifecycle;
pub mod server_channels;
