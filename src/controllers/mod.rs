pub mod home_controller;
pub mod alerts_controller;
pub mod guilds_controller;
