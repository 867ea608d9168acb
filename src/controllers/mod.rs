pub mod analysis_controller;
pub mod user_controller;
