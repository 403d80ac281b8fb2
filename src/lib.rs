pub mod app;
pub mod config;
pub mod core;
pub mod game;
pub mod sim;
pub mod state;
pub mod utils;
