pub mod config;
pub mod core;
pub mod favorites;
pub mod osx;
pub mod style;
pub mod types;
pub mod ui;
