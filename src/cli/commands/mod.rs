pub mod ai;
pub mod config;
