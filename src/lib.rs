pub mod cli;
pub mod config;
pub mod engine;
pub mod models;
pub mod storage;
pub mod stores;
pub mod utils;
