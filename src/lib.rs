// src/lib.rs
pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod market;
pub mod models;
pub mod portfolio;
pub mod quotes;
pub mod storage;
pub mod worker;
