// src/lib.rs
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod messages;
pub mod models;
pub mod protocol;
pub mod users;
pub mod utils;
