//! Core translation engine module

pub mod cache;
pub mod client;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod language;
pub mod messages;
pub mod models;
pub mod network;
