//! HTTP service over a shared connector

pub mod api;
