//! Text processing around the provider call

pub mod escape;
pub mod normalizer;
pub mod response;
