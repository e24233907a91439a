//! Types shared between the hookball server and its clients.

pub mod config;
pub mod protocol;
pub mod vec2;
