//! Hookball server library.
//!
//! This module exposes the server components for use in tests and binaries.

pub mod arena;
pub mod config;
pub mod elimination;
pub mod engine;
pub mod game_loop;
pub mod hook;
pub mod physics;
pub mod publish;
pub mod state;
pub mod tick;
pub mod ws;
