//! Chess rules engine: FEN codec, attack detection, pseudo-legal move
//! generation and move execution with listener notifications.

pub mod config;
pub mod engine;
