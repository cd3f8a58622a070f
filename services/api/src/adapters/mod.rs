//! services/api/src/adapters/mod.rs
//!
//! Concrete implementations of the `core` crate's ports.

pub mod analysis_llm;
pub mod memory;
pub mod store;
pub mod tts;
pub mod tutor_llm;
