//! Gemini client
//!
//! Concrete [`GenerationBackend`] implementation over the Gemini
//! `generateContent` REST API: site analysis, launcher-icon generation,
//! and wrapper project synthesis.

pub mod client;
mod wire;

pub use client::GeminiClient;

pub use apkforge_common::GenerationBackend;
