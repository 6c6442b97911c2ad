//! Gemini-backed business source.
//!
//! Sends one `generateContent` request per query tuple with the Google Maps
//! grounding tool enabled, and turns the returned grounding chunks into
//! [`mapcrawl_core::Record`]s.

pub mod client;
pub mod error;
pub mod parse;
pub mod prompt;
pub mod types;

pub use client::GeminiClient;
pub use error::GeminiError;
