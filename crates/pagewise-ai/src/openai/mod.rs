//! OpenAI-compatible chat-completions client.
//!
//! Implements the `AiClient` trait against `POST {base_url}/chat/completions`
//! with bearer-token auth. Any endpoint speaking the same wire format
//! (self-hosted gateways, local model servers) works by changing the base
//! URL.

mod api;
mod client;
mod config;

pub use client::{client_factory, OpenAiClient};
pub use config::OpenAiConfig;
