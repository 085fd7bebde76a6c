//! signal-relay — trade-signal webhook relay.
//!
//! Receives chart alerts over HTTP, renders them into a fixed-rules prompt,
//! forwards the prompt to an OpenAI-compatible completion endpoint, and
//! relays the model's one-line decision back to the caller. Stateless:
//! nothing survives a request.

pub mod alert;
pub mod config;
pub mod error;
pub mod llm;
pub mod logger;
pub mod prompt;
pub mod server;
