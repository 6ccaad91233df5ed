//! A chat facade over a generative-language model.
//!
//! Build a [`ChatClient`] once with the provider you want to talk to, then
//! open a [`ChatSession`] per conversation and stream replies from it, or
//! ask for a one-shot analysis with [`ChatClient::analyze_text`].

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod client;
mod config;
pub mod conversation;
pub mod credentials;
mod error;
mod model_client;
pub mod observer;
mod session;

pub use client::{ChatClient, ChatClientBuilder, DEFAULT_ANALYSIS_MODEL};
pub use config::AgentConfig;
pub use error::{Error, Operation, ProviderError};
pub use gemini_chat_model::{
    ApiKey, ErrorKind, GroundingChunk, GroundingSource, ModelFinishReason,
    StreamChunk,
};
pub use observer::{ClientEvent, Observer};
pub use session::{ChatSession, MessageStream};
