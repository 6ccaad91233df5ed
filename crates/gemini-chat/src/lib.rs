//! An out-of-the-box Gemini chat client.
//!
//! Call [`connect`] once at startup to get a [`ChatClient`] talking to the
//! Gemini API, then open sessions from it:
//!
//! ```no_run
//! use futures_util::StreamExt;
//! use gemini_chat::AgentConfig;
//!
//! # async fn run() -> Result<(), gemini_chat::Error> {
//! let client = gemini_chat::connect(Default::default())?;
//! let mut session = client.create_chat_session(&AgentConfig {
//!     model: "gemini-2.5-flash".to_owned(),
//!     system_instruction: "Answer briefly.".to_owned(),
//!     temperature: 0.7,
//!     use_search: true,
//! })?;
//! let mut stream = session.stream_message("When was Rust 1.0 released?")?;
//! while let Some(chunk) = stream.next().await {
//!     print!("{}", chunk?.text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The crate includes a terminal demo behind the `cli` feature.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod connect;

pub use connect::{BASE_URL_VAR, connect, connect_with};
pub use gemini_chat_core::{
    AgentConfig, ChatClient, ChatClientBuilder, ChatSession, ClientEvent,
    Error, ErrorKind, GroundingChunk, GroundingSource, MessageStream,
    ModelFinishReason, Observer, Operation, StreamChunk,
};

/// Re-exports of [`gemini_chat_core`] crate.
pub mod core {
    pub use gemini_chat_core::*;
}
