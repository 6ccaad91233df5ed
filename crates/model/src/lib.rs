//! The contract between the chat facade and a generative-language backend.
//!
//! This crate describes what a request looks like, what a streamed
//! response produces, and which kinds of errors a backend may report.
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.
//!
//! The facade depends on these traits rather than on a concrete HTTP
//! client, so that the client can be constructed once at startup and
//! injected, and so that tests can substitute a scripted backend.

#![deny(missing_docs)]

mod credential;
mod error;
mod grounding;
mod provider;
mod request;
mod response;

pub use credential::*;
pub use error::*;
pub use grounding::*;
pub use provider::*;
pub use request::*;
pub use response::*;
