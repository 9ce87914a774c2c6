//! Client for the managed retrieve-and-generate service.
//!
//! All retrieval ranking, chunking, and text generation happen inside the
//! remote knowledge base; this module only shapes the request, signs it, and
//! lifts the response into [`crate::models::RetrievedReference`] values plus
//! a typed error so callers never have to inspect error strings.

pub mod client;
pub mod sign;
pub mod types;

pub use client::{KbAnswer, KbClient, KbError};
