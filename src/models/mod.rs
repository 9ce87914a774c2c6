//! Domain models for Courtside.
//!
//! # Core Concepts
//!
//! - [`Domain`]: The two knowledge corpora the assistant can answer from —
//!   the official rulebook and the collective bargaining agreement. A closed
//!   enum, so every per-domain table is a compile-time-checked exhaustive match.
//! - [`RetrievedReference`]: A raw passage returned by the remote
//!   retrieve-and-generate call, before any display processing.
//! - [`AnnotatedCitation`]: A reference after normalization — deduplicated,
//!   carrying a location badge and a source category derived from its locator.
//! - [`Conversation`]: The session context owned by the interaction loop:
//!   active domain, remote session id, and the ordered turn list. Created at
//!   conversation start, reset on clear or domain switch.

mod citation;
mod conversation;
mod domain;

pub use citation::*;
pub use conversation::*;
pub use domain::*;
