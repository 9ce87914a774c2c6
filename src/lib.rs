//! Courtside — a terminal chat assistant over two managed knowledge bases:
//! the official rulebook and the collective bargaining agreement.
//!
//! The remote service does all retrieval and generation. What lives here is
//! the thin layer around it: prompt construction ([`chat::prompts`]),
//! citation normalization and cross-domain detection ([`models`]), the
//! signed client with its typed errors ([`kb`]), conversation state and
//! transcript export, configuration, and a connectivity self-check
//! ([`doctor`]).

pub mod chat;
pub mod config;
pub mod doctor;
pub mod kb;
pub mod models;
