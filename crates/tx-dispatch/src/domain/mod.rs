//! # Domain Module
//!
//! Core types for tiered dispatch: accounts and actions, the dispatch state
//! machine, the signing nonce and the optimistic queue.

pub mod capabilities;
pub mod entities;
pub mod errors;
pub mod nonce;
pub mod queue;
pub mod value_objects;

pub use capabilities::check_capabilities;
pub use entities::*;
pub use errors::*;
pub use nonce::{NonceClaim, SigningNonceCounter};
pub use queue::OptimisticActionQueue;
pub use value_objects::*;
