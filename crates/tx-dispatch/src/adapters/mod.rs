//! # Adapters
//!
//! In-memory implementations of the outbound ports.

pub mod recording;
pub mod social_api;
pub mod wallet;

pub use recording::{ManualTimeSource, RecordingNavigator};
pub use social_api::InMemorySocialApi;
pub use wallet::InMemoryWallet;
