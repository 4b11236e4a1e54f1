//! # Dispatch Test Suite
//!
//! Cross-module tests for tiered dispatch.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── scenarios.rs    # End-to-end flows through SocialActions
//!     └── concurrency.rs  # Parallel dispatches on a multi-threaded runtime
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p dispatch-tests
//! cargo test -p dispatch-tests integration::concurrency
//! ```

#![allow(unused_variables)]
#![allow(dead_code)]

pub mod integration;
