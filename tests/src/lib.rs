//! # Vigil Test Suite
//!
//! Unified test crate exercising the crates together:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── lifecycle_flow.rs   # Polling engine + phases + vault funding
//!     └── stream_flow.rs      # Streaming transport driving the dispatcher
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p vigil-tests
//! cargo test -p vigil-tests integration::
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
