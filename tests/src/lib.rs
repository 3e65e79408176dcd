//! # Lyrics Bridge Test Suite
//!
//! Unified test crate for flows that span the bus, the bridge and the
//! runtime wiring.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support/          # Harness and the fake search worker
//! └── integration/      # End-to-end request/reply flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lyrics-tests
//! cargo test -p lyrics-tests integration::
//! ```

pub mod integration;
