//! # Flight-Status Oracle Test Suite
//!
//! Cross-crate scenarios wiring the simulated ledger, the identity
//! registry, the request listener and the response dispatcher together.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks (decode, dedup, status codes)
//! └── src/integration/  # End-to-end scenarios
//!     ├── fixtures.rs   # Shared setup
//!     ├── flows.rs      # Registration, dispatch, dedup, decoding
//!     └── runtime.rs    # Full runtime with the request driver
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p fs-tests
//! cargo test -p fs-tests integration::flows::
//! cargo bench -p fs-tests
//! ```

pub mod integration;
