//! Library target for the `vodl` package.
//!
//! The primary deliverable of this package is the `vodl` CLI binary
//! (`src/main.rs`). This library exists so CI can run `cargo test -p vodl --doc`.

#[doc(hidden)]
pub use vodl_engine;
