//! Shared test utilities for kyoqa integration tests.
//!
//! - `builders`: in-process PDF and workbook fixtures
//! - `harness`: isolated directories plus a pipeline wired to fake OCR

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::*;
