//! Common test utilities for loader integration tests

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;
