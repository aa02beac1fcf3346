//! Shared test utilities for bookstore-oauth.
//!
//! This crate provides:
//! - Proptest generators for tokens, ids and REST errors
//! - A recording mock access token resolver
//! - Fixtures: sample tokens, error bodies, requests and a mock OAuth server

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use generators::*;
