//! services/api/src/lib.rs
//!
//! Library surface of the `api` service, shared by the `api` and
//! `openapi` binaries.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
