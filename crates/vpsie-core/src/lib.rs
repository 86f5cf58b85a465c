//! # vpsie-core
//!
//! Core types and utilities for working with the VPSie cloud API.
//!
//! This crate provides the error taxonomy, configuration, credential and
//! bearer-token handling, and wire helpers shared by the VPSie client.
//!
//! ## Modules
//!
//! - [`error`] - Error types and HTTP status code mapping
//! - [`auth`] - Client credentials and the cached bearer token
//! - [`client`] - HTTP client configuration
//! - [`config`] - Deserializable, validated client configuration
//! - [`envelope`] - The `{error, errorCode, ...}` response wrapper
//! - [`form`] - Presence-driven `x-www-form-urlencoded` body builder

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod form;

pub use error::{Error, Result};
