//! VPSie API client and data models.
//!
//! Provides typed structures and an asynchronous client for managing VPSie
//! virtual private servers and reading the provider's catalog.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{VpsieApi, VpsieClient, VpsieClientBuilder};
pub use models::{
    ActionResponse, BackupRequest, BackupResponse, CreateVpsRequest, Datacenter, Image, Offer,
    PasswordResponse, RebuildResponse, ResizeRequest, SnapshotRequest, SnapshotResponse,
    StatisticsGraph, Vps,
};

/// Convenient result alias that reuses the shared VPSie error type.
pub type Result<T> = vpsie_core::Result<T>;
