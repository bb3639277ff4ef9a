//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`FeteError`] covers the failure modes that can reach a caller:
//! - GPU and surface initialization failures
//! - Photo fetching and decoding errors
//! - Font discovery for caption textures
//! - Configuration parsing
//!
//! Most of these are recoverable. The party scene treats a failed photo or a
//! missing font as "leave that part blank" and only logs the error; only GPU
//! initialization failures stop the application.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, FeteError>`.
//!
//! ```rust,ignore
//! use fete::errors::Result;
//!
//! fn load() -> Result<()> {
//!     let config = fete::PartyConfig::load("party.json")?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum FeteError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create a presentation surface for the window or canvas.
    #[error("Failed to create surface: {0}")]
    SurfaceCreateFailed(#[from] wgpu::CreateSurfaceError),

    /// The adapter cannot present to the created surface.
    #[error("Surface is not supported by the selected adapter")]
    SurfaceUnsupported,

    /// Event loop error (winit).
    #[cfg(feature = "winit")]
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    // ========================================================================
    // I/O & Network Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Transport-level HTTP failure (DNS, connection, CORS).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// HTTP response error with status code.
    #[error("HTTP response error: status {status} for {url}")]
    HttpResponseError {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    // ========================================================================
    // Image & Text Errors
    // ========================================================================
    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecodeError(String),

    /// No usable font face was found for caption rendering.
    #[error("Font unavailable: {0}")]
    FontUnavailable(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Semantically invalid configuration value.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// A background photo task panicked or was cancelled.
    #[error("Task join error: {0}")]
    TaskJoinError(String),

    // ========================================================================
    // Platform-Specific Errors
    // ========================================================================
    /// WASM-specific error.
    #[cfg(target_arch = "wasm32")]
    #[error("WASM error: {0}")]
    WasmError(String),
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for FeteError {
    fn from(err: image::ImageError) -> Self {
        FeteError::ImageDecodeError(err.to_string())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<tokio::task::JoinError> for FeteError {
    fn from(err: tokio::task::JoinError) -> Self {
        FeteError::TaskJoinError(err.to_string())
    }
}

/// Alias for `Result<T, FeteError>`.
pub type Result<T> = std::result::Result<T, FeteError>;
