// SPDX-License-Identifier: MPL-2.0

//! Error types for the dual camera application

use crate::backends::camera::BackendError;
use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Top-level error used by the command line front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Camera backend or session errors
    Backend(BackendError),
    /// Media library errors
    Storage(StorageError),
    /// No camera matched the device filter
    NoCameraFound,
}

/// Photo capture errors, delivered through capture completions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoError {
    /// The photo output is not attached to the session
    OutputNotAttached,
    /// The session is not streaming
    SessionNotRunning,
    /// No frame arrived before the frame timeout
    NoFrameAvailable,
    /// The capture task ended without reporting a result
    CaptureFailed(String),
    /// Encoding failed
    EncodingFailed(String),
}

/// Media library write errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No Pictures directory could be determined
    NoLibraryDirectory,
    /// The library refused the resource type or payload
    InvalidRequest(String),
    /// No unused file name was found
    NameExhausted(String),
    /// Filesystem error
    Io(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Backend(e) => write!(f, "Camera error: {}", e),
            AppError::Storage(e) => write!(f, "Storage error: {}", e),
            AppError::NoCameraFound => write!(f, "No front or back camera found"),
        }
    }
}

impl fmt::Display for PhotoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoError::OutputNotAttached => {
                write!(f, "Photo output is not attached to the session")
            }
            PhotoError::SessionNotRunning => write!(f, "Capture session is not running"),
            PhotoError::NoFrameAvailable => write!(f, "No frame available for capture"),
            PhotoError::CaptureFailed(msg) => write!(f, "Capture failed: {}", msg),
            PhotoError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NoLibraryDirectory => write!(f, "No photo library directory available"),
            StorageError::InvalidRequest(msg) => write!(f, "Invalid creation request: {}", msg),
            StorageError::NameExhausted(name) => write!(f, "No free file name for {}", name),
            StorageError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for PhotoError {}
impl std::error::Error for StorageError {}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        AppError::Backend(err)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.into())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<image::ImageError> for PhotoError {
    fn from(err: image::ImageError) -> Self {
        PhotoError::EncodingFailed(err.to_string())
    }
}

impl From<tokio::task::JoinError> for PhotoError {
    fn from(err: tokio::task::JoinError) -> Self {
        PhotoError::CaptureFailed(err.to_string())
    }
}
