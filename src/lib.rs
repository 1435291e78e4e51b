// SPDX-License-Identifier: MPL-2.0

//! Dual Camera - front and back camera previews side by side for the COSMIC desktop
//!
//! One button captures a still from both cameras at once and saves both
//! photos to the photo library.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Main application logic and UI
//! - [`backends`]: Camera backend abstraction (PipeWire)
//! - [`pipelines`]: Session construction and photo capture
//! - [`view_model`]: Observable camera state shared with the UI
//! - [`storage`]: Photo library writes
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```ignore
//! // This is a GUI application, typically run via:
//! // dual-camera
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod i18n;
pub mod pipelines;
pub mod storage;
pub mod view_model;

// Re-export commonly used types
pub use app::{AppModel, Message};
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use view_model::{CameraViewModel, SessionOptions};
