// SPDX-License-Identifier: MPL-2.0

//! Capture pipelines
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │ Camera device│ ──▶ │ Capture session  │ ──▶ │  Photo output    │
//! │ (front/back) │     │ (GStreamer)      │     │  (JPEG/PNG)      │
//! └──────────────┘     └──────────────────┘     └──────────────────┘
//! ```
//!
//! - [`session_manager`]: builds and starts the front and back pipelines
//! - [`photo`]: photo outputs, encoding and the capture controller

pub mod photo;
pub mod session_manager;

pub use session_manager::{
    Pipeline, Pipelines, StartHandle, StartPolicy, setup_pipelines, start_pipelines,
    stop_pipelines,
};
