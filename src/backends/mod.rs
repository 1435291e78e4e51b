// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for camera capture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            App / View Model Layer            │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │   CameraBackend ──► CaptureSession (front)   │
//! │                 └─► CaptureSession (back)    │
//! │                    (PipeWire + GStreamer)    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`camera`]: Device enumeration, selection and capture sessions

pub mod camera;
