// SPDX-License-Identifier: MPL-2.0

//! Async photo capture pipeline
//!
//! ```text
//! CaptureController ─▶ PhotoOutput ─▶ latest session frame ─▶ PhotoEncoder
//!        │                                                        │
//!        └──────────── CaptureCompletion { position, outcome } ◀──┘
//! ```
//!
//! Preview keeps streaming while a capture is encoded on the blocking pool.

pub mod controller;
pub mod encoding;
pub mod output;

pub use controller::{CaptureCompletion, CaptureController, CaptureTicket};
pub use encoding::{EncodedImage, EncodingFormat, EncodingQuality, PhotoEncoder};
pub use output::{CapturedImage, PhotoOutput, PhotoOutputs, PhotoSettings};
