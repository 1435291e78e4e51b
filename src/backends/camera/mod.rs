// SPDX-License-Identifier: MPL-2.0

//! Camera backend abstraction
//!
//! The app talks to the platform camera stack through two traits:
//!
//! ```text
//! ┌─────────────────────┐
//! │   CameraViewModel   │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐      ┌─────────────────────┐
//! │  CameraBackend      │─────▶│  CaptureSession     │  ← one per pipeline
//! └──────────┬──────────┘      └──────────┬──────────┘
//!            │                            │
//!            ▼                            ▼
//!       ┌────────┐                 ┌──────────────┐
//!       │PipeWire│                 │GStreamer pipe│
//!       └────────┘                 └──────────────┘
//! ```

pub mod discovery;
pub mod pipewire;
pub mod types;

pub use discovery::{DiscoveredDevices, discover};
pub use types::*;

use crate::constants::formats;
use std::sync::Arc;

/// Camera backend trait
///
/// Provides device enumeration and creates capture sessions. Implementations
/// must be usable from any thread.
pub trait CameraBackend: Send + Sync {
    /// Enumerate available cameras on this backend
    fn enumerate_cameras(&self) -> Vec<CameraDevice>;

    /// Get supported formats for a specific camera device
    fn get_formats(&self, device: &CameraDevice) -> Vec<CameraFormat>;

    /// Open a device for capture, choosing the preview format
    fn open_input(&self, device: &CameraDevice) -> BackendResult<DeviceInput> {
        let available = self.get_formats(device);
        let format = select_capture_format(&available).ok_or_else(|| {
            BackendError::FormatNotSupported(format!("{} exposes no usable format", device.name))
        })?;
        Ok(DeviceInput {
            device: device.clone(),
            format,
        })
    }

    /// Create a new, empty capture session
    fn create_session(&self) -> Arc<dyn CaptureSession>;
}

/// A running/stopped capture context streaming one device to attached outputs
///
/// Sessions hold at most one input and attach each output at most once.
/// All methods take `&self`; implementations synchronize internally so a
/// session can be started on a worker thread while the UI reads frames.
pub trait CaptureSession: Send + Sync {
    /// Whether `add_input` would accept this input
    fn can_add_input(&self, input: &DeviceInput) -> bool;

    /// Bind a device as the session input
    fn add_input(&self, input: DeviceInput) -> BackendResult<()>;

    /// Whether `add_output` would accept this output
    ///
    /// False for an output that is already attached.
    fn can_add_output(&self, output: OutputId) -> bool;

    /// Attach a photo output
    fn add_output(&self, output: OutputId) -> BackendResult<()>;

    /// Whether the output is attached to this session
    fn contains_output(&self, output: OutputId) -> bool;

    /// Start streaming. Blocks until the device runs or fails to start.
    fn start_running(&self) -> BackendResult<()>;

    /// Stop streaming and release the device
    fn stop_running(&self);

    /// Whether frames are flowing
    fn is_running(&self) -> bool;

    /// Latest-frame channel for preview and still capture
    fn frames(&self) -> FrameWatch;

    /// The bound input, if any
    fn input(&self) -> Option<DeviceInput>;
}

/// Pick the preview format for a device
///
/// Largest area not wider than the preview limit, then highest framerate,
/// MJPEG preferred on ties. If every format is wider than the limit the
/// smallest one is used.
pub fn select_capture_format(available: &[CameraFormat]) -> Option<CameraFormat> {
    let rank = |f: &CameraFormat| {
        (
            u64::from(f.width) * u64::from(f.height),
            f.framerate.map(|fps| fps.as_int()).unwrap_or(0),
            f.is_mjpeg(),
        )
    };

    available
        .iter()
        .filter(|f| f.width <= formats::MAX_PREVIEW_WIDTH)
        .max_by_key(|f| rank(f))
        .or_else(|| {
            available
                .iter()
                .min_by_key(|f| u64::from(f.width) * u64::from(f.height))
        })
        .cloned()
}

/// Get the default camera backend
pub fn get_backend(unlabeled_facing: DeviceFacing) -> Arc<dyn CameraBackend> {
    Arc::new(pipewire::PipeWireBackend::new(unlabeled_facing))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(width: u32, height: u32, fps: Option<u32>, pixel: &str) -> CameraFormat {
        CameraFormat {
            width,
            height,
            framerate: fps.map(Framerate::from_int),
            pixel_format: pixel.to_string(),
        }
    }

    #[test]
    fn test_select_prefers_largest_within_limit() {
        let formats = vec![
            fmt(640, 480, Some(30), "YUY2"),
            fmt(1920, 1080, Some(30), "MJPG"),
            fmt(3840, 2160, Some(30), "MJPG"),
        ];
        let selected = select_capture_format(&formats).unwrap();
        assert_eq!((selected.width, selected.height), (1920, 1080));
    }

    #[test]
    fn test_select_prefers_framerate_then_mjpeg() {
        let formats = vec![
            fmt(1280, 720, Some(15), "MJPG"),
            fmt(1280, 720, Some(30), "YUY2"),
            fmt(1280, 720, Some(30), "MJPG"),
        ];
        let selected = select_capture_format(&formats).unwrap();
        assert_eq!(selected.framerate, Some(Framerate::from_int(30)));
        assert!(selected.is_mjpeg());
    }

    #[test]
    fn test_select_oversized_only() {
        let formats = vec![fmt(4056, 3040, None, "NV12"), fmt(3840, 2160, None, "NV12")];
        let selected = select_capture_format(&formats).unwrap();
        assert_eq!(selected.width, 3840);
    }

    #[test]
    fn test_select_empty() {
        assert!(select_capture_format(&[]).is_none());
    }
}
