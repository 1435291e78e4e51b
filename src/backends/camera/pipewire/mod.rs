// SPDX-License-Identifier: MPL-2.0

//! PipeWire camera backend
//!
//! Cameras are enumerated through `pw-cli` and streamed with GStreamer's
//! `pipewiresrc`, so libcamera and V4L2 devices are handled the same way.

mod enumeration;
mod session;

pub use enumeration::{
    NodeEntry, NodeProperties, enumerate_pipewire_cameras, fallback_formats, get_pipewire_formats,
    is_pipewire_available, parse_enum_formats, parse_node_info, parse_node_list,
};
pub use session::{PipeWireSession, build_pipeline_string};

use super::types::*;
use super::{CameraBackend, CaptureSession};
use std::sync::Arc;
use tracing::{debug, info};

/// PipeWire backend implementation
pub struct PipeWireBackend {
    /// Facing reported for cameras without a libcamera location
    unlabeled_facing: DeviceFacing,
}

impl PipeWireBackend {
    /// Create a new PipeWire backend
    pub fn new(unlabeled_facing: DeviceFacing) -> Self {
        Self { unlabeled_facing }
    }

    fn label(&self, mut device: CameraDevice) -> CameraDevice {
        if device.facing == DeviceFacing::Unspecified {
            device.facing = self.unlabeled_facing;
        }
        device
    }
}

impl Default for PipeWireBackend {
    fn default() -> Self {
        Self::new(DeviceFacing::Front)
    }
}

impl CameraBackend for PipeWireBackend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        info!("Using PipeWire backend for camera enumeration");

        match enumerate_pipewire_cameras() {
            Some(cameras) => cameras.into_iter().map(|d| self.label(d)).collect(),
            None => {
                info!("No PipeWire cameras available");
                Vec::new()
            }
        }
    }

    fn get_formats(&self, device: &CameraDevice) -> Vec<CameraFormat> {
        debug!(device = %device.name, "Getting formats via PipeWire backend");
        get_pipewire_formats(device)
    }

    fn create_session(&self) -> Arc<dyn CaptureSession> {
        Arc::new(PipeWireSession::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unlabeled() -> CameraDevice {
        CameraDevice {
            name: "USB Webcam".to_string(),
            path: "pipewire-serial-1".to_string(),
            metadata_path: Some("42".to_string()),
            facing: DeviceFacing::Unspecified,
            kind: DeviceKind::WideAngle,
            rotation: SensorRotation::None,
        }
    }

    #[test]
    fn test_unlabeled_cameras_get_configured_facing() {
        let backend = PipeWireBackend::new(DeviceFacing::Back);
        assert_eq!(backend.label(unlabeled()).facing, DeviceFacing::Back);

        let backend = PipeWireBackend::new(DeviceFacing::Unspecified);
        assert_eq!(backend.label(unlabeled()).facing, DeviceFacing::Unspecified);
    }

    #[test]
    fn test_labeled_cameras_keep_facing() {
        let backend = PipeWireBackend::default();
        let mut device = unlabeled();
        device.facing = DeviceFacing::Back;
        assert_eq!(backend.label(device).facing, DeviceFacing::Back);
    }
}
