// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::backends::camera::types::{CameraFrame, CameraPosition};
use crate::config::Config;
use crate::pipelines::Pipelines;
use crate::view_model::CameraViewModel;
use cosmic::cosmic_config;
use cosmic::widget::image::Handle;
use std::sync::Arc;

/// Latest preview image for one half of the screen
#[derive(Debug, Clone)]
pub struct PreviewImage {
    pub handle: Handle,
}

impl PreviewImage {
    /// Convert a session frame, optionally mirrored
    pub fn from_frame(frame: &CameraFrame, mirror: bool) -> Self {
        let pixels = if mirror {
            frame.mirrored_rgba()
        } else {
            frame.packed_rgba()
        };
        Self {
            handle: Handle::from_rgba(frame.width, frame.height, pixels),
        }
    }
}

/// Preview images for both halves; `None` keeps that half blank
#[derive(Debug, Clone, Default)]
pub struct PreviewImages {
    pub front: Option<PreviewImage>,
    pub back: Option<PreviewImage>,
}

impl PreviewImages {
    pub fn get(&self, position: CameraPosition) -> Option<&PreviewImage> {
        match position {
            CameraPosition::Front => self.front.as_ref(),
            CameraPosition::Back => self.back.as_ref(),
        }
    }

    fn slot_mut(&mut self, position: CameraPosition) -> &mut Option<PreviewImage> {
        match position {
            CameraPosition::Front => &mut self.front,
            CameraPosition::Back => &mut self.back,
        }
    }

    /// Blank every half whose pipeline is absent
    pub fn retain_present(&mut self, pipelines: &Pipelines) {
        for position in CameraPosition::ALL {
            if pipelines.get(position).is_none() {
                *self.slot_mut(position) = None;
            }
        }
    }

    /// Show a frame on its half; frames for an absent pipeline are dropped
    pub fn show_frame(
        &mut self,
        pipelines: &Pipelines,
        position: CameraPosition,
        frame: &CameraFrame,
        mirror: bool,
    ) -> bool {
        if pipelines.get(position).is_none() {
            return false;
        }
        *self.slot_mut(position) = Some(PreviewImage::from_frame(frame, mirror));
        true
    }
}

/// The application model stores app-specific state used to describe its interface and
/// drive its logic.
pub struct AppModel {
    /// Application state which is managed by the COSMIC runtime.
    pub core: cosmic::Core,
    /// Configuration data that persists between application runs.
    pub config: Config,
    /// Config handler for saving settings
    pub config_handler: Option<cosmic_config::Config>,
    /// Capture stack shared with subscriptions
    pub view_model: Arc<CameraViewModel>,
    /// Pipelines last published by the view model
    pub pipelines: Pipelines,
    /// Latest preview frame per side
    pub previews: PreviewImages,
    /// Whether capture button press animation is active
    pub is_capturing: bool,
}

impl Drop for AppModel {
    fn drop(&mut self) {
        self.view_model.shutdown();
    }
}

/// Messages emitted by the application and its widgets.
#[derive(Debug, Clone)]
pub enum Message {
    /// Configuration changed on disk
    UpdateConfig(Config),
    /// Session setup finished on the worker thread
    SessionsReady,
    /// The view model published new pipelines
    PipelinesChanged(Pipelines),
    /// New frame for one preview half
    PreviewFrame(CameraPosition, Arc<CameraFrame>),
    /// Take a photo on every pipeline
    Capture,
    /// Clear capture animation after brief delay
    ClearCaptureAnimation,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::pipewire::PipeWireSession;
    use crate::backends::camera::types::{CameraDevice, DeviceFacing, DeviceKind, SensorRotation};
    use crate::pipelines::Pipeline;
    use crate::pipelines::photo::PhotoOutputs;
    use std::time::Instant;

    fn frame() -> CameraFrame {
        CameraFrame {
            width: 2,
            height: 2,
            data: Arc::from(vec![255u8; 16]),
            stride: 8,
            captured_at: Instant::now(),
        }
    }

    fn front_only() -> Pipelines {
        let outputs = PhotoOutputs::new();
        Pipelines {
            front: Some(Pipeline {
                position: CameraPosition::Front,
                device: CameraDevice {
                    name: "front".to_string(),
                    path: "pipewire-1".to_string(),
                    metadata_path: None,
                    facing: DeviceFacing::Front,
                    kind: DeviceKind::WideAngle,
                    rotation: SensorRotation::None,
                },
                session: Arc::new(PipeWireSession::new()),
                output: outputs.get(CameraPosition::Front).clone(),
            }),
            back: None,
        }
    }

    #[test]
    fn test_frame_for_absent_side_is_dropped() {
        let pipelines = front_only();
        let mut previews = PreviewImages::default();

        assert!(!previews.show_frame(&pipelines, CameraPosition::Back, &frame(), false));
        assert!(previews.get(CameraPosition::Back).is_none());

        assert!(previews.show_frame(&pipelines, CameraPosition::Front, &frame(), true));
        assert!(previews.get(CameraPosition::Front).is_some());
    }

    #[test]
    fn test_absent_pipelines_blank_their_half() {
        let mut previews = PreviewImages::default();
        previews.show_frame(&front_only(), CameraPosition::Front, &frame(), false);

        previews.retain_present(&front_only());
        assert!(previews.get(CameraPosition::Front).is_some());

        previews.retain_present(&Pipelines::default());
        assert!(previews.get(CameraPosition::Front).is_none());
        assert!(previews.get(CameraPosition::Back).is_none());
    }
}
