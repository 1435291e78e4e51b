// SPDX-License-Identifier: GPL-3.0-only

//! Capture session manager
//!
//! Builds the front and back pipelines (device + session + photo output)
//! once at startup and starts them on the blocking pool. Sessions are never
//! reconfigured afterwards.

use crate::backends::camera::{
    BackendResult, CameraBackend, CameraDevice, CameraPosition, CaptureSession, DiscoveredDevices,
};
use crate::pipelines::photo::{PhotoOutput, PhotoOutputs};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// One camera device bound to one session and one photo output
#[derive(Clone)]
pub struct Pipeline {
    pub position: CameraPosition,
    pub device: CameraDevice,
    pub session: Arc<dyn CaptureSession>,
    pub output: PhotoOutput,
}

impl Pipeline {
    /// Position and bound device path
    pub fn identity(&self) -> (CameraPosition, String) {
        (self.position, self.device.path.clone())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("position", &self.position)
            .field("device", &self.device.name)
            .field("running", &self.session.is_running())
            .field("output", &self.output.id())
            .finish()
    }
}

/// The (possibly absent) front and back pipelines
#[derive(Debug, Clone, Default)]
pub struct Pipelines {
    pub front: Option<Pipeline>,
    pub back: Option<Pipeline>,
}

impl Pipelines {
    pub fn get(&self, position: CameraPosition) -> Option<&Pipeline> {
        match position {
            CameraPosition::Front => self.front.as_ref(),
            CameraPosition::Back => self.back.as_ref(),
        }
    }

    /// Present pipelines, front first
    pub fn iter(&self) -> impl Iterator<Item = &Pipeline> {
        self.front.iter().chain(self.back.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.front.is_none() && self.back.is_none()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }
}

/// Which sessions are started after setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartPolicy {
    /// Start only the front session; the back one is built but idle
    #[default]
    FrontOnly,
    /// Start both sessions
    Both,
}

impl StartPolicy {
    pub fn from_start_back(start_back: bool) -> Self {
        if start_back {
            StartPolicy::Both
        } else {
            StartPolicy::FrontOnly
        }
    }

    pub fn starts(&self, position: CameraPosition) -> bool {
        match self {
            StartPolicy::FrontOnly => position == CameraPosition::Front,
            StartPolicy::Both => true,
        }
    }
}

/// A session start running on the blocking pool
pub struct StartHandle {
    pub position: CameraPosition,
    pub handle: JoinHandle<BackendResult<()>>,
}

/// Build a pipeline for every discovered device
///
/// A device whose input cannot be opened or bound leaves its pipeline
/// absent without affecting the other one. An output that cannot be attached
/// is only logged; the capture controller retries the attachment.
pub fn setup_pipelines(
    backend: &dyn CameraBackend,
    devices: &DiscoveredDevices,
    outputs: &PhotoOutputs,
) -> Pipelines {
    let build = |position: CameraPosition| -> Option<Pipeline> {
        let device = devices.get(position)?;
        setup_pipeline(backend, position, device, outputs.get(position))
    };

    let pipelines = Pipelines {
        front: build(CameraPosition::Front),
        back: build(CameraPosition::Back),
    };

    info!(
        front = pipelines.front.is_some(),
        back = pipelines.back.is_some(),
        "Pipelines constructed"
    );
    pipelines
}

fn setup_pipeline(
    backend: &dyn CameraBackend,
    position: CameraPosition,
    device: &CameraDevice,
    output: &PhotoOutput,
) -> Option<Pipeline> {
    let input = match backend.open_input(device) {
        Ok(input) => input,
        Err(e) => {
            warn!(%position, device = %device.name, error = %e, "Failed to open camera input");
            return None;
        }
    };

    let session = backend.create_session();
    if !session.can_add_input(&input) {
        warn!(%position, device = %device.name, "Session refused camera input");
        return None;
    }
    if let Err(e) = session.add_input(input) {
        warn!(%position, device = %device.name, error = %e, "Failed to bind camera input");
        return None;
    }

    if session.can_add_output(output.id()) {
        if let Err(e) = session.add_output(output.id()) {
            warn!(%position, error = %e, "Failed to attach photo output");
        }
    } else {
        warn!(%position, output = %output.id(), "Session refused photo output");
    }

    Some(Pipeline {
        position,
        device: device.clone(),
        session,
        output: output.clone(),
    })
}

/// Start sessions on the blocking pool without waiting for them
pub fn start_pipelines(
    runtime: &Handle,
    pipelines: &Pipelines,
    policy: StartPolicy,
) -> Vec<StartHandle> {
    pipelines
        .iter()
        .filter(|pipeline| policy.starts(pipeline.position))
        .map(|pipeline| {
            let position = pipeline.position;
            let session = Arc::clone(&pipeline.session);
            let device = pipeline.device.name.clone();
            let handle = runtime.spawn_blocking(move || {
                let result = session.start_running();
                match &result {
                    Ok(()) => info!(%position, %device, "Session started"),
                    Err(e) => error!(%position, %device, error = %e, "Failed to start session"),
                }
                result
            });
            StartHandle { position, handle }
        })
        .collect()
}

/// Stop every running session
pub fn stop_pipelines(pipelines: &Pipelines) {
    for pipeline in pipelines.iter() {
        if pipeline.session.is_running() {
            info!(position = %pipeline.position, "Stopping session");
            pipeline.session.stop_running();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_policy() {
        assert_eq!(StartPolicy::default(), StartPolicy::FrontOnly);
        assert!(StartPolicy::FrontOnly.starts(CameraPosition::Front));
        assert!(!StartPolicy::FrontOnly.starts(CameraPosition::Back));
        assert!(StartPolicy::from_start_back(true).starts(CameraPosition::Back));
    }

    #[test]
    fn test_empty_pipelines() {
        let pipelines = Pipelines::default();
        assert!(pipelines.is_empty());
        assert_eq!(pipelines.len(), 0);
        assert!(pipelines.get(CameraPosition::Front).is_none());
    }
}
