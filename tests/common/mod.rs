// SPDX-License-Identifier: GPL-3.0-only

//! In-memory camera backend and photo library for integration tests

#![allow(dead_code)]

use dual_camera::backends::camera::{
    BackendError, BackendResult, CameraBackend, CameraDevice, CameraFormat, CameraFrame,
    CaptureSession, DeviceFacing, DeviceInput, DeviceKind, FramePublisher, FrameWatch, Framerate,
    OutputId, SensorRotation,
};
use dual_camera::errors::StorageError;
use dual_camera::storage::{CreationRequest, MediaLibrary, SavedAsset};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub fn device(name: &str, facing: DeviceFacing, kind: DeviceKind) -> CameraDevice {
    CameraDevice {
        name: name.to_string(),
        path: format!("mock-{}", name),
        metadata_path: None,
        facing,
        kind,
        rotation: SensorRotation::None,
    }
}

pub fn front_camera() -> CameraDevice {
    device("front", DeviceFacing::Front, DeviceKind::WideAngle)
}

pub fn back_camera() -> CameraDevice {
    device("back", DeviceFacing::Back, DeviceKind::WideAngle)
}

/// Solid-color RGBA frame
pub fn solid_frame(width: u32, height: u32, rgba: [u8; 4]) -> CameraFrame {
    let data: Vec<u8> = rgba
        .iter()
        .copied()
        .cycle()
        .take((width * height * 4) as usize)
        .collect();
    CameraFrame {
        width,
        height,
        data: Arc::from(data),
        stride: width * 4,
        captured_at: Instant::now(),
    }
}

/// Failure injection shared by a backend and the sessions it creates
#[derive(Debug, Default)]
pub struct MockFaults {
    /// Device paths whose input cannot be opened
    pub open_fails: HashSet<String>,
    /// Device paths a session refuses to bind
    pub input_rejected: HashSet<String>,
    /// Device paths whose session fails to start
    pub start_fails: HashSet<String>,
    /// Sessions refuse every output
    pub outputs_rejected: bool,
    /// Sessions start without ever producing a frame
    pub no_frames: bool,
    /// Time each start blocks before the session runs
    pub start_delay: Option<Duration>,
}

/// Capture session driven entirely in memory
pub struct MockSession {
    faults: Arc<MockFaults>,
    input: Mutex<Option<DeviceInput>>,
    outputs: Mutex<Vec<OutputId>>,
    running: AtomicBool,
    frames: FramePublisher,
    pub add_output_calls: AtomicUsize,
    pub start_calls: AtomicUsize,
}

impl MockSession {
    fn new(faults: Arc<MockFaults>) -> Self {
        let (frames, _) = tokio::sync::watch::channel(None);
        Self {
            faults,
            input: Mutex::new(None),
            outputs: Mutex::new(Vec::new()),
            running: AtomicBool::new(false),
            frames,
            add_output_calls: AtomicUsize::new(0),
            start_calls: AtomicUsize::new(0),
        }
    }

    /// Publish a frame as if the device delivered it
    pub fn push_frame(&self, frame: CameraFrame) {
        self.frames.send_replace(Some(Arc::new(frame)));
    }

    pub fn output_count(&self) -> usize {
        self.outputs.lock().unwrap().len()
    }

    pub fn device_path(&self) -> Option<String> {
        self.input
            .lock()
            .unwrap()
            .as_ref()
            .map(|input| input.device.path.clone())
    }
}

impl CaptureSession for MockSession {
    fn can_add_input(&self, input: &DeviceInput) -> bool {
        self.input.lock().unwrap().is_none()
            && !self.faults.input_rejected.contains(&input.device.path)
    }

    fn add_input(&self, input: DeviceInput) -> BackendResult<()> {
        let mut slot = self.input.lock().unwrap();
        if slot.is_some() {
            return Err(BackendError::InputRejected("input already bound".into()));
        }
        *slot = Some(input);
        Ok(())
    }

    fn can_add_output(&self, output: OutputId) -> bool {
        !self.faults.outputs_rejected && !self.outputs.lock().unwrap().contains(&output)
    }

    fn add_output(&self, output: OutputId) -> BackendResult<()> {
        self.add_output_calls.fetch_add(1, Ordering::SeqCst);
        if !self.can_add_output(output) {
            return Err(BackendError::OutputRejected(output.to_string()));
        }
        self.outputs.lock().unwrap().push(output);
        Ok(())
    }

    fn contains_output(&self, output: OutputId) -> bool {
        self.outputs.lock().unwrap().contains(&output)
    }

    fn start_running(&self) -> BackendResult<()> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        let path = self.device_path().ok_or(BackendError::NoInput)?;
        if self.faults.start_fails.contains(&path) {
            return Err(BackendError::InitializationFailed(format!("{} busy", path)));
        }
        if let Some(delay) = self.faults.start_delay {
            std::thread::sleep(delay);
        }
        self.running.store(true, Ordering::SeqCst);
        if !self.faults.no_frames {
            self.push_frame(solid_frame(8, 4, [200, 10, 10, 255]));
        }
        Ok(())
    }

    fn stop_running(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.frames.send_replace(None);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn frames(&self) -> FrameWatch {
        self.frames.subscribe()
    }

    fn input(&self) -> Option<DeviceInput> {
        self.input.lock().unwrap().clone()
    }
}

/// Backend returning a fixed device list
pub struct MockBackend {
    devices: Vec<CameraDevice>,
    faults: Arc<MockFaults>,
    sessions: Mutex<Vec<Arc<MockSession>>>,
}

impl MockBackend {
    pub fn new(devices: Vec<CameraDevice>) -> Self {
        Self::with_faults(devices, MockFaults::default())
    }

    pub fn with_faults(devices: Vec<CameraDevice>, faults: MockFaults) -> Self {
        Self {
            devices,
            faults: Arc::new(faults),
            sessions: Mutex::new(Vec::new()),
        }
    }

    /// Every session created so far, in creation order
    pub fn sessions(&self) -> Vec<Arc<MockSession>> {
        self.sessions.lock().unwrap().clone()
    }

    /// The session bound to a device
    pub fn session_for(&self, device: &CameraDevice) -> Option<Arc<MockSession>> {
        self.sessions()
            .into_iter()
            .find(|session| session.device_path().as_deref() == Some(device.path.as_str()))
    }
}

impl CameraBackend for MockBackend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        self.devices.clone()
    }

    fn get_formats(&self, device: &CameraDevice) -> Vec<CameraFormat> {
        if self.faults.open_fails.contains(&device.path) {
            return Vec::new();
        }
        vec![CameraFormat {
            width: 640,
            height: 480,
            framerate: Some(Framerate::from_int(30)),
            pixel_format: "MJPG".to_string(),
        }]
    }

    fn create_session(&self) -> Arc<dyn CaptureSession> {
        let session = Arc::new(MockSession::new(Arc::clone(&self.faults)));
        self.sessions.lock().unwrap().push(Arc::clone(&session));
        session
    }
}

/// Library that keeps requests in memory
#[derive(Default)]
pub struct RecordingLibrary {
    requests: Mutex<Vec<CreationRequest>>,
}

impl RecordingLibrary {
    pub fn requests(&self) -> Vec<CreationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl MediaLibrary for RecordingLibrary {
    fn perform_changes(
        &self,
        request: CreationRequest,
    ) -> BoxFuture<'static, Result<SavedAsset, StorageError>> {
        let mut requests = self.requests.lock().unwrap();
        let asset = SavedAsset {
            path: format!("memory/{}", requests.len()).into(),
            size: request.data.len(),
        };
        requests.push(request);
        async move { Ok(asset) }.boxed()
    }
}
