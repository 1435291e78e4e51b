// SPDX-License-Identifier: MPL-2.0

//! GStreamer capture session reading one PipeWire camera node

use super::super::CaptureSession;
use super::super::types::*;
use crate::constants::{pipeline, timing};
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Pipeline elements kept alive while a session streams
struct ActivePipeline {
    pipeline: gstreamer::Pipeline,
    appsink: AppSink,
}

impl ActivePipeline {
    fn shutdown(self) {
        // Drop callback references before releasing the device
        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());

        if let Err(e) = self.pipeline.set_state(gstreamer::State::Null) {
            warn!(error = %e, "Failed to set pipeline to NULL");
            return;
        }
        let (result, state, _) = self.pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::STOP_TIMEOUT_SECS,
        ));
        debug!(?result, ?state, "Pipeline stopped");
    }
}

#[derive(Default)]
struct SessionState {
    input: Option<DeviceInput>,
    outputs: Vec<OutputId>,
    active: Option<ActivePipeline>,
}

/// Capture session backed by a `pipewiresrc ! … ! appsink` pipeline
pub struct PipeWireSession {
    state: Mutex<SessionState>,
    frames: FramePublisher,
}

impl PipeWireSession {
    pub fn new() -> Self {
        let (frames, _) = tokio::sync::watch::channel(None);
        Self {
            state: Mutex::new(SessionState::default()),
            frames,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn launch(&self, input: &DeviceInput) -> BackendResult<ActivePipeline> {
        gstreamer::init().map_err(|e| BackendError::InitializationFailed(e.to_string()))?;
        gstreamer::ElementFactory::find("pipewiresrc")
            .ok_or_else(|| BackendError::NotAvailable("pipewiresrc not found".to_string()))?;

        let description = build_pipeline_string(input);
        info!(
            device = %input.device.name,
            format = %input.format,
            pipeline = %description,
            "Launching capture pipeline"
        );

        let pipeline = gstreamer::parse::launch(&description)
            .map_err(|e| BackendError::InitializationFailed(e.to_string()))?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(|_| {
                BackendError::InitializationFailed("Failed to cast to pipeline".to_string())
            })?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| BackendError::InitializationFailed("Failed to get appsink".to_string()))?
            .dynamic_cast::<AppSink>()
            .map_err(|_| {
                BackendError::InitializationFailed("Failed to cast appsink".to_string())
            })?;

        appsink.set_property("emit-signals", true);
        appsink.set_property("sync", false);
        appsink.set_property("max-buffers", pipeline::MAX_BUFFERS);
        appsink.set_property("drop", true);
        appsink.set_property("enable-last-sample", false);
        appsink.set_callbacks(frame_callbacks(
            self.frames.clone(),
            input.device.name.clone(),
        ));

        pipeline.set_state(gstreamer::State::Playing).map_err(|e| {
            BackendError::InitializationFailed(format!("Failed to start pipeline: {}", e))
        })?;

        let (result, state, pending) = pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::START_TIMEOUT_SECS,
        ));
        debug!(?result, ?state, ?pending, "Pipeline state after start");

        let reached_playing = result.is_ok() && state == gstreamer::State::Playing;
        let still_starting = matches!(result, Ok(gstreamer::StateChangeSuccess::Async))
            && pending == gstreamer::State::Playing;
        if !reached_playing && !still_starting {
            let message = bus_error(&pipeline)
                .unwrap_or_else(|| format!("pipeline stuck in {:?} ({:?})", state, result));
            let _ = pipeline.set_state(gstreamer::State::Null);
            return Err(BackendError::InitializationFailed(message));
        }

        Ok(ActivePipeline { pipeline, appsink })
    }
}

impl Default for PipeWireSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSession for PipeWireSession {
    fn can_add_input(&self, _input: &DeviceInput) -> bool {
        self.lock().input.is_none()
    }

    fn add_input(&self, input: DeviceInput) -> BackendResult<()> {
        let mut state = self.lock();
        if let Some(existing) = &state.input {
            return Err(BackendError::InputRejected(format!(
                "session already bound to {}",
                existing.device.name
            )));
        }
        debug!(device = %input.device.name, format = %input.format, "Input bound");
        state.input = Some(input);
        Ok(())
    }

    fn can_add_output(&self, output: OutputId) -> bool {
        !self.lock().outputs.contains(&output)
    }

    fn add_output(&self, output: OutputId) -> BackendResult<()> {
        let mut state = self.lock();
        if state.outputs.contains(&output) {
            return Err(BackendError::OutputRejected(format!(
                "{} is already attached",
                output
            )));
        }
        state.outputs.push(output);
        Ok(())
    }

    fn contains_output(&self, output: OutputId) -> bool {
        self.lock().outputs.contains(&output)
    }

    fn start_running(&self) -> BackendResult<()> {
        let input = {
            let state = self.lock();
            if state.active.is_some() {
                return Ok(());
            }
            state.input.clone().ok_or(BackendError::NoInput)?
        };

        // Launching blocks for up to the start timeout; keep the lock free meanwhile
        let active = self.launch(&input)?;

        let mut state = self.lock();
        if state.active.is_some() {
            drop(state);
            active.shutdown();
            return Ok(());
        }
        state.active = Some(active);
        info!(device = %input.device.name, "Capture session running");
        Ok(())
    }

    fn stop_running(&self) {
        let active = self.lock().active.take();
        if let Some(active) = active {
            active.shutdown();
            self.frames.send_replace(None);
            info!("Capture session stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.lock().active.is_some()
    }

    fn frames(&self) -> FrameWatch {
        self.frames.subscribe()
    }

    fn input(&self) -> Option<DeviceInput> {
        self.lock().input.clone()
    }
}

impl Drop for PipeWireSession {
    fn drop(&mut self) {
        let active = self
            .state
            .get_mut()
            .map(|state| state.active.take())
            .unwrap_or_else(|e| e.into_inner().active.take());
        if let Some(active) = active {
            debug!("Dropping running capture session");
            active.shutdown();
        }
    }
}

/// Build the `gst-launch` description for an input
///
/// Every format is converted to RGBA so preview and still capture share
/// one frame representation.
pub fn build_pipeline_string(input: &DeviceInput) -> String {
    let format = &input.format;
    let source = format!("pipewiresrc {}do-timestamp=true", target_property(&input.device.path));

    let mut caps = format!("width=(int){},height=(int){}", format.width, format.height);
    if let Some(fps) = format.framerate {
        caps.push_str(&format!(",framerate=(fraction){}", fps.as_gst_fraction()));
    }

    let decode = if format.is_mjpeg() {
        format!("image/jpeg,{} ! jpegparse ! jpegdec", caps)
    } else {
        let gst_format = match format.pixel_format.as_str() {
            "YUYV" => "YUY2",
            "GREY" | "Y8" => "GRAY8",
            other => other,
        };
        format!("video/x-raw,format={},{}", gst_format, caps)
    };

    let rotate = input
        .device
        .rotation
        .videoflip_method()
        .map(|method| format!("videoflip method={} ! ", method))
        .unwrap_or_default();

    format!(
        "{} ! {} ! queue max-size-buffers={} leaky=downstream ! {}videoconvert ! video/x-raw,format=RGBA ! appsink name=sink",
        source,
        decode,
        pipeline::MAX_BUFFERS,
        rotate
    )
}

/// `pipewiresrc` property selecting the node for a capture path
fn target_property(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else if let Some(serial) = path.strip_prefix("pipewire-serial-") {
        format!("target-object={} ", serial)
    } else if let Some(node_id) = path.strip_prefix("pipewire-") {
        format!("target-object={} ", node_id)
    } else if path.starts_with("/dev/video") {
        format!("path=v4l2:{} ", path)
    } else {
        format!("path={} ", path)
    }
}

fn bus_error(pipeline: &gstreamer::Pipeline) -> Option<String> {
    let bus = pipeline.bus()?;
    while let Some(msg) = bus.pop() {
        if let gstreamer::MessageView::Error(err) = msg.view() {
            error!(error = %err.error(), debug = ?err.debug(), "Pipeline error");
            return Some(err.error().to_string());
        }
    }
    None
}

/// Appsink callbacks publishing each RGBA frame into the session's watch channel
fn frame_callbacks(frames: FramePublisher, device: String) -> gstreamer_app::AppSinkCallbacks {
    let frame_counter = AtomicU64::new(0);

    gstreamer_app::AppSinkCallbacks::builder()
        .new_sample(move |appsink| {
            let frame_start = Instant::now();
            let frame_num = frame_counter.fetch_add(1, Ordering::Relaxed);
            let log_this = frame_num % timing::FRAME_LOG_INTERVAL == 0;

            let sample = appsink.pull_sample().map_err(|_| gstreamer::FlowError::Eos)?;
            let buffer = sample.buffer().ok_or(gstreamer::FlowError::Error)?;

            if buffer.flags().contains(gstreamer::BufferFlags::CORRUPTED) {
                if log_this {
                    warn!(frame = frame_num, %device, "Buffer marked as corrupted, skipping frame");
                }
                return Ok(gstreamer::FlowSuccess::Ok);
            }

            let caps = sample.caps().ok_or(gstreamer::FlowError::Error)?;
            let video_info = VideoInfo::from_caps(caps).map_err(|e| {
                if log_this {
                    error!(frame = frame_num, error = ?e, "Failed to get video info");
                }
                gstreamer::FlowError::Error
            })?;
            let map = buffer.map_readable().map_err(|_| gstreamer::FlowError::Error)?;

            let frame = CameraFrame {
                width: video_info.width(),
                height: video_info.height(),
                data: Arc::from(map.as_slice()),
                stride: video_info.stride()[0] as u32,
                captured_at: frame_start,
            };

            if log_this {
                debug!(
                    frame = frame_num,
                    %device,
                    width = frame.width,
                    height = frame.height,
                    copy_us = frame_start.elapsed().as_micros(),
                    "Frame received"
                );
            }

            // No receivers is fine: the sender keeps the latest value
            frames.send_replace(Some(Arc::new(frame)));
            Ok(gstreamer::FlowSuccess::Ok)
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(path: &str, pixel: &str, fps: Option<u32>, rotation: SensorRotation) -> DeviceInput {
        DeviceInput {
            device: CameraDevice {
                name: "cam".to_string(),
                path: path.to_string(),
                metadata_path: None,
                facing: DeviceFacing::Front,
                kind: DeviceKind::WideAngle,
                rotation,
            },
            format: CameraFormat {
                width: 1280,
                height: 720,
                framerate: fps.map(Framerate::from_int),
                pixel_format: pixel.to_string(),
            },
        }
    }

    #[test]
    fn test_mjpeg_pipeline() {
        let desc = build_pipeline_string(&input(
            "pipewire-serial-2146",
            "MJPG",
            Some(30),
            SensorRotation::None,
        ));
        assert!(desc.starts_with("pipewiresrc target-object=2146 do-timestamp=true"));
        assert!(
            desc.contains("image/jpeg,width=(int)1280,height=(int)720,framerate=(fraction)30/1")
        );
        assert!(desc.contains("jpegdec"));
        assert!(!desc.contains("videoflip"));
        assert!(desc.ends_with("video/x-raw,format=RGBA ! appsink name=sink"));
    }

    #[test]
    fn test_raw_pipeline_with_rotation() {
        let desc = build_pipeline_string(&input(
            "pipewire-64",
            "YUYV",
            None,
            SensorRotation::Rotate90,
        ));
        assert!(desc.contains("target-object=64"));
        assert!(desc.contains("video/x-raw,format=YUY2,width=(int)1280,height=(int)720 !"));
        assert!(desc.contains("videoflip method=clockwise ! videoconvert"));
    }

    #[test]
    fn test_target_property() {
        assert_eq!(target_property(""), "");
        assert_eq!(target_property("/dev/video0"), "path=v4l2:/dev/video0 ");
    }

    #[test]
    fn test_session_attachment_rules() {
        let session = PipeWireSession::new();
        let cam = input("pipewire-1", "MJPG", Some(30), SensorRotation::None);

        assert!(session.can_add_input(&cam));
        session.add_input(cam.clone()).unwrap();
        assert!(!session.can_add_input(&cam));
        assert!(matches!(session.add_input(cam), Err(BackendError::InputRejected(_))));

        let output = OutputId::next();
        assert!(session.can_add_output(output));
        session.add_output(output).unwrap();
        assert!(session.contains_output(output));
        assert!(!session.can_add_output(output));
        assert!(matches!(session.add_output(output), Err(BackendError::OutputRejected(_))));
        assert!(!session.is_running());
    }

    #[test]
    fn test_start_without_input_fails() {
        let session = PipeWireSession::new();
        assert_eq!(session.start_running(), Err(BackendError::NoInput));
        assert!(!session.is_running());
    }
}
