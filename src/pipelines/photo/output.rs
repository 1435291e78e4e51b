// SPDX-License-Identifier: GPL-3.0-only

//! Per-pipeline photo output sink

use super::encoding::{EncodingFormat, EncodingQuality, PhotoEncoder};
use crate::backends::camera::types::{CameraFrame, CameraPosition, OutputId};
use crate::backends::camera::CaptureSession;
use crate::constants::timing;
use crate::errors::PhotoError;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Settings applied to a single capture request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhotoSettings {
    pub format: EncodingFormat,
    pub quality: EncodingQuality,
}

/// Encoded still image produced by one capture request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub position: CameraPosition,
    pub data: Vec<u8>,
    pub format: EncodingFormat,
    pub width: u32,
    pub height: u32,
}

/// Reusable sink that turns capture requests into encoded images
///
/// One output exists per pipeline for the pipeline's whole lifetime. It
/// must be attached to its session before it can capture.
#[derive(Debug, Clone)]
pub struct PhotoOutput {
    id: OutputId,
    position: CameraPosition,
    frame_timeout: Duration,
}

impl PhotoOutput {
    pub fn new(position: CameraPosition) -> Self {
        Self {
            id: OutputId::next(),
            position,
            frame_timeout: timing::FRAME_TIMEOUT,
        }
    }

    /// Override how long a request waits for a first frame
    pub fn with_frame_timeout(mut self, timeout: Duration) -> Self {
        self.frame_timeout = timeout;
        self
    }

    pub fn id(&self) -> OutputId {
        self.id
    }

    pub fn position(&self) -> CameraPosition {
        self.position
    }

    /// Capture the session's latest frame and encode it
    ///
    /// Failures are returned as errors rather than raised synchronously by
    /// callers, so each request yields exactly one result.
    pub async fn capture_photo(
        &self,
        session: Arc<dyn CaptureSession>,
        settings: PhotoSettings,
    ) -> Result<CapturedImage, PhotoError> {
        if !session.contains_output(self.id) {
            return Err(PhotoError::OutputNotAttached);
        }
        if !session.is_running() {
            return Err(PhotoError::SessionNotRunning);
        }

        let frame = self.latest_frame(session.as_ref()).await?;
        debug!(
            position = %self.position,
            width = frame.width,
            height = frame.height,
            age_ms = frame.captured_at.elapsed().as_millis(),
            "Frame grabbed for capture"
        );

        let encoded = PhotoEncoder::new(settings.format, settings.quality)
            .encode(frame)
            .await?;

        Ok(CapturedImage {
            position: self.position,
            data: encoded.data,
            format: encoded.format,
            width: encoded.width,
            height: encoded.height,
        })
    }

    async fn latest_frame(
        &self,
        session: &dyn CaptureSession,
    ) -> Result<Arc<CameraFrame>, PhotoError> {
        let mut frames = session.frames();
        let waited = tokio::time::timeout(self.frame_timeout, async {
            frames
                .wait_for(Option::is_some)
                .await
                .ok()
                .and_then(|frame| (*frame).clone())
        })
        .await;

        match waited {
            Ok(Some(frame)) => Ok(frame),
            Ok(None) | Err(_) => Err(PhotoError::NoFrameAvailable),
        }
    }
}

/// The two photo outputs, created once before any device is known
#[derive(Debug, Clone)]
pub struct PhotoOutputs {
    pub front: PhotoOutput,
    pub back: PhotoOutput,
}

impl PhotoOutputs {
    pub fn new() -> Self {
        Self {
            front: PhotoOutput::new(CameraPosition::Front),
            back: PhotoOutput::new(CameraPosition::Back),
        }
    }

    pub fn get(&self, position: CameraPosition) -> &PhotoOutput {
        match position {
            CameraPosition::Front => &self.front,
            CameraPosition::Back => &self.back,
        }
    }
}

impl Default for PhotoOutputs {
    fn default() -> Self {
        Self::new()
    }
}
