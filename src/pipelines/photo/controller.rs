// SPDX-License-Identifier: GPL-3.0-only

//! Photo capture controller
//!
//! Issues one capture request per present pipeline. Requests are
//! independent: each runs on its own task and reports back through the
//! completion handler tagged with the pipeline it came from.

use super::output::{CapturedImage, PhotoSettings};
use crate::backends::camera::CameraPosition;
use crate::errors::PhotoError;
use crate::pipelines::session_manager::{Pipeline, Pipelines};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of one capture request
#[derive(Debug, Clone)]
pub struct CaptureCompletion {
    pub request_id: Uuid,
    pub position: CameraPosition,
    pub outcome: Result<CapturedImage, PhotoError>,
}

/// Handle to an issued capture request
#[derive(Debug)]
pub struct CaptureTicket {
    pub request_id: Uuid,
    pub position: CameraPosition,
    pub handle: JoinHandle<()>,
}

/// Triggers simultaneous still captures on the present pipelines
#[derive(Debug, Clone)]
pub struct CaptureController {
    runtime: Handle,
    settings: PhotoSettings,
}

impl CaptureController {
    pub fn new(runtime: Handle, settings: PhotoSettings) -> Self {
        Self { runtime, settings }
    }

    pub fn settings(&self) -> PhotoSettings {
        self.settings
    }

    /// Issue one request per present pipeline and return immediately
    ///
    /// `on_complete` runs once per issued request on a runtime worker, in
    /// whatever order the requests finish.
    pub fn capture<F>(&self, pipelines: &Pipelines, on_complete: F) -> Vec<CaptureTicket>
    where
        F: Fn(CaptureCompletion) + Send + Sync + 'static,
    {
        let on_complete = Arc::new(on_complete);
        let tickets: Vec<CaptureTicket> = pipelines
            .iter()
            .filter(|pipeline| ensure_output_attached(pipeline))
            .map(|pipeline| self.issue(pipeline, Arc::clone(&on_complete)))
            .collect();

        info!(requests = tickets.len(), "Capture requested");
        tickets
    }

    fn issue<F>(&self, pipeline: &Pipeline, on_complete: Arc<F>) -> CaptureTicket
    where
        F: Fn(CaptureCompletion) + Send + Sync + 'static,
    {
        let request_id = Uuid::new_v4();
        let position = pipeline.position;
        let session = Arc::clone(&pipeline.session);
        let output = pipeline.output.clone();
        let settings = self.settings;

        debug!(%request_id, %position, "Issuing capture request");
        let handle = self.runtime.spawn(async move {
            let outcome = output.capture_photo(session, settings).await;
            on_complete(CaptureCompletion {
                request_id,
                position,
                outcome,
            });
        });

        CaptureTicket {
            request_id,
            position,
            handle,
        }
    }
}

/// Attach the pipeline's output unless it already is
///
/// Returns whether a capture request may be issued.
fn ensure_output_attached(pipeline: &Pipeline) -> bool {
    let id = pipeline.output.id();
    if pipeline.session.contains_output(id) {
        return true;
    }
    if !pipeline.session.can_add_output(id) {
        warn!(
            position = %pipeline.position,
            output = %id,
            "Photo output cannot be attached, skipping capture"
        );
        return false;
    }
    match pipeline.session.add_output(id) {
        Ok(()) => true,
        Err(e) => {
            warn!(
                position = %pipeline.position,
                error = %e,
                "Failed to attach photo output, skipping capture"
            );
            false
        }
    }
}
