// SPDX-License-Identifier: GPL-3.0-only

//! Observable camera state shared with the UI
//!
//! [`CameraViewModel`] owns the whole capture stack and publishes the current
//! [`Pipelines`] through a watch channel. The UI holds an `Arc` to it and
//! re-renders when the published value changes.

use crate::backends::camera::{self, CameraBackend, DeviceFilter};
use crate::config::Config;
use crate::pipelines::photo::{
    CaptureController, CaptureTicket, EncodingFormat, PhotoOutputs, PhotoSettings,
};
use crate::pipelines::{
    Pipelines, StartHandle, StartPolicy, setup_pipelines, start_pipelines, stop_pipelines,
};
use crate::storage::{self, MediaLibrary, StorageSink};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::warn;

/// Session construction options
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionOptions {
    pub filter: DeviceFilter,
    pub start_policy: StartPolicy,
    pub photo: PhotoSettings,
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            filter: DeviceFilter::default(),
            start_policy: config.start_policy(),
            photo: PhotoSettings {
                format: EncodingFormat::from(config.photo_output_format),
                ..PhotoSettings::default()
            },
        }
    }
}

/// State holder for the dual camera screen
pub struct CameraViewModel {
    backend: Arc<dyn CameraBackend>,
    runtime: Handle,
    options: SessionOptions,
    outputs: PhotoOutputs,
    controller: CaptureController,
    storage: Arc<StorageSink>,
    pipelines: watch::Sender<Pipelines>,
    setup_started: AtomicBool,
}

impl CameraViewModel {
    pub fn new(
        backend: Arc<dyn CameraBackend>,
        library: Arc<dyn MediaLibrary>,
        runtime: Handle,
        options: SessionOptions,
    ) -> Self {
        let (pipelines, _) = watch::channel(Pipelines::default());
        Self {
            controller: CaptureController::new(runtime.clone(), options.photo),
            storage: Arc::new(StorageSink::new(library, runtime.clone())),
            outputs: PhotoOutputs::new(),
            backend,
            runtime,
            options,
            pipelines,
            setup_started: AtomicBool::new(false),
        }
    }

    /// Build the view model on the PipeWire backend and the Pictures library
    ///
    /// A missing library leaves previews running; captures are then logged
    /// and dropped at write time.
    pub fn from_config(config: &Config, runtime: Handle) -> Self {
        Self::new(
            camera::get_backend(config.unlabeled_camera_facing),
            storage::open_library(config.save_directory.clone()),
            runtime,
            SessionOptions::from_config(config),
        )
    }

    /// Discover devices, build both pipelines, publish them and start them
    ///
    /// Runs once; later calls return no handles. Discovery and construction
    /// run on the calling thread, session starts run on the blocking pool.
    pub fn setup_sessions(&self) -> Vec<StartHandle> {
        if self.setup_started.swap(true, Ordering::SeqCst) {
            warn!("Sessions already set up, ignoring");
            return Vec::new();
        }

        let devices = camera::discover(self.backend.as_ref(), &self.options.filter);
        let pipelines = setup_pipelines(self.backend.as_ref(), &devices, &self.outputs);
        self.pipelines.send_replace(pipelines.clone());

        start_pipelines(&self.runtime, &pipelines, self.options.start_policy)
    }

    /// Receiver notified whenever the pipelines change
    pub fn subscribe(&self) -> watch::Receiver<Pipelines> {
        self.pipelines.subscribe()
    }

    /// Snapshot of the current pipelines
    pub fn pipelines(&self) -> Pipelines {
        self.pipelines.borrow().clone()
    }

    /// Capture on every present pipeline; results go to the photo library
    pub fn take_photo(&self) -> Vec<CaptureTicket> {
        let storage = Arc::clone(&self.storage);
        self.controller
            .capture(&self.pipelines(), move |completion| {
                storage.handle_completion(completion)
            })
    }

    pub fn storage(&self) -> &StorageSink {
        &self.storage
    }

    pub fn outputs(&self) -> &PhotoOutputs {
        &self.outputs
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Stop all sessions
    pub fn shutdown(&self) {
        stop_pipelines(&self.pipelines());
    }
}
