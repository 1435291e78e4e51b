// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for camera operations
//!
//! This module provides command-line functionality for:
//! - Listing available cameras and which side they are used for
//! - Taking a front and back photo without opening a window

use cosmic::Application;
use dual_camera::app::AppModel;
use dual_camera::backends::camera::{
    self, BackendError, CameraDevice, CameraPosition, DeviceFilter, DiscoveredDevices,
};
use dual_camera::config::Config;
use dual_camera::errors::{AppError, AppResult, StorageError};
use dual_camera::pipelines::StartPolicy;
use dual_camera::storage::{CreationRequest, MediaLibrary, PicturesLibrary, SavedAsset};
use dual_camera::view_model::{CameraViewModel, SessionOptions};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One row of `list --json`
#[derive(Debug, Serialize)]
struct CameraListing<'a> {
    name: &'a str,
    path: &'a str,
    facing: String,
    kind: String,
    rotation: u32,
    selected_as: Option<CameraPosition>,
    formats: Vec<String>,
}

/// List all available cameras
pub fn list_cameras(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    gstreamer::init()?;

    let (_, config) = Config::load(AppModel::APP_ID);
    let backend = camera::get_backend(config.unlabeled_camera_facing);
    let cameras = backend.enumerate_cameras();
    let selected = DiscoveredDevices::select(cameras.iter().cloned(), &DeviceFilter::default());

    let selected_as = |device: &CameraDevice| {
        CameraPosition::ALL
            .into_iter()
            .find(|position| selected.get(*position).is_some_and(|d| d.path == device.path))
    };

    if json {
        let listings: Vec<CameraListing<'_>> = cameras
            .iter()
            .map(|device| CameraListing {
                name: &device.name,
                path: &device.path,
                facing: device.facing.to_string(),
                kind: device.kind.to_string(),
                rotation: device.rotation.degrees(),
                selected_as: selected_as(device),
                formats: backend
                    .get_formats(device)
                    .iter()
                    .map(|format| format.to_string())
                    .collect(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, device) in cameras.iter().enumerate() {
        let marker = match selected_as(device) {
            Some(position) => format!(" <- {}", position),
            None => String::new(),
        };
        println!("  [{}] {}{}", index, device.name, marker);
        println!(
            "      Facing: {}, kind: {}, rotation: {}°",
            device.facing,
            device.kind,
            device.rotation.degrees()
        );

        let formats = backend.get_formats(device);
        match camera::select_capture_format(&formats) {
            Some(format) => println!("      Preview format: {}", format),
            None => println!("      No usable format"),
        }
        println!();
    }

    Ok(())
}

/// Photo library that remembers what it wrote so the CLI can report it
struct ReportingLibrary {
    inner: Arc<PicturesLibrary>,
    results: Arc<Mutex<Vec<Result<SavedAsset, StorageError>>>>,
}

impl MediaLibrary for ReportingLibrary {
    fn perform_changes(
        &self,
        request: CreationRequest,
    ) -> BoxFuture<'static, Result<SavedAsset, StorageError>> {
        let results = Arc::clone(&self.results);
        self.inner
            .perform_changes(request)
            .map(move |result| {
                results
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push(result.clone());
                result
            })
            .boxed()
    }
}

/// Take one photo with every available camera
pub fn take_photo(
    output_dir: Option<PathBuf>,
    both: bool,
    warmup: Duration,
) -> AppResult<()> {
    gstreamer::init().map_err(|e| BackendError::NotAvailable(e.to_string()))?;

    let (_, mut config) = Config::load(AppModel::APP_ID);
    if output_dir.is_some() {
        config.save_directory = output_dir;
    }
    let mut options = SessionOptions::from_config(&config);
    if both {
        options.start_policy = StartPolicy::Both;
    }

    let library = Arc::new(PicturesLibrary::from_config(config.save_directory.clone())?);
    let results = Arc::new(Mutex::new(Vec::new()));
    let reporting = Arc::new(ReportingLibrary {
        inner: Arc::clone(&library),
        results: Arc::clone(&results),
    });

    let runtime = tokio::runtime::Runtime::new()?;
    let view_model = CameraViewModel::new(
        camera::get_backend(config.unlabeled_camera_facing),
        reporting,
        runtime.handle().clone(),
        options,
    );

    println!("Saving to: {}", library.root().display());

    let captured = runtime.block_on(async {
        for start in view_model.setup_sessions() {
            match start.handle.await {
                Ok(Ok(())) => println!("{} camera started", start.position),
                Ok(Err(e)) => eprintln!("{} camera failed to start: {}", start.position, e),
                Err(e) => eprintln!("{} camera start task failed: {}", start.position, e),
            }
        }

        let pipelines = view_model.pipelines();
        if pipelines.is_empty() {
            return false;
        }
        for pipeline in pipelines.iter() {
            println!("Using {} camera: {}", pipeline.position, pipeline.device.name);
        }

        tokio::time::sleep(warmup).await;

        for ticket in view_model.take_photo() {
            if let Err(e) = ticket.handle.await {
                eprintln!("{} capture task failed: {}", ticket.position, e);
            }
        }
        view_model.storage().wait_for_writes().await;
        true
    });

    view_model.shutdown();
    if !captured {
        return Err(AppError::NoCameraFound);
    }

    let results = results.lock().unwrap_or_else(|e| e.into_inner());
    for result in results.iter() {
        match result {
            Ok(asset) => println!("Photo saved: {} ({} bytes)", asset.path.display(), asset.size),
            Err(e) => eprintln!("Failed to save photo: {}", e),
        }
    }
    if results.iter().all(Result::is_err) {
        println!("No photo was saved; see the log for capture errors (RUST_LOG=info).");
    }

    Ok(())
}
