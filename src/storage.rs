// SPDX-License-Identifier: MPL-2.0

//! Photo library storage
//!
//! Completed captures are handed to a [`MediaLibrary`] as single-resource
//! creation requests. The default library writes into the user's Pictures
//! directory.

use crate::backends::camera::CameraPosition;
use crate::constants::storage;
use crate::errors::StorageError;
use crate::pipelines::photo::{CaptureCompletion, CapturedImage, EncodingFormat};
use chrono::{DateTime, Local};
use futures::future::{BoxFuture, FutureExt};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Kind of resource stored in the library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Photo,
}

/// A single-resource creation transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationRequest {
    pub resource_type: ResourceType,
    pub data: Vec<u8>,
    pub format: EncodingFormat,
    pub position: CameraPosition,
    pub created_at: DateTime<Local>,
}

impl CreationRequest {
    /// Photo request carrying the captured bytes unchanged
    pub fn photo(image: CapturedImage) -> Self {
        Self {
            resource_type: ResourceType::Photo,
            data: image.data,
            format: image.format,
            position: image.position,
            created_at: Local::now(),
        }
    }
}

/// Where the library stored a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedAsset {
    pub path: PathBuf,
    pub size: usize,
}

/// Media library write service
pub trait MediaLibrary: Send + Sync {
    /// Submit a creation request; the future resolves when the write finishes
    fn perform_changes(
        &self,
        request: CreationRequest,
    ) -> BoxFuture<'static, Result<SavedAsset, StorageError>>;
}

/// Library backed by a directory of image files
#[derive(Debug, Clone)]
pub struct PicturesLibrary {
    root: PathBuf,
}

impl PicturesLibrary {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Use the configured directory, or the default photo folder
    pub fn from_config(save_directory: Option<PathBuf>) -> Result<Self, StorageError> {
        save_directory
            .or_else(Self::default_directory)
            .map(Self::new)
            .ok_or(StorageError::NoLibraryDirectory)
    }

    /// `$XDG_PICTURES_DIR/dual-camera`, falling back to `~/Pictures/dual-camera`
    pub fn default_directory() -> Option<PathBuf> {
        dirs::picture_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
            .map(|pictures| pictures.join(storage::PICTURES_SUBDIR))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Library used when no photo directory can be determined; every write fails
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableLibrary;

impl MediaLibrary for UnavailableLibrary {
    fn perform_changes(
        &self,
        _request: CreationRequest,
    ) -> BoxFuture<'static, Result<SavedAsset, StorageError>> {
        async { Err(StorageError::NoLibraryDirectory) }.boxed()
    }
}

/// Open the configured library, falling back to one that rejects every write
pub fn open_library(save_directory: Option<PathBuf>) -> Arc<dyn MediaLibrary> {
    match PicturesLibrary::from_config(save_directory) {
        Ok(library) => {
            info!(directory = %library.root().display(), "Photo library ready");
            Arc::new(library)
        }
        Err(e) => {
            error!(error = %e, "Photo library unavailable, captures will not be saved");
            Arc::new(UnavailableLibrary)
        }
    }
}

impl MediaLibrary for PicturesLibrary {
    fn perform_changes(
        &self,
        request: CreationRequest,
    ) -> BoxFuture<'static, Result<SavedAsset, StorageError>> {
        let root = self.root.clone();
        async move {
            tokio::task::spawn_blocking(move || write_request(&root, &request))
                .await
                .map_err(|e| StorageError::Io(format!("write task failed: {}", e)))?
        }
        .boxed()
    }
}

/// File stem for a photo, e.g. `IMG_20250101_120000_front`
pub fn file_stem(created_at: &DateTime<Local>, position: CameraPosition) -> String {
    format!(
        "{}_{}_{}",
        storage::FILE_PREFIX,
        created_at.format("%Y%m%d_%H%M%S"),
        position.as_str()
    )
}

fn write_request(root: &Path, request: &CreationRequest) -> Result<SavedAsset, StorageError> {
    if request.data.is_empty() {
        return Err(StorageError::InvalidRequest("empty payload".to_string()));
    }

    std::fs::create_dir_all(root)?;

    let stem = file_stem(&request.created_at, request.position);
    let extension = request.format.extension();

    for attempt in 0..storage::MAX_NAME_ATTEMPTS {
        let name = if attempt == 0 {
            format!("{}.{}", stem, extension)
        } else {
            format!("{}-{}.{}", stem, attempt, extension)
        };
        let path = root.join(&name);

        // create_new makes concurrent writers pick distinct names
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "Name taken, trying next");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = file.write_all(&request.data).and_then(|_| file.sync_all()) {
            let _ = std::fs::remove_file(&path);
            return Err(e.into());
        }

        return Ok(SavedAsset {
            path,
            size: request.data.len(),
        });
    }

    Err(StorageError::NameExhausted(stem))
}

/// Consumes capture completions and writes successful images to the library
///
/// Writes are fire-and-forget: the outcome is logged and nothing is reported
/// back to the caller.
pub struct StorageSink {
    library: Arc<dyn MediaLibrary>,
    runtime: Handle,
    writes: Mutex<JoinSet<()>>,
}

impl StorageSink {
    pub fn new(library: Arc<dyn MediaLibrary>, runtime: Handle) -> Self {
        Self {
            library,
            runtime,
            writes: Mutex::new(JoinSet::new()),
        }
    }

    /// Handle one completion: one write on success, a log line on failure
    pub fn handle_completion(&self, completion: CaptureCompletion) {
        let CaptureCompletion {
            request_id,
            position,
            outcome,
        } = completion;

        let image = match outcome {
            Ok(image) => image,
            Err(e) => {
                warn!(%request_id, %position, error = %e, "Capture failed, result dropped");
                return;
            }
        };

        let size = image.data.len();
        let write = self.library.perform_changes(CreationRequest::photo(image));
        debug!(%request_id, %position, size, "Write submitted to photo library");

        let mut writes = self.writes.lock().unwrap_or_else(|e| e.into_inner());
        while writes.try_join_next().is_some() {}
        writes.spawn_on(
            async move {
                match write.await {
                    Ok(asset) => info!(
                        %request_id,
                        %position,
                        path = %asset.path.display(),
                        size = asset.size,
                        "Photo saved"
                    ),
                    Err(e) => error!(%request_id, %position, error = %e, "Failed to save photo"),
                }
            },
            &self.runtime,
        );
    }

    /// Number of writes that have not been reaped yet
    pub fn pending_writes(&self) -> usize {
        self.writes.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Wait until every submitted write has finished
    pub async fn wait_for_writes(&self) {
        let mut writes = {
            let mut guard = self.writes.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *guard)
        };
        while writes.join_next().await.is_some() {}
    }
}
