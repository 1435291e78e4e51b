// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Which pipeline a device, session or capture result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraPosition {
    /// Front-facing pipeline (left half of the preview)
    Front,
    /// Back-facing pipeline (right half of the preview)
    Back,
}

impl CameraPosition {
    /// Both positions in preview order (left to right)
    pub const ALL: [CameraPosition; 2] = [CameraPosition::Front, CameraPosition::Back];

    /// Lowercase label used in logs and file names
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraPosition::Front => "front",
            CameraPosition::Back => "back",
        }
    }
}

impl std::fmt::Display for CameraPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical facing of a camera as reported by the platform
///
/// libcamera exposes this through the `api.libcamera.location` node property.
/// USB webcams usually carry no location and show up as `Unspecified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeviceFacing {
    Front,
    Back,
    External,
    #[default]
    Unspecified,
}

impl DeviceFacing {
    /// Parse a libcamera location value ("front", "back", "external")
    pub fn from_location(location: &str) -> Self {
        match location.trim().to_ascii_lowercase().as_str() {
            "front" | "0" => DeviceFacing::Front,
            "back" | "1" => DeviceFacing::Back,
            "external" | "2" => DeviceFacing::External,
            _ => DeviceFacing::Unspecified,
        }
    }
}

impl std::fmt::Display for DeviceFacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceFacing::Front => write!(f, "front"),
            DeviceFacing::Back => write!(f, "back"),
            DeviceFacing::External => write!(f, "external"),
            DeviceFacing::Unspecified => write!(f, "unspecified"),
        }
    }
}

/// Capability class of a capture device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeviceKind {
    /// Regular color camera
    #[default]
    WideAngle,
    /// Logical camera fusing two sensors
    DualCamera,
    /// Narrow field-of-view color camera
    Telephoto,
    /// IR sensor used for face authentication, not suitable for photos
    Infrared,
}

impl DeviceKind {
    /// Infer the device kind from a node name or description
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.contains("infrared")
            || lower.split(|c: char| !c.is_ascii_alphanumeric()).any(|w| w == "ir")
        {
            DeviceKind::Infrared
        } else if lower.contains("tele") {
            DeviceKind::Telephoto
        } else if lower.contains("dual") {
            DeviceKind::DualCamera
        } else {
            DeviceKind::WideAngle
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceKind::WideAngle => write!(f, "wide-angle"),
            DeviceKind::DualCamera => write!(f, "dual"),
            DeviceKind::Telephoto => write!(f, "telephoto"),
            DeviceKind::Infrared => write!(f, "infrared"),
        }
    }
}

/// Capability filter applied during device discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFilter {
    pub kinds: Vec<DeviceKind>,
}

impl DeviceFilter {
    /// Check whether a device passes the filter
    pub fn matches(&self, device: &CameraDevice) -> bool {
        self.kinds.contains(&device.kind)
    }
}

impl Default for DeviceFilter {
    fn default() -> Self {
        Self {
            kinds: vec![DeviceKind::WideAngle, DeviceKind::DualCamera],
        }
    }
}

/// Sensor rotation in degrees (clockwise)
///
/// Camera sensors may be physically mounted at various angles relative to the device.
/// This is common on mobile devices where sensors are rotated 90° or 270° relative
/// to the display orientation.
///
/// The rotation value comes from libcamera's `api.libcamera.rotation` property in PipeWire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorRotation {
    /// No rotation (sensor is oriented correctly)
    #[default]
    None,
    /// 90 degrees clockwise
    Rotate90,
    /// 180 degrees (upside down)
    Rotate180,
    /// 270 degrees clockwise (90 degrees counter-clockwise)
    Rotate270,
}

impl SensorRotation {
    /// Create rotation from an integer degree value (normalised to 0-360).
    pub fn from_degrees_int(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            90 => SensorRotation::Rotate90,
            180 => SensorRotation::Rotate180,
            270 => SensorRotation::Rotate270,
            _ => SensorRotation::None,
        }
    }

    /// Parse rotation from a string value (degrees)
    pub fn from_degrees(degrees: &str) -> Self {
        degrees
            .trim()
            .parse::<i32>()
            .map(Self::from_degrees_int)
            .unwrap_or_default()
    }

    /// Get the rotation in degrees
    pub fn degrees(&self) -> u32 {
        match self {
            SensorRotation::None => 0,
            SensorRotation::Rotate90 => 90,
            SensorRotation::Rotate180 => 180,
            SensorRotation::Rotate270 => 270,
        }
    }

    /// `videoflip` method that undoes the sensor mounting, if any is needed
    pub fn videoflip_method(&self) -> Option<&'static str> {
        match self {
            SensorRotation::None => None,
            SensorRotation::Rotate90 => Some("clockwise"),
            SensorRotation::Rotate180 => Some("rotate-180"),
            SensorRotation::Rotate270 => Some("counterclockwise"),
        }
    }
}

impl std::fmt::Display for SensorRotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Represents a camera device
///
/// Devices belong to the platform registry; the app only keeps copies of
/// the handle for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub name: String,
    pub path: String,                  // Path to capture device (pipewire node serial)
    pub metadata_path: Option<String>, // PipeWire node ID, used for format enumeration
    pub facing: DeviceFacing,
    pub kind: DeviceKind,
    pub rotation: SensorRotation,
}

/// Framerate as a fraction (numerator/denominator)
/// Stores exact framerate to handle NTSC rates like 59.94fps (60000/1001)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Framerate {
    pub num: u32,
    pub denom: u32,
}

impl Framerate {
    /// Create a new framerate from numerator and denominator
    pub fn new(num: u32, denom: u32) -> Self {
        Self {
            num,
            denom: if denom == 0 { 1 } else { denom },
        }
    }

    /// Create a framerate from an integer (e.g., 30 becomes 30/1)
    pub fn from_int(fps: u32) -> Self {
        Self { num: fps, denom: 1 }
    }

    /// Get the rounded-down integer framerate
    pub fn as_int(&self) -> u32 {
        self.num / self.denom
    }

    /// Format as GStreamer fraction string (e.g., "60000/1001")
    pub fn as_gst_fraction(&self) -> String {
        format!("{}/{}", self.num, self.denom)
    }
}

impl std::fmt::Display for Framerate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.denom != 1 {
            write!(f, "{:.2}", self.num as f64 / self.denom as f64)
        } else {
            write!(f, "{}", self.num)
        }
    }
}

/// Camera format specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFormat {
    pub width: u32,
    pub height: u32,
    pub framerate: Option<Framerate>, // None when libcamera negotiates the rate
    pub pixel_format: String,         // FourCC code (e.g., "MJPG", "YUY2", "NV12")
}

impl CameraFormat {
    /// Check if the format is MJPEG-compressed
    pub fn is_mjpeg(&self) -> bool {
        matches!(self.pixel_format.as_str(), "MJPG" | "MJPEG")
    }
}

impl std::fmt::Display for CameraFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(fps) = &self.framerate {
            write!(
                f,
                "{}x{} @ {}fps ({})",
                self.width, self.height, fps, self.pixel_format
            )
        } else {
            write!(f, "{}x{} ({})", self.width, self.height, self.pixel_format)
        }
    }
}

/// A device opened for capture together with the format it will stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInput {
    pub device: CameraDevice,
    pub format: CameraFormat,
}

/// A single RGBA frame from a session
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixels, `stride` bytes per row
    pub data: Arc<[u8]>,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// Timestamp when frame was captured (for latency diagnostics)
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Return tightly packed RGBA pixels, dropping any row padding
    pub fn packed_rgba(&self) -> Vec<u8> {
        let row_bytes = self.width as usize * 4;
        let stride = self.stride as usize;
        if stride == row_bytes || stride == 0 {
            return self.data.iter().take(row_bytes * self.height as usize).copied().collect();
        }

        let mut packed = Vec::with_capacity(row_bytes * self.height as usize);
        for row in self.data.chunks(stride).take(self.height as usize) {
            packed.extend_from_slice(&row[..row_bytes.min(row.len())]);
        }
        packed
    }

    /// Return packed RGBA pixels mirrored horizontally
    pub fn mirrored_rgba(&self) -> Vec<u8> {
        let mut pixels = self.packed_rgba();
        let row_bytes = self.width as usize * 4;
        if row_bytes == 0 {
            return pixels;
        }
        for row in pixels.chunks_mut(row_bytes) {
            let width = row.len() / 4;
            for x in 0..width / 2 {
                let (left, right) = (x * 4, (width - 1 - x) * 4);
                for c in 0..4 {
                    row.swap(left + c, right + c);
                }
            }
        }
        pixels
    }
}

/// Latest-frame channel shared by preview and still capture
pub type FrameWatch = tokio::sync::watch::Receiver<Option<Arc<CameraFrame>>>;

/// Publisher side of [`FrameWatch`]
pub type FramePublisher = tokio::sync::watch::Sender<Option<Arc<CameraFrame>>>;

/// Identity of a photo output sink, used by sessions to track attachments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputId(u64);

impl OutputId {
    /// Allocate a process-unique output id
    pub fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        OutputId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for OutputId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "output-{}", self.0)
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Backend is not available on this system
    NotAvailable(String),
    /// Failed to build or start a capture pipeline
    InitializationFailed(String),
    /// Device exposes no usable format
    FormatNotSupported(String),
    /// Session refused the input (already has one, or input invalid)
    InputRejected(String),
    /// Session refused the output (already attached)
    OutputRejected(String),
    /// Session was started before an input was bound
    NoInput,
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::NotAvailable(msg) => write!(f, "Backend not available: {}", msg),
            BackendError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            BackendError::FormatNotSupported(msg) => write!(f, "Format not supported: {}", msg),
            BackendError::InputRejected(msg) => write!(f, "Input rejected: {}", msg),
            BackendError::OutputRejected(msg) => write!(f, "Output rejected: {}", msg),
            BackendError::NoInput => write!(f, "Session has no input"),
        }
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: u32, height: u32, stride: u32, data: Vec<u8>) -> CameraFrame {
        CameraFrame {
            width,
            height,
            data: Arc::from(data),
            stride,
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn test_facing_from_location() {
        assert_eq!(DeviceFacing::from_location("front"), DeviceFacing::Front);
        assert_eq!(DeviceFacing::from_location(" Back "), DeviceFacing::Back);
        assert_eq!(DeviceFacing::from_location("external"), DeviceFacing::External);
        assert_eq!(DeviceFacing::from_location("somewhere"), DeviceFacing::Unspecified);
    }

    #[test]
    fn test_kind_from_name() {
        assert_eq!(DeviceKind::from_name("Integrated IR Camera"), DeviceKind::Infrared);
        assert_eq!(DeviceKind::from_name("imx258 tele"), DeviceKind::Telephoto);
        assert_eq!(DeviceKind::from_name("Laptop Webcam Module"), DeviceKind::WideAngle);
        // "ir" only counts as a whole word
        assert_eq!(DeviceKind::from_name("Mirror cam"), DeviceKind::WideAngle);
    }

    #[test]
    fn test_default_filter() {
        let filter = DeviceFilter::default();
        assert!(filter.kinds.contains(&DeviceKind::WideAngle));
        assert!(filter.kinds.contains(&DeviceKind::DualCamera));
        assert!(!filter.kinds.contains(&DeviceKind::Infrared));
    }

    #[test]
    fn test_rotation_parsing() {
        assert_eq!(SensorRotation::from_degrees("90"), SensorRotation::Rotate90);
        assert_eq!(SensorRotation::from_degrees("-90"), SensorRotation::Rotate270);
        assert_eq!(SensorRotation::from_degrees("garbage"), SensorRotation::None);
        assert_eq!(SensorRotation::None.videoflip_method(), None);
    }

    #[test]
    fn test_packed_rgba_strips_padding() {
        // 1x2 image with 8-byte stride (4 bytes padding per row)
        let f = frame(1, 2, 8, vec![1, 2, 3, 4, 0, 0, 0, 0, 5, 6, 7, 8, 0, 0, 0, 0]);
        assert_eq!(f.packed_rgba(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_mirrored_rgba() {
        let f = frame(2, 1, 8, vec![1, 1, 1, 1, 2, 2, 2, 2]);
        assert_eq!(f.mirrored_rgba(), vec![2, 2, 2, 2, 1, 1, 1, 1]);
    }

    #[test]
    fn test_output_ids_are_unique() {
        assert_ne!(OutputId::next(), OutputId::next());
    }
}
