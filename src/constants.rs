// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// UI Constants
pub mod ui {
    use std::time::Duration;

    /// Capture button size (outer)
    pub const CAPTURE_BUTTON_OUTER: f32 = 60.0;

    /// Capture button size (inner)
    pub const CAPTURE_BUTTON_INNER: f32 = 50.0;

    /// Capture button border radius
    pub const CAPTURE_BUTTON_RADIUS: f32 = 25.0;

    /// Inner circle size while the press animation plays
    pub const CAPTURE_BUTTON_PRESSED: f32 = 42.0;

    /// Duration of the capture button press animation
    pub const CAPTURE_ANIMATION: Duration = Duration::from_millis(150);

    /// Distance between the capture button and the bottom edge
    pub const CAPTURE_BUTTON_MARGIN: f32 = 24.0;

    /// Minimum window size
    pub const MIN_WINDOW_WIDTH: f32 = 360.0;
    pub const MIN_WINDOW_HEIGHT: f32 = 180.0;
}

/// Video format constants
pub mod formats {
    /// Common frame rates to try when exact enumeration fails
    pub const COMMON_FRAMERATES: &[u32] = &[30, 15];

    /// Resolutions offered when a node cannot be queried
    pub const FALLBACK_RESOLUTIONS: &[(u32, u32)] = &[(1920, 1080), (1280, 720), (640, 480)];

    /// Widest format picked for a preview session
    pub const MAX_PREVIEW_WIDTH: u32 = 1920;
}

/// GStreamer pipeline constants
pub mod pipeline {
    /// Maximum buffer queue size (keep small for low latency)
    pub const MAX_BUFFERS: u32 = 2;
}

/// Timing constants
pub mod timing {
    use std::time::Duration;

    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;

    /// Pipeline state change timeout on stop
    pub const STOP_TIMEOUT_SECS: u64 = 2;

    /// Pipeline playing state timeout on start
    pub const START_TIMEOUT_SECS: u64 = 5;

    /// How long a photo request waits for the first frame of a session
    pub const FRAME_TIMEOUT: Duration = Duration::from_secs(3);
}

/// Photo library constants
pub mod storage {
    /// Folder created inside the user's Pictures directory
    pub const PICTURES_SUBDIR: &str = "dual-camera";

    /// File name prefix for saved photos
    pub const FILE_PREFIX: &str = "IMG";

    /// Highest numeric suffix tried before giving up on a unique name
    pub const MAX_NAME_ATTEMPTS: u32 = 1000;
}

/// Default warm-up for headless captures, giving sensors time to settle exposure
pub const CLI_WARMUP: Duration = Duration::from_millis(1500);

/// Build and sandbox information reported at startup
pub mod app_info {
    /// Version string exported by the build script
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }

    /// "Flatpak" inside a Flatpak sandbox, "Native" otherwise
    pub fn runtime_environment() -> &'static str {
        if std::path::Path::new("/.flatpak-info").exists() {
            "Flatpak"
        } else {
            "Native"
        }
    }
}
