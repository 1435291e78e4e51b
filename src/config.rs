// SPDX-License-Identifier: GPL-3.0-only

use crate::backends::camera::DeviceFacing;
use crate::pipelines::StartPolicy;
use cosmic::cosmic_config::{self, CosmicConfigEntry, cosmic_config_derive::CosmicConfigEntry};
use cosmic::{Theme, theme};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::error;

/// Application theme preference
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum AppTheme {
    /// Follow system theme (dark or light based on system setting)
    #[default]
    System,
    /// Always use dark theme
    Dark,
    /// Always use light theme
    Light,
}

impl AppTheme {
    /// Get the COSMIC theme for this app theme preference
    pub fn theme(&self) -> Theme {
        match self {
            Self::Dark => {
                let mut theme = theme::system_dark();
                theme.theme_type.prefer_dark(Some(true));
                theme
            }
            Self::Light => {
                let mut theme = theme::system_light();
                theme.theme_type.prefer_dark(Some(false));
                theme
            }
            Self::System => theme::system_preference(),
        }
    }
}

/// Encoding used for saved photos
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum PhotoOutputFormat {
    #[default]
    Jpeg,
    Png,
}

#[derive(Debug, Clone, CosmicConfigEntry, Eq, PartialEq, Serialize, Deserialize)]
#[version = 1]
pub struct Config {
    /// Application theme preference (System, Dark, Light)
    pub app_theme: AppTheme,
    /// Also start the back session at launch (only the front one starts otherwise)
    pub start_back_session: bool,
    /// Facing assumed for cameras that report no location (typical USB webcams)
    pub unlabeled_camera_facing: DeviceFacing,
    /// Encoding of saved photos
    pub photo_output_format: PhotoOutputFormat,
    /// Photo library directory; the Pictures folder is used when unset
    pub save_directory: Option<PathBuf>,
    /// Mirror the front preview horizontally (selfie mode)
    pub mirror_front_preview: bool,
}

impl Config {
    /// Load the stored configuration, falling back to defaults
    ///
    /// The handler is `None` when the config store cannot be opened.
    pub fn load(app_id: &str) -> (Option<cosmic_config::Config>, Self) {
        match cosmic_config::Config::new(app_id, Self::VERSION) {
            Ok(handler) => {
                let config = match Self::get_entry(&handler) {
                    Ok(config) => config,
                    Err((errors, config)) => {
                        error!(?errors, "Errors loading config");
                        config
                    }
                };
                (Some(handler), config)
            }
            Err(err) => {
                error!(%err, "Failed to create config handler");
                (None, Self::default())
            }
        }
    }

    /// Which sessions start after setup
    pub fn start_policy(&self) -> StartPolicy {
        StartPolicy::from_start_back(self.start_back_session)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_theme: AppTheme::default(),
            start_back_session: false,
            unlabeled_camera_facing: DeviceFacing::Front,
            photo_output_format: PhotoOutputFormat::default(),
            save_directory: None,
            mirror_front_preview: true,
        }
    }
}
