// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use dual_camera::Config;
use dual_camera::backends::camera::DeviceFacing;
use dual_camera::config::PhotoOutputFormat;
use dual_camera::pipelines::StartPolicy;
use dual_camera::pipelines::photo::EncodingFormat;
use dual_camera::view_model::SessionOptions;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert!(
        !config.start_back_session,
        "Only the front session should start by default"
    );
    assert!(config.mirror_front_preview, "Front preview should be mirrored by default");
    assert_eq!(config.unlabeled_camera_facing, DeviceFacing::Front);
    assert!(config.save_directory.is_none());
}

#[test]
fn test_start_policy_from_config() {
    let mut config = Config::default();
    assert_eq!(config.start_policy(), StartPolicy::FrontOnly);

    config.start_back_session = true;
    assert_eq!(config.start_policy(), StartPolicy::Both);
}

#[test]
fn test_session_options_from_config() {
    let config = Config {
        photo_output_format: PhotoOutputFormat::Png,
        start_back_session: true,
        ..Config::default()
    };

    let options = SessionOptions::from_config(&config);
    assert_eq!(options.start_policy, StartPolicy::Both);
    assert_eq!(options.photo.format, EncodingFormat::Png);
}
