// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use dual_camera::constants::{formats, storage, timing, ui};

#[test]
fn test_window_fits_two_previews_and_button() {
    // Each half must be wider than the capture button
    assert!(ui::MIN_WINDOW_WIDTH / 2.0 > ui::CAPTURE_BUTTON_OUTER);
    assert!(ui::MIN_WINDOW_HEIGHT > ui::CAPTURE_BUTTON_OUTER + ui::CAPTURE_BUTTON_MARGIN);
}

#[test]
fn test_fallback_resolutions_fit_preview_limit() {
    for (width, height) in formats::FALLBACK_RESOLUTIONS {
        assert!(*width <= formats::MAX_PREVIEW_WIDTH);
        assert!(*height > 0);
    }
}

#[test]
fn test_frame_timeout_outlasts_capture_animation() {
    assert!(timing::FRAME_TIMEOUT > ui::CAPTURE_ANIMATION);
}

#[test]
fn test_storage_names() {
    assert!(!storage::PICTURES_SUBDIR.is_empty());
    assert!(!storage::FILE_PREFIX.contains('/'));
    assert!(storage::MAX_NAME_ATTEMPTS > 1);
}
