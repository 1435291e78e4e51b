// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling

use crate::app::state::{AppModel, Message};
use crate::backends::camera::types::{CameraFrame, CameraPosition};
use crate::config::Config;
use crate::constants::ui;
use cosmic::Task;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

impl AppModel {
    /// Main message handler
    pub fn update(&mut self, message: Message) -> Task<cosmic::Action<Message>> {
        match message {
            Message::UpdateConfig(config) => self.handle_update_config(config),
            Message::SessionsReady => {
                info!(
                    front = self.pipelines.front.is_some(),
                    back = self.pipelines.back.is_some(),
                    "Camera sessions set up"
                );
                Task::none()
            }
            Message::PipelinesChanged(pipelines) => {
                self.previews.retain_present(&pipelines);
                self.pipelines = pipelines;
                Task::none()
            }
            Message::PreviewFrame(position, frame) => self.handle_preview_frame(position, &frame),
            Message::Capture => self.handle_capture(),
            Message::ClearCaptureAnimation => {
                self.is_capturing = false;
                Task::none()
            }
        }
    }

    fn handle_update_config(&mut self, config: Config) -> Task<cosmic::Action<Message>> {
        debug!(?config, "Configuration updated");
        let theme_changed = config.app_theme != self.config.app_theme;
        if config.start_back_session != self.config.start_back_session
            || config.unlabeled_camera_facing != self.config.unlabeled_camera_facing
        {
            info!("Session settings changed; they apply at next launch");
        }
        self.config = config;

        if theme_changed {
            cosmic::command::set_theme(self.config.app_theme.theme())
        } else {
            Task::none()
        }
    }

    fn handle_preview_frame(
        &mut self,
        position: CameraPosition,
        frame: &Arc<CameraFrame>,
    ) -> Task<cosmic::Action<Message>> {
        let mirror = position == CameraPosition::Front && self.config.mirror_front_preview;
        if !self.previews.show_frame(&self.pipelines, position, frame, mirror) {
            debug!(%position, "Dropping frame for absent pipeline");
        }
        Task::none()
    }

    fn handle_capture(&mut self) -> Task<cosmic::Action<Message>> {
        // Results are saved in the background; nothing is reported back
        let tickets = self.view_model.take_photo();
        debug!(requests = tickets.len(), "Capture issued");

        self.is_capturing = true;
        Self::delay_task(ui::CAPTURE_ANIMATION, Message::ClearCaptureAnimation)
    }

    /// Emit `message` after `delay`
    pub(crate) fn delay_task(delay: Duration, message: Message) -> Task<cosmic::Action<Message>> {
        Task::perform(
            async move {
                tokio::time::sleep(delay).await;
                message
            },
            cosmic::Action::App,
        )
    }
}
