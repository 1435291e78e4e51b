// SPDX-License-Identifier: MPL-2.0

//! Main application module for Dual Camera
//!
//! # Architecture
//!
//! - `state`: Application state types (AppModel, Message, preview images)
//! - `preview`: Side-by-side preview layout
//! - `capture_button`: The single capture button
//! - `view`: Main view rendering
//! - `update`: Message handling
//!
//! The application owns a [`CameraViewModel`] which holds both capture
//! sessions. Session setup runs once on the blocking pool after the window
//! opens; previews follow the sessions' frame channels through subscriptions.

mod capture_button;
pub mod preview;
mod state;
mod update;
mod view;

use crate::config::Config;
use crate::fl;
use crate::view_model::CameraViewModel;
use cosmic::iced::Subscription;
use cosmic::{ApplicationExt, Element, Task};
pub use state::{AppModel, Message, PreviewImage, PreviewImages};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

impl cosmic::Application for AppModel {
    /// The async executor that will be used to run your application's commands.
    type Executor = cosmic::executor::Default;

    /// Runtime that owns session starts, photo encoding and file writes.
    type Flags = Handle;

    /// Messages which the application and its widgets will emit.
    type Message = Message;

    /// Unique identifier in RDNN (reverse domain name notation) format.
    const APP_ID: &'static str = "io.github.cosmic-utils.dual-camera";

    fn core(&self) -> &cosmic::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut cosmic::Core {
        &mut self.core
    }

    /// Initializes the application with any given flags and startup commands.
    fn init(
        core: cosmic::Core,
        runtime: Self::Flags,
    ) -> (Self, Task<cosmic::Action<Self::Message>>) {
        // Load configuration
        let (config_handler, config) = Config::load(Self::APP_ID);

        // Required before any GStreamer call
        if let Err(e) = gstreamer::init() {
            error!(error = %e, "Failed to initialize GStreamer");
        }

        let view_model = Arc::new(CameraViewModel::from_config(&config, runtime.clone()));

        let mut app = AppModel {
            core,
            config,
            config_handler,
            view_model: Arc::clone(&view_model),
            pipelines: Default::default(),
            previews: Default::default(),
            is_capturing: false,
        };

        let title_task = match app.core.main_window_id() {
            Some(id) => app.set_window_title(fl!("app-title"), id),
            None => Task::none(),
        };

        // Discovery and session construction can block on pw-cli
        let setup_task = Task::perform(
            async move {
                let setup = runtime.spawn_blocking(move || view_model.setup_sessions());
                let starts = match setup.await {
                    Ok(starts) => starts,
                    Err(e) => {
                        error!(error = %e, "Session setup task failed");
                        return;
                    }
                };
                for start in starts {
                    if let Err(e) = start.handle.await {
                        warn!(position = %start.position, error = %e, "Session start task failed");
                    }
                }
            },
            |()| cosmic::Action::App(Message::SessionsReady),
        );

        (app, Task::batch([title_task, setup_task]))
    }

    /// Describes the interface based on the current state of the application model.
    fn view(&self) -> Element<'_, Self::Message> {
        self.view()
    }

    /// Register subscriptions for this application.
    fn subscription(&self) -> Subscription<Self::Message> {
        use cosmic::iced::futures::SinkExt;

        let config_sub = self
            .core()
            .watch_config::<Config>(Self::APP_ID)
            .map(|update| Message::UpdateConfig(update.config));

        let view_model = Arc::clone(&self.view_model);
        let pipelines_sub = Subscription::run_with_id(
            "pipelines",
            cosmic::iced::stream::channel(4, move |mut output| async move {
                let mut receiver = view_model.subscribe();
                loop {
                    let pipelines = (*receiver.borrow_and_update()).clone();
                    if output.send(Message::PipelinesChanged(pipelines)).await.is_err() {
                        break;
                    }
                    if receiver.changed().await.is_err() {
                        break;
                    }
                }
                debug!("Pipelines subscription stopped");
            }),
        );

        // One preview stream per present pipeline, restarted if the pipeline changes
        let preview_subs = self.pipelines.iter().map(|pipeline| {
            let position = pipeline.position;
            let mut frames = pipeline.session.frames();
            Subscription::run_with_id(
                ("preview", pipeline.identity()),
                cosmic::iced::stream::channel(2, move |mut output| async move {
                    info!(%position, "Preview subscription started");
                    while frames.changed().await.is_ok() {
                        let frame = (*frames.borrow_and_update()).clone();
                        let Some(frame) = frame else {
                            continue;
                        };
                        if output.send(Message::PreviewFrame(position, frame)).await.is_err() {
                            break;
                        }
                    }
                    info!(%position, "Preview subscription stopped");
                }),
            )
        });

        Subscription::batch(
            [config_sub, pipelines_sub]
                .into_iter()
                .chain(preview_subs)
                .collect::<Vec<_>>(),
        )
    }

    /// Handles messages emitted by the application and its widgets.
    fn update(&mut self, message: Self::Message) -> Task<cosmic::Action<Self::Message>> {
        self.update(message)
    }
}
