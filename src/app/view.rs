// SPDX-License-Identifier: GPL-3.0-only

//! Main view rendering
//!
//! ```text
//! ┌──────────────────┬──────────────────┐
//! │                  │                  │
//! │      front       │       back       │
//! │                  │                  │
//! │               ( ◯ )                 │
//! └──────────────────┴──────────────────┘
//! ```

use crate::app::preview;
use crate::app::state::{AppModel, Message};
use cosmic::Element;
use cosmic::iced::widget::responsive;

impl AppModel {
    /// Build the main application view
    pub fn view(&self) -> Element<'_, Message> {
        let front = self.previews.front.clone();
        let back = self.previews.back.clone();

        let previews = responsive(move |size| {
            preview::dual_preview(size, front.clone(), back.clone())
        });

        cosmic::iced::widget::stack![previews, self.build_capture_button()].into()
    }
}
