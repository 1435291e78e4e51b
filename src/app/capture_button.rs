// SPDX-License-Identifier: MPL-2.0

//! Capture button widget implementation

use crate::app::state::{AppModel, Message};
use crate::constants::ui;
use crate::fl;
use cosmic::Element;
use cosmic::iced::alignment::Vertical;
use cosmic::iced::{Background, Color, Length, Padding};
use cosmic::widget;

impl AppModel {
    /// Build the capture button widget
    ///
    /// A white circle that briefly shrinks when pressed. Disabled until a
    /// pipeline is present.
    pub fn build_capture_button(&self) -> Element<'_, Message> {
        let is_disabled = self.pipelines.is_empty();

        let color = if is_disabled {
            Color::from_rgba(0.5, 0.5, 0.5, 0.3)
        } else if self.is_capturing {
            Color::from_rgb(0.7, 0.7, 0.7)
        } else {
            Color::WHITE
        };

        let inner_size = if self.is_capturing {
            ui::CAPTURE_BUTTON_PRESSED
        } else {
            ui::CAPTURE_BUTTON_INNER
        };

        let button_inner = widget::container(widget::Space::new(
            Length::Fixed(inner_size),
            Length::Fixed(inner_size),
        ))
        .style(move |_theme| widget::container::Style {
            background: Some(Background::Color(color)),
            border: cosmic::iced::Border {
                radius: [ui::CAPTURE_BUTTON_RADIUS * (inner_size / ui::CAPTURE_BUTTON_INNER); 4]
                    .into(),
                ..Default::default()
            },
            ..Default::default()
        });

        let mut button = widget::button::custom(
            widget::container(button_inner)
                .center_x(Length::Fill)
                .center_y(Length::Fill),
        )
        .padding(0)
        .width(Length::Fixed(ui::CAPTURE_BUTTON_OUTER))
        .height(Length::Fixed(ui::CAPTURE_BUTTON_OUTER));
        if !is_disabled {
            button = button.on_press(Message::Capture);
        }

        let button = widget::tooltip(
            button,
            widget::text(fl!("capture")),
            widget::tooltip::Position::Top,
        );

        widget::container(button)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .align_y(Vertical::Bottom)
            .padding(Padding {
                bottom: ui::CAPTURE_BUTTON_MARGIN,
                ..Padding::ZERO
            })
            .into()
    }
}
