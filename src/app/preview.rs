// SPDX-License-Identifier: GPL-3.0-only

//! Side-by-side dual camera preview
//!
//! The preview is laid out inside a `responsive` container, so the geometry
//! is recomputed from scratch on every resize.

use crate::app::state::{Message, PreviewImage};
use cosmic::Element;
use cosmic::iced::{Background, Color, ContentFit, Length, Point, Rectangle, Size};
use cosmic::widget;

/// Bounds of the two preview layers inside the container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewLayout {
    pub front: Rectangle,
    pub back: Rectangle,
}

impl PreviewLayout {
    /// Front takes the left half, back the right half, both full height
    pub fn for_size(size: Size) -> Self {
        let half = size.width / 2.0;
        Self {
            front: Rectangle::new(Point::ORIGIN, Size::new(half, size.height)),
            back: Rectangle::new(Point::new(half, 0.0), Size::new(half, size.height)),
        }
    }
}

/// Build both preview halves for the given container size
pub fn dual_preview<'a>(
    size: Size,
    front: Option<PreviewImage>,
    back: Option<PreviewImage>,
) -> Element<'a, Message> {
    let layout = PreviewLayout::for_size(size);

    widget::row()
        .push(preview_half(layout.front, front))
        .push(preview_half(layout.back, back))
        .width(Length::Fixed(size.width))
        .height(Length::Fixed(size.height))
        .into()
}

fn preview_half<'a>(bounds: Rectangle, image: Option<PreviewImage>) -> Element<'a, Message> {
    let content: Element<'a, Message> = match image {
        Some(image) => widget::image::Image::new(image.handle)
            .content_fit(ContentFit::Cover)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        None => widget::Space::new(Length::Fill, Length::Fill).into(),
    };

    widget::container(content)
        .width(Length::Fixed(bounds.width))
        .height(Length::Fixed(bounds.height))
        .clip(true)
        .style(|_theme| widget::container::Style {
            background: Some(Background::Color(Color::BLACK)),
            ..Default::default()
        })
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_halves() {
        let layout = PreviewLayout::for_size(Size::new(800.0, 600.0));
        assert_eq!(layout.front, Rectangle::new(Point::new(0.0, 0.0), Size::new(400.0, 600.0)));
        assert_eq!(layout.back, Rectangle::new(Point::new(400.0, 0.0), Size::new(400.0, 600.0)));
    }

    #[test]
    fn test_layout_odd_width() {
        let layout = PreviewLayout::for_size(Size::new(401.0, 10.0));
        assert_eq!(layout.front.width + layout.back.width, 401.0);
        assert_eq!(layout.back.x, layout.front.width);
    }
}
