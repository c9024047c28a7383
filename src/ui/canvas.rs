use cgmath::Point2;
use iced::mouse::{self, Cursor};
use iced::touch;
use iced::widget::canvas::{self, Path, Program, Stroke};
use iced::widget::image::Handle;
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};
use std::time::Instant;

use crate::crop::CropEditor;
use crate::gesture::InputEvent;
use crate::Message;

/// Darkening applied outside the crop frame
const SHADE: Color = Color::from_rgba(0.0, 0.0, 0.0, 0.55);

/// Live crop preview with pan/zoom input
///
/// Drawing follows the editor's transform; input is translated into
/// `InputEvent`s and handed to the gesture interpreter through messages.
pub struct CropCanvas<'a> {
    /// Preview texture of the active source image
    pub preview: &'a Handle,
    pub editor: &'a CropEditor,
    /// Midpoint of an ongoing pinch, drawn as a small ring
    pub pinch_center: Option<Point2<f64>>,
}

impl<'a> Program<Message> for CropCanvas<'a> {
    type State = DragState;

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), Color::BLACK);

        let transform = self.editor.transform();
        let size = transform.displayed_size(self.editor.dims());
        let image_bounds = Rectangle::new(
            Point::new(transform.x as f32, transform.y as f32),
            Size::new(size.x as f32, size.y as f32),
        );
        frame.draw_image(image_bounds, self.preview);

        let crop = self.editor.frame();
        let (left, top) = (crop.left as f32, crop.top as f32);
        let (right, bottom) = (crop.right() as f32, crop.bottom() as f32);
        let (width, height) = (bounds.width, bounds.height);

        // Shade everything outside the frame
        frame.fill_rectangle(Point::ORIGIN, Size::new(width, top.max(0.0)), SHADE);
        frame.fill_rectangle(Point::new(0.0, bottom), Size::new(width, (height - bottom).max(0.0)), SHADE);
        frame.fill_rectangle(Point::new(0.0, top), Size::new(left.max(0.0), bottom - top), SHADE);
        frame.fill_rectangle(Point::new(right, top), Size::new((width - right).max(0.0), bottom - top), SHADE);

        frame.stroke(
            &Path::rectangle(Point::new(left, top), Size::new(right - left, bottom - top)),
            Stroke::default().with_color(Color::WHITE).with_width(2.0),
        );

        if let Some(center) = self.pinch_center {
            frame.stroke(
                &Path::circle(Point::new(center.x as f32, center.y as f32), 8.0),
                Stroke::default().with_color(Color::from_rgb(1.0, 0.6, 0.0)).with_width(2.0),
            );
        }

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let captured = |event| (canvas::event::Status::Captured, Some(Message::Input(event)));

        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(pos) = cursor.position_in(bounds) {
                    state.is_dragging = true;
                    return captured(InputEvent::PointerDown {
                        at: to_point(pos),
                        time: Instant::now(),
                    });
                }
            }

            // No context menu or other default handling on the surface
            canvas::Event::Mouse(mouse::Event::ButtonPressed(_)) if cursor.is_over(bounds) => {
                return (canvas::event::Status::Captured, None);
            }

            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                if state.is_dragging {
                    state.is_dragging = false;
                    return captured(InputEvent::PointerUp);
                }
            }

            // Keep tracking outside the bounds while a drag is in progress
            canvas::Event::Mouse(mouse::Event::CursorMoved { position }) => {
                if state.is_dragging {
                    return captured(InputEvent::PointerMove {
                        at: relative(position, bounds),
                    });
                }
            }

            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                if let Some(pos) = cursor.position_in(bounds) {
                    // iced reports positive y for scrolling up; flip to
                    // the "negative zooms in" convention
                    let delta_y = match delta {
                        mouse::ScrollDelta::Lines { y, .. } => -y,
                        mouse::ScrollDelta::Pixels { y, .. } => -y,
                    };
                    return captured(InputEvent::Wheel {
                        at: to_point(pos),
                        delta_y: delta_y as f64,
                    });
                }
            }

            canvas::Event::Touch(touch::Event::FingerPressed { id, position }) => {
                if bounds.contains(position) {
                    return captured(InputEvent::TouchStart {
                        id: id.0,
                        at: relative(position, bounds),
                        time: Instant::now(),
                    });
                }
            }

            canvas::Event::Touch(touch::Event::FingerMoved { id, position }) => {
                return captured(InputEvent::TouchMove {
                    id: id.0,
                    at: relative(position, bounds),
                });
            }

            canvas::Event::Touch(touch::Event::FingerLifted { id, .. })
            | canvas::Event::Touch(touch::Event::FingerLost { id, .. }) => {
                return captured(InputEvent::TouchEnd { id: id.0 });
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }

    fn mouse_interaction(&self, state: &Self::State, bounds: Rectangle, cursor: Cursor) -> mouse::Interaction {
        if state.is_dragging {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}

/// State for drag interactions
#[derive(Debug, Clone, Default)]
pub struct DragState {
    pub is_dragging: bool,
}

fn to_point(p: Point) -> Point2<f64> {
    Point2::new(p.x as f64, p.y as f64)
}

/// Window position to canvas coordinates
fn relative(position: Point, bounds: Rectangle) -> Point2<f64> {
    Point2::new((position.x - bounds.x) as f64, (position.y - bounds.y) as f64)
}
