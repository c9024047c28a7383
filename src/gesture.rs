/// Gesture interpreter
///
/// Consumes one `InputEvent` at a time and turns it into pan/zoom/reset
/// calls on the active `CropEditor`. Events are handled strictly in order;
/// there is never more than one gesture being processed.
///
/// States:
/// - Idle
/// - Dragging: one pointer or one finger down
/// - Pinching: two or more fingers down (always wins over dragging)

use cgmath::{EuclideanSpace, MetricSpace, Point2};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::CropperConfig;
use crate::crop::CropEditor;

/// Raw input in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { at: Point2<f64>, time: Instant },
    PointerMove { at: Point2<f64> },
    PointerUp,
    TouchStart { id: u64, at: Point2<f64>, time: Instant },
    TouchMove { id: u64, at: Point2<f64> },
    TouchEnd { id: u64 },
    /// Browser-style delta: negative scrolls up (zoom in)
    Wheel { at: Point2<f64>, delta_y: f64 },
}

/// Knobs taken from the configuration
#[derive(Debug, Clone, Copy)]
pub struct GestureSettings {
    pub double_tap: Duration,
    pub wheel_zoom_in: f64,
    pub wheel_zoom_out: f64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self::from_config(&CropperConfig::default())
    }
}

impl GestureSettings {
    pub fn from_config(config: &CropperConfig) -> Self {
        Self {
            double_tap: Duration::from_millis(config.double_tap_ms),
            wheel_zoom_in: config.wheel_zoom_in,
            wheel_zoom_out: config.wheel_zoom_out,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Idle,
    Dragging {
        /// Finger driving the drag, `None` for the mouse
        touch: Option<u64>,
        last: Point2<f64>,
    },
    Pinching {
        pair: (u64, u64),
        last_distance: f64,
        last_mid: Point2<f64>,
    },
}

#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    settings: GestureSettings,
    phase: Phase,
    contacts: BTreeMap<u64, Point2<f64>>,
    last_tap: Option<Instant>,
}

impl GestureInterpreter {
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            settings,
            phase: Phase::Idle,
            contacts: BTreeMap::new(),
            last_tap: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Midpoint of the active pinch, for the on-canvas indicator
    pub fn pinch_center(&self) -> Option<Point2<f64>> {
        match self.phase {
            Phase::Pinching { last_mid, .. } => Some(last_mid),
            _ => None,
        }
    }

    /// Forget everything in flight (new slot loaded)
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
        self.contacts.clear();
        self.last_tap = None;
    }

    /// Apply one event. Returns true when the editor changed and needs a redraw.
    ///
    /// With no editor (image still decoding) state tracking continues but
    /// nothing is mutated.
    pub fn handle(&mut self, event: InputEvent, mut editor: Option<&mut CropEditor>) -> bool {
        match event {
            InputEvent::PointerDown { at, time } => {
                if matches!(self.phase, Phase::Pinching { .. }) {
                    return false;
                }
                let reset = self.register_tap(time) && reset_editor(editor.as_deref_mut());
                self.enter(Phase::Dragging { touch: None, last: at });
                reset
            }

            InputEvent::PointerMove { at } => match self.phase {
                Phase::Dragging { touch: None, last } => {
                    self.phase = Phase::Dragging { touch: None, last: at };
                    pan_editor(editor, at, last)
                }
                _ => false,
            },

            InputEvent::PointerUp => {
                if let Phase::Dragging { touch: None, .. } = self.phase {
                    self.enter(Phase::Idle);
                }
                false
            }

            InputEvent::TouchStart { id, at, time } => {
                self.contacts.insert(id, at);
                match self.contacts.len() {
                    1 => {
                        let reset = self.register_tap(time) && reset_editor(editor.as_deref_mut());
                        self.enter(Phase::Dragging { touch: Some(id), last: at });
                        reset
                    }
                    _ => {
                        if !matches!(self.phase, Phase::Pinching { .. }) {
                            self.start_pinch();
                        }
                        false
                    }
                }
            }

            InputEvent::TouchMove { id, at } => {
                if let Some(contact) = self.contacts.get_mut(&id) {
                    *contact = at;
                } else {
                    return false;
                }

                match self.phase {
                    Phase::Pinching { pair, last_distance, .. } if id == pair.0 || id == pair.1 => {
                        let Some((distance, mid)) = self.pair_geometry(pair) else {
                            return false;
                        };
                        self.phase = Phase::Pinching {
                            pair,
                            last_distance: distance,
                            last_mid: mid,
                        };
                        match editor {
                            Some(editor) if last_distance > 0.0 => {
                                editor.zoom_at(mid, distance / last_distance);
                                true
                            }
                            _ => false,
                        }
                    }
                    Phase::Dragging { touch: Some(finger), last } if finger == id => {
                        self.phase = Phase::Dragging { touch: Some(id), last: at };
                        pan_editor(editor, at, last)
                    }
                    _ => false,
                }
            }

            InputEvent::TouchEnd { id } => {
                self.contacts.remove(&id);
                match self.phase {
                    Phase::Pinching { .. } if self.contacts.len() >= 2 => self.start_pinch(),
                    Phase::Pinching { .. } => self.enter(Phase::Idle),
                    Phase::Dragging { touch: Some(finger), .. } if finger == id => self.enter(Phase::Idle),
                    _ => {}
                }
                false
            }

            InputEvent::Wheel { at, delta_y } => {
                let factor = if delta_y < 0.0 {
                    self.settings.wheel_zoom_in
                } else if delta_y > 0.0 {
                    self.settings.wheel_zoom_out
                } else {
                    return false;
                };
                match editor {
                    Some(editor) => {
                        editor.zoom_at(at, factor);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// True when this tap completes a double tap
    fn register_tap(&mut self, time: Instant) -> bool {
        match self.last_tap {
            Some(previous) if time.duration_since(previous) < self.settings.double_tap => {
                self.last_tap = None;
                true
            }
            _ => {
                self.last_tap = Some(time);
                false
            }
        }
    }

    /// Pinch on the two lowest finger ids
    fn start_pinch(&mut self) {
        let mut ids = self.contacts.keys().copied();
        let (Some(a), Some(b)) = (ids.next(), ids.next()) else {
            return;
        };
        if let Some((distance, mid)) = self.pair_geometry((a, b)) {
            self.enter(Phase::Pinching {
                pair: (a, b),
                last_distance: distance,
                last_mid: mid,
            });
        }
    }

    fn pair_geometry(&self, pair: (u64, u64)) -> Option<(f64, Point2<f64>)> {
        let a = *self.contacts.get(&pair.0)?;
        let b = *self.contacts.get(&pair.1)?;
        Some((a.distance(b), a.midpoint(b)))
    }

    fn enter(&mut self, phase: Phase) {
        if std::mem::discriminant(&self.phase) != std::mem::discriminant(&phase) {
            debug!(from = ?self.phase, to = ?phase, "gesture phase");
        }
        self.phase = phase;
    }
}

fn reset_editor(editor: Option<&mut CropEditor>) -> bool {
    match editor {
        Some(editor) => {
            editor.reset();
            true
        }
        None => false,
    }
}

fn pan_editor(editor: Option<&mut CropEditor>, at: Point2<f64>, last: Point2<f64>) -> bool {
    match editor {
        Some(editor) => {
            editor.pan(at - last);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::{CropFrame, ImageDims, SlotKind, Viewport};

    fn editor() -> CropEditor {
        let frame = CropFrame::compute(Viewport::new(1000.0, 700.0), SlotKind::Content);
        CropEditor::new(frame, ImageDims::new(3000, 2000), 5.0)
    }

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test]
    fn test_mouse_drag_pans() {
        let mut gestures = GestureInterpreter::new(GestureSettings::default());
        let mut editor = editor();
        let start = editor.transform().x;
        let t0 = Instant::now();

        gestures.handle(InputEvent::PointerDown { at: p(500.0, 300.0), time: t0 }, Some(&mut editor));
        assert!(gestures.handle(InputEvent::PointerMove { at: p(480.0, 300.0) }, Some(&mut editor)));
        assert!((editor.transform().x - (start - 20.0)).abs() < 1e-9);

        gestures.handle(InputEvent::PointerUp, Some(&mut editor));
        assert_eq!(gestures.phase(), Phase::Idle);
        assert!(!gestures.handle(InputEvent::PointerMove { at: p(100.0, 100.0) }, Some(&mut editor)));
        assert!((editor.transform().x - (start - 20.0)).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_is_asymmetric() {
        let mut gestures = GestureInterpreter::new(GestureSettings::default());
        let mut editor = editor();
        let base = editor.transform().scale;

        gestures.handle(InputEvent::Wheel { at: p(500.0, 350.0), delta_y: -120.0 }, Some(&mut editor));
        assert!((editor.transform().scale - base * 1.1).abs() < 1e-9);

        gestures.handle(InputEvent::Wheel { at: p(500.0, 350.0), delta_y: 120.0 }, Some(&mut editor));
        assert!((editor.transform().scale - (base * 1.1 * 0.9).max(base)).abs() < 1e-9);

        assert!(!gestures.handle(InputEvent::Wheel { at: p(0.0, 0.0), delta_y: 0.0 }, Some(&mut editor)));
    }

    #[test]
    fn test_double_click_resets() {
        let mut gestures = GestureInterpreter::new(GestureSettings::default());
        let mut editor = editor();
        let fresh = editor.transform().clone();
        let t0 = Instant::now();

        gestures.handle(InputEvent::Wheel { at: p(300.0, 300.0), delta_y: -1.0 }, Some(&mut editor));
        assert_ne!(editor.transform(), &fresh);

        gestures.handle(InputEvent::PointerDown { at: p(10.0, 10.0), time: t0 }, Some(&mut editor));
        gestures.handle(InputEvent::PointerUp, Some(&mut editor));
        let reset = gestures.handle(
            InputEvent::PointerDown { at: p(10.0, 10.0), time: t0 + Duration::from_millis(200) },
            Some(&mut editor),
        );

        assert!(reset);
        assert_eq!(editor.transform(), &fresh);
    }

    #[test]
    fn test_slow_clicks_do_not_reset() {
        let mut gestures = GestureInterpreter::new(GestureSettings::default());
        let mut editor = editor();
        let t0 = Instant::now();

        gestures.handle(InputEvent::Wheel { at: p(300.0, 300.0), delta_y: -1.0 }, Some(&mut editor));
        let zoomed = editor.transform().clone();

        gestures.handle(InputEvent::PointerDown { at: p(10.0, 10.0), time: t0 }, Some(&mut editor));
        gestures.handle(InputEvent::PointerUp, Some(&mut editor));
        gestures.handle(
            InputEvent::PointerDown { at: p(10.0, 10.0), time: t0 + Duration::from_millis(450) },
            Some(&mut editor),
        );

        assert_eq!(editor.transform(), &zoomed);
    }

    #[test]
    fn test_pinch_zooms_around_midpoint() {
        let mut gestures = GestureInterpreter::new(GestureSettings::default());
        let mut editor = editor();
        let base = editor.transform().scale;
        let t0 = Instant::now();

        gestures.handle(InputEvent::TouchStart { id: 1, at: p(400.0, 350.0), time: t0 }, Some(&mut editor));
        gestures.handle(
            InputEvent::TouchStart { id: 2, at: p(600.0, 350.0), time: t0 + Duration::from_millis(20) },
            Some(&mut editor),
        );
        assert!(matches!(gestures.phase(), Phase::Pinching { pair: (1, 2), .. }));
        // Second finger landing quickly is not a double tap
        assert!((editor.transform().scale - base).abs() < 1e-9);

        // Spread from 200px to 300px apart: factor 1.5
        gestures.handle(InputEvent::TouchMove { id: 2, at: p(700.0, 350.0) }, Some(&mut editor));
        assert!((editor.transform().scale - base * 1.5).abs() < 1e-9);

        gestures.handle(InputEvent::TouchEnd { id: 2 }, Some(&mut editor));
        assert_eq!(gestures.phase(), Phase::Idle);

        // Remaining finger does not resume dragging
        let before = editor.transform().clone();
        gestures.handle(InputEvent::TouchMove { id: 1, at: p(300.0, 300.0) }, Some(&mut editor));
        assert_eq!(editor.transform(), &before);
    }

    #[test]
    fn test_pointer_down_ignored_while_pinching() {
        let mut gestures = GestureInterpreter::new(GestureSettings::default());
        let mut editor = editor();
        let t0 = Instant::now();

        gestures.handle(InputEvent::TouchStart { id: 7, at: p(400.0, 350.0), time: t0 }, Some(&mut editor));
        gestures.handle(InputEvent::TouchStart { id: 9, at: p(500.0, 350.0), time: t0 }, Some(&mut editor));
        gestures.handle(InputEvent::PointerDown { at: p(10.0, 10.0), time: t0 }, Some(&mut editor));

        assert!(matches!(gestures.phase(), Phase::Pinching { .. }));
    }

    #[test]
    fn test_one_finger_drag() {
        let mut gestures = GestureInterpreter::new(GestureSettings::default());
        let mut editor = editor();
        let x = editor.transform().x;
        let t0 = Instant::now();

        gestures.handle(InputEvent::TouchStart { id: 3, at: p(500.0, 300.0), time: t0 }, Some(&mut editor));
        gestures.handle(InputEvent::TouchMove { id: 3, at: p(490.0, 300.0) }, Some(&mut editor));
        assert!((editor.transform().x - (x - 10.0)).abs() < 1e-9);

        gestures.handle(InputEvent::TouchEnd { id: 3 }, Some(&mut editor));
        assert_eq!(gestures.phase(), Phase::Idle);
    }

    #[test]
    fn test_events_without_editor_are_noops() {
        let mut gestures = GestureInterpreter::new(GestureSettings::default());
        let t0 = Instant::now();

        assert!(!gestures.handle(InputEvent::PointerDown { at: p(1.0, 1.0), time: t0 }, None));
        assert!(!gestures.handle(InputEvent::PointerMove { at: p(5.0, 1.0) }, None));
        assert!(!gestures.handle(InputEvent::Wheel { at: p(1.0, 1.0), delta_y: -3.0 }, None));
        gestures.handle(InputEvent::PointerUp, None);
        assert_eq!(gestures.phase(), Phase::Idle);
    }
}
