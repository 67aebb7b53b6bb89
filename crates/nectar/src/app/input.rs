use tracing::warn;

/// Normalized input stream consumed by the engine. The embedder translates
/// whatever windowing events it receives into these before handing them over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Raw pointer position in viewport pixels, not yet scale-corrected.
    PointerMoved { x: f32, y: f32 },
    PointerPressed,
    PointerReleased,
    /// The presentation surface now covers a viewport of this size.
    FullscreenEntered {
        viewport_width: f32,
        viewport_height: f32,
    },
    FullscreenExited,
}

/// Per-axis divisor applied to raw pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRatio {
    pub x: f32,
    pub y: f32,
}

impl ScaleRatio {
    pub const IDENTITY: Self = Self { x: 1.0, y: 1.0 };
}

impl Default for ScaleRatio {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Live pointer state. `click` is an edge latch: set on press, cleared only
/// at the end of a tick by the scheduler, never by release.
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    x: f32,
    y: f32,
    click: bool,
    is_down: bool,
    ratio: ScaleRatio,
}

impl PointerState {
    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn click(&self) -> bool {
        self.click
    }

    pub fn is_down(&self) -> bool {
        self.is_down
    }

    pub fn ratio(&self) -> ScaleRatio {
        self.ratio
    }

    pub fn apply(&mut self, event: InputEvent, canvas_width: f32, canvas_height: f32) {
        match event {
            InputEvent::PointerMoved { x, y } => {
                self.x = x / self.ratio.x;
                self.y = y / self.ratio.y;
            }
            InputEvent::PointerPressed => {
                self.click = true;
                self.is_down = true;
            }
            InputEvent::PointerReleased => {
                self.is_down = false;
            }
            InputEvent::FullscreenEntered {
                viewport_width,
                viewport_height,
            } => {
                self.ratio = fullscreen_ratio(
                    viewport_width,
                    viewport_height,
                    canvas_width,
                    canvas_height,
                );
            }
            InputEvent::FullscreenExited => {
                self.ratio = ScaleRatio::IDENTITY;
            }
        }
    }

    /// Scheduler hook: drops the click latch after the tick's reads are done.
    pub(crate) fn end_tick(&mut self) {
        self.click = false;
    }

    pub fn snapshot(&self) -> PointerSnapshot {
        PointerSnapshot {
            x: self.x,
            y: self.y,
            click: self.click,
            is_down: self.is_down,
        }
    }
}

/// Immutable pointer view handed to entities for a single tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerSnapshot {
    pub x: f32,
    pub y: f32,
    pub click: bool,
    pub is_down: bool,
}

fn fullscreen_ratio(
    viewport_width: f32,
    viewport_height: f32,
    canvas_width: f32,
    canvas_height: f32,
) -> ScaleRatio {
    if viewport_width <= 0.0
        || viewport_height <= 0.0
        || canvas_width <= 0.0
        || canvas_height <= 0.0
        || !viewport_width.is_finite()
        || !viewport_height.is_finite()
    {
        warn!(
            viewport_width,
            viewport_height, canvas_width, canvas_height, "fullscreen_ratio_degenerate"
        );
        return ScaleRatio::IDENTITY;
    }
    ScaleRatio {
        x: viewport_width / canvas_width,
        y: viewport_height / canvas_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS_W: f32 = 800.0;
    const CANVAS_H: f32 = 600.0;

    fn apply(state: &mut PointerState, event: InputEvent) {
        state.apply(event, CANVAS_W, CANVAS_H);
    }

    #[test]
    fn moves_pass_through_at_identity_ratio() {
        let mut pointer = PointerState::default();
        apply(&mut pointer, InputEvent::PointerMoved { x: 120.0, y: 45.0 });
        assert_eq!(pointer.x(), 120.0);
        assert_eq!(pointer.y(), 45.0);
    }

    #[test]
    fn fullscreen_scales_subsequent_moves() {
        let mut pointer = PointerState::default();
        apply(
            &mut pointer,
            InputEvent::FullscreenEntered {
                viewport_width: 1600.0,
                viewport_height: 1200.0,
            },
        );
        apply(&mut pointer, InputEvent::PointerMoved { x: 800.0, y: 600.0 });
        assert_eq!(pointer.x(), 400.0);
        assert_eq!(pointer.y(), 300.0);
    }

    #[test]
    fn fullscreen_round_trip_restores_identity() {
        let mut pointer = PointerState::default();
        apply(
            &mut pointer,
            InputEvent::FullscreenEntered {
                viewport_width: 1920.0,
                viewport_height: 1080.0,
            },
        );
        apply(&mut pointer, InputEvent::FullscreenExited);
        assert_eq!(pointer.ratio(), ScaleRatio::IDENTITY);
    }

    #[test]
    fn degenerate_viewport_degrades_to_identity() {
        let mut pointer = PointerState::default();
        apply(
            &mut pointer,
            InputEvent::FullscreenEntered {
                viewport_width: 0.0,
                viewport_height: 1080.0,
            },
        );
        assert_eq!(pointer.ratio(), ScaleRatio::IDENTITY);
    }

    #[test]
    fn click_latch_survives_release_within_tick() {
        let mut pointer = PointerState::default();
        apply(&mut pointer, InputEvent::PointerPressed);
        apply(&mut pointer, InputEvent::PointerReleased);
        assert!(pointer.click());
        assert!(!pointer.is_down());
    }

    #[test]
    fn end_tick_clears_click_but_not_is_down() {
        let mut pointer = PointerState::default();
        apply(&mut pointer, InputEvent::PointerPressed);
        pointer.end_tick();
        assert!(!pointer.click());
        assert!(pointer.is_down());
    }
}
