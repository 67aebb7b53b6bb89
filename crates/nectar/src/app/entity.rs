use crate::app::input::PointerSnapshot;
use crate::app::rendering::Surface;
use crate::assets::ImageStore;
use crate::audio::AudioContext;

/// Axis-aligned box, position plus extent, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open containment: the left/top edges are inside, the
    /// right/bottom edges are not.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

/// Everything an entity may touch during one tick. Borrowed fresh per tick;
/// nothing here outlives the tick.
pub struct TickContext<'a> {
    pub surface: &'a mut dyn Surface,
    pub pointer: PointerSnapshot,
    pub images: &'a ImageStore,
    pub audio: &'a mut AudioContext,
}

impl TickContext<'_> {
    pub fn canvas_width(&self) -> f32 {
        self.surface.width()
    }

    pub fn canvas_height(&self) -> f32 {
        self.surface.height()
    }
}

/// A stateful participant in the frame loop. `step` renders from the state
/// the tick started with and only then mutates it; overriding `step` must
/// preserve that draw-before-change order.
pub trait Entity {
    fn rect(&self) -> Rect;

    fn draw(&mut self, _tick: &mut TickContext<'_>) {}

    fn change(&mut self, _tick: &mut TickContext<'_>) {}

    fn step(&mut self, tick: &mut TickContext<'_>) {
        self.draw(tick);
        self.change(tick);
    }

    /// True once the box has fully left the surface on some axis. An entity
    /// flush against an edge is still in bounds.
    fn is_out_of_bounds(&self, tick: &TickContext<'_>) -> bool {
        let r = self.rect();
        r.x + r.width > tick.surface.width()
            || r.x < -r.width
            || r.y + r.height > tick.surface.height()
            || r.y < -r.height
    }

    fn is_hover(&self, tick: &TickContext<'_>) -> bool {
        self.rect().contains(tick.pointer.x, tick.pointer.y)
    }

    fn is_clicked(&self, tick: &TickContext<'_>) -> bool {
        tick.pointer.click && self.is_hover(tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::rendering::FrameBuffer;

    struct Block {
        rect: Rect,
    }

    impl Entity for Block {
        fn rect(&self) -> Rect {
            self.rect
        }
    }

    fn block(x: f32, y: f32, width: f32, height: f32) -> Block {
        Block {
            rect: Rect::new(x, y, width, height),
        }
    }

    fn with_tick<R>(pointer: PointerSnapshot, body: impl FnOnce(&mut TickContext<'_>) -> R) -> R {
        let mut surface = FrameBuffer::new(100, 80);
        let images = ImageStore::default();
        let mut audio = AudioContext::disabled();
        let mut tick = TickContext {
            surface: &mut surface,
            pointer,
            images: &images,
            audio: &mut audio,
        };
        body(&mut tick)
    }

    #[test]
    fn draw_runs_before_change() {
        struct Ordered {
            log: Vec<&'static str>,
        }
        impl Entity for Ordered {
            fn rect(&self) -> Rect {
                Rect::ZERO
            }
            fn draw(&mut self, _tick: &mut TickContext<'_>) {
                self.log.push("draw");
            }
            fn change(&mut self, _tick: &mut TickContext<'_>) {
                self.log.push("change");
            }
        }
        let mut entity = Ordered { log: Vec::new() };
        with_tick(PointerSnapshot::default(), |tick| entity.step(tick));
        assert_eq!(entity.log, ["draw", "change"]);
    }

    #[test]
    fn boundary_exact_fit_is_in_bounds() {
        let b = block(0.0, 0.0, 100.0, 80.0);
        let oob = with_tick(PointerSnapshot::default(), |tick| b.is_out_of_bounds(tick));
        assert!(!oob);
    }

    #[test]
    fn one_past_right_edge_is_out_of_bounds() {
        let b = block(91.0, 0.0, 10.0, 10.0);
        let oob = with_tick(PointerSnapshot::default(), |tick| b.is_out_of_bounds(tick));
        assert!(oob);
    }

    #[test]
    fn fully_left_of_surface_is_out_of_bounds() {
        let at_edge = block(-10.0, 0.0, 10.0, 10.0);
        let past_edge = block(-10.1, 0.0, 10.0, 10.0);
        with_tick(PointerSnapshot::default(), |tick| {
            assert!(!at_edge.is_out_of_bounds(tick));
            assert!(past_edge.is_out_of_bounds(tick));
        });
    }

    #[test]
    fn hover_is_half_open() {
        let b = block(10.0, 10.0, 20.0, 20.0);
        let inside = PointerSnapshot {
            x: 10.0,
            y: 10.0,
            ..PointerSnapshot::default()
        };
        let on_far_edge = PointerSnapshot {
            x: 30.0,
            y: 15.0,
            ..PointerSnapshot::default()
        };
        with_tick(inside, |tick| assert!(b.is_hover(tick)));
        with_tick(on_far_edge, |tick| assert!(!b.is_hover(tick)));
    }

    #[test]
    fn clicked_requires_latch_and_hover() {
        let b = block(0.0, 0.0, 50.0, 50.0);
        let hover_no_click = PointerSnapshot {
            x: 25.0,
            y: 25.0,
            click: false,
            is_down: true,
        };
        let hover_click = PointerSnapshot {
            x: 25.0,
            y: 25.0,
            click: true,
            is_down: true,
        };
        let away_click = PointerSnapshot {
            x: 60.0,
            y: 25.0,
            click: true,
            is_down: true,
        };
        with_tick(hover_no_click, |tick| assert!(!b.is_clicked(tick)));
        with_tick(hover_click, |tick| assert!(b.is_clicked(tick)));
        with_tick(away_click, |tick| assert!(!b.is_clicked(tick)));
    }
}
