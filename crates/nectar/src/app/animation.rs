use super::entity::{Entity, Rect, TickContext};

/// Frame-advance state machine over a sprite sheet laid out row-major.
/// Offsets move in whole-frame steps; `advance` is called once per step,
/// after the current frame has been drawn.
#[derive(Debug, Clone)]
pub struct FrameCursor {
    pub frame_width: f32,
    pub frame_height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub repeat: bool,
    finished: bool,
}

impl FrameCursor {
    pub fn new(frame_width: f32, frame_height: f32, repeat: bool) -> Self {
        Self {
            frame_width,
            frame_height,
            offset_x: 0.0,
            offset_y: 0.0,
            repeat,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// One frame forward: across the row, wrap to the next row at the sheet
    /// edge, and at the last row either loop to the top or mark finished.
    /// A finished cursor keeps drifting; the render side clamps.
    pub fn advance(&mut self, sheet_width: f32, sheet_height: f32) {
        self.offset_x += self.frame_width;
        if self.offset_x >= sheet_width {
            self.offset_x = 0.0;
            self.offset_y += self.frame_height;
        }
        if self.offset_y >= sheet_height {
            if self.repeat {
                self.offset_y = 0.0;
            } else {
                self.finished = true;
            }
        }
    }

    /// Source rectangle for the current frame, clamped inside the sheet so
    /// a drifted cursor never reads out of range.
    pub fn src_rect(&self, sheet_width: f32, sheet_height: f32) -> Rect {
        let max_x = (sheet_width - self.frame_width).max(0.0);
        let max_y = (sheet_height - self.frame_height).max(0.0);
        Rect::new(
            self.offset_x.clamp(0.0, max_x),
            self.offset_y.clamp(0.0, max_y),
            self.frame_width,
            self.frame_height,
        )
    }
}

/// Sprite-sheet entity: draws its current frame at its position, then
/// advances the cursor. Richer entities hold one of these and delegate.
pub struct Animated {
    pub x: f32,
    pub y: f32,
    image: String,
    cursor: FrameCursor,
}

impl Animated {
    pub fn new(
        image: impl Into<String>,
        x: f32,
        y: f32,
        frame_width: f32,
        frame_height: f32,
        repeat: bool,
    ) -> Self {
        Self {
            x,
            y,
            image: image.into(),
            cursor: FrameCursor::new(frame_width, frame_height, repeat),
        }
    }

    pub fn cursor(&self) -> &FrameCursor {
        &self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor.finished
    }

    /// Blits the current frame. Missing or unready image is a no-op.
    pub fn draw_frame(&self, tick: &mut TickContext<'_>) {
        if let Some(sheet) = tick.images.get(&self.image) {
            let src = self
                .cursor
                .src_rect(sheet.width as f32, sheet.height as f32);
            let dst = Rect::new(self.x, self.y, self.cursor.frame_width, self.cursor.frame_height);
            tick.surface.draw_image(sheet, src, dst);
        }
    }
}

impl Entity for Animated {
    fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.cursor.frame_width, self.cursor.frame_height)
    }

    fn step(&mut self, tick: &mut TickContext<'_>) {
        self.draw_frame(tick);
        if let Some(sheet) = tick.images.get(&self.image) {
            self.cursor.advance(sheet.width as f32, sheet.height as f32);
        }
        self.draw(tick);
        self.change(tick);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::input::PointerSnapshot;
    use crate::app::rendering::{Surface, TextStyle};
    use crate::assets::{ImageData, ImageStore};
    use crate::audio::AudioContext;

    const SHEET_W: f32 = 96.0; // 3 frames of 32 across
    const SHEET_H: f32 = 32.0; // 2 rows of 16

    fn cursor(repeat: bool) -> FrameCursor {
        FrameCursor::new(32.0, 16.0, repeat)
    }

    #[test]
    fn advances_across_the_row_then_wraps() {
        let mut c = cursor(true);
        c.advance(SHEET_W, SHEET_H);
        assert_eq!((c.offset_x, c.offset_y), (32.0, 0.0));
        c.advance(SHEET_W, SHEET_H);
        assert_eq!((c.offset_x, c.offset_y), (64.0, 0.0));
        c.advance(SHEET_W, SHEET_H);
        assert_eq!((c.offset_x, c.offset_y), (0.0, 16.0));
    }

    #[test]
    fn non_repeating_three_by_two_finishes_after_six_steps() {
        let mut c = cursor(false);
        for _ in 0..5 {
            c.advance(SHEET_W, SHEET_H);
            assert!(!c.is_finished());
        }
        c.advance(SHEET_W, SHEET_H);
        assert!(c.is_finished());
    }

    #[test]
    fn repeating_three_by_two_is_back_at_origin_after_six_steps() {
        let mut c = cursor(true);
        for _ in 0..6 {
            c.advance(SHEET_W, SHEET_H);
        }
        assert!(!c.is_finished());
        assert_eq!((c.offset_x, c.offset_y), (0.0, 0.0));
    }

    #[test]
    fn finished_cursor_drifts_but_src_rect_stays_in_sheet() {
        let mut c = cursor(false);
        for _ in 0..10 {
            c.advance(SHEET_W, SHEET_H);
        }
        assert!(c.is_finished());
        assert!(c.offset_y >= SHEET_H);
        let src = c.src_rect(SHEET_W, SHEET_H);
        assert!(src.x + src.width <= SHEET_W);
        assert!(src.y + src.height <= SHEET_H);
    }

    /// Records blit calls instead of rasterizing.
    #[derive(Default)]
    struct RecordingSurface {
        blits: Vec<(Rect, Rect)>,
    }

    impl Surface for RecordingSurface {
        fn width(&self) -> f32 {
            64.0
        }
        fn height(&self) -> f32 {
            64.0
        }
        fn clear(&mut self) {}
        fn draw_image(&mut self, _image: &ImageData, src: Rect, dst: Rect) {
            self.blits.push((src, dst));
        }
        fn fill_text(&mut self, _text: &str, _x: f32, _y: f32, _style: &TextStyle) {}
    }

    fn sheet_store() -> ImageStore {
        // 3x2 sheet of 1x1 frames.
        let mut images = ImageStore::new();
        images.insert(
            "sheet",
            ImageData {
                width: 3,
                height: 2,
                rgba: vec![255; 3 * 2 * 4],
            },
        );
        images
    }

    fn step_times(sprite: &mut Animated, images: &ImageStore, times: usize) -> RecordingSurface {
        let mut surface = RecordingSurface::default();
        let mut audio = AudioContext::disabled();
        let mut tick = TickContext {
            surface: &mut surface,
            pointer: PointerSnapshot::default(),
            images,
            audio: &mut audio,
        };
        for _ in 0..times {
            sprite.step(&mut tick);
        }
        surface
    }

    #[test]
    fn step_blits_the_frame_as_of_the_start_of_the_tick() {
        let images = sheet_store();
        let mut sprite = Animated::new("sheet", 10.0, 20.0, 1.0, 1.0, false);
        let surface = step_times(&mut sprite, &images, 2);

        // First step draws frame (0,0); the advance only shows up in the
        // second step's source rectangle.
        assert_eq!(surface.blits.len(), 2);
        assert_eq!(surface.blits[0].0, Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(surface.blits[0].1, Rect::new(10.0, 20.0, 1.0, 1.0));
        assert_eq!(surface.blits[1].0, Rect::new(1.0, 0.0, 1.0, 1.0));
        let cursor = sprite.cursor();
        assert_eq!((cursor.offset_x, cursor.offset_y), (2.0, 0.0));
    }

    #[test]
    fn step_with_unready_image_draws_nothing_and_holds_frame_zero() {
        let images = ImageStore::new();
        let mut sprite = Animated::new("sheet", 0.0, 0.0, 1.0, 1.0, false);
        let surface = step_times(&mut sprite, &images, 3);

        assert!(surface.blits.is_empty());
        let cursor = sprite.cursor();
        assert_eq!((cursor.offset_x, cursor.offset_y), (0.0, 0.0));
        assert!(!sprite.is_finished());
    }

    #[test]
    fn offsets_stay_frame_aligned_while_running() {
        let mut c = cursor(true);
        for _ in 0..13 {
            c.advance(SHEET_W, SHEET_H);
            assert_eq!(c.offset_x % 32.0, 0.0);
            assert!(c.offset_x < SHEET_W);
            assert_eq!(c.offset_y % 16.0, 0.0);
            assert!(c.offset_y < SHEET_H);
        }
    }
}
