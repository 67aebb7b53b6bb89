mod framebuffer;

pub use framebuffer::FrameBuffer;

use crate::app::entity::{Rect, TickContext};
use crate::assets::ImageData;

/// Default vertical distance between lines in `draw_text`.
pub const DEFAULT_LINE_ADVANCE: f32 = 50.0;

/// Drawable target. The engine core only knows this trait; the demo backs
/// it with a software framebuffer presented through `pixels`.
pub trait Surface {
    fn width(&self) -> f32;

    fn height(&self) -> f32;

    fn clear(&mut self);

    /// Copies `src` (image coordinates) into `dst` (surface coordinates),
    /// scaling as needed.
    fn draw_image(&mut self, image: &ImageData, src: Rect, dst: Rect);

    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: [u8; 4],
    pub size: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: [0, 0, 0, 255],
            size: 12.0,
        }
    }
}

/// Multi-line text: splits on `\n` and advances a fixed amount per line.
pub fn draw_text(
    surface: &mut dyn Surface,
    text: &str,
    x: f32,
    y: f32,
    style: &TextStyle,
    line_advance: Option<f32>,
) {
    let advance = line_advance.unwrap_or(DEFAULT_LINE_ADVANCE);
    let mut line_y = y;
    for line in text.split('\n') {
        surface.fill_text(line, x, line_y, style);
        line_y += advance;
    }
}

/// Blits a named image at the pointer position, centered on the image by
/// default or shifted by a caller-supplied anchor. Unready image: no-op.
pub fn draw_pointer_sprite(tick: &mut TickContext<'_>, name: &str, anchor: Option<(f32, f32)>) {
    if let Some(image) = tick.images.get(name) {
        let width = image.width as f32;
        let height = image.height as f32;
        let (anchor_x, anchor_y) = anchor.unwrap_or((width / 2.0, height / 2.0));
        let src = Rect::new(0.0, 0.0, width, height);
        let dst = Rect::new(
            tick.pointer.x - anchor_x,
            tick.pointer.y - anchor_y,
            width,
            height,
        );
        tick.surface.draw_image(image, src, dst);
    }
}
