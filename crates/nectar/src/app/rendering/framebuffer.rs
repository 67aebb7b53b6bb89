use crate::app::entity::Rect;
use crate::assets::ImageData;

use super::{Surface, TextStyle};

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: i32 = 5;
const DEFAULT_CLEAR_COLOR: [u8; 4] = [0, 0, 0, 255];

/// Software RGBA8 render target. The demo hands the finished frame to
/// `pixels`; tests read it back directly.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    clear_color: [u8; 4],
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let mut buffer = Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
            clear_color: DEFAULT_CLEAR_COLOR,
        };
        buffer.clear();
        buffer
    }

    pub fn set_clear_color(&mut self, color: [u8; 4]) {
        self.clear_color = color;
    }

    pub fn frame(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y * self.width + x) * 4) as usize;
        let mut color = [0; 4];
        color.copy_from_slice(&self.pixels[offset..offset + 4]);
        Some(color)
    }

    fn write_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        // Fully transparent source pixels leave the target untouched.
        if color[3] == 0 {
            return;
        }
        let offset = ((y as usize) * (self.width as usize) + x as usize) * 4;
        self.pixels[offset..offset + 4].copy_from_slice(&color);
    }

    fn draw_glyph(&mut self, glyph: [u8; 5], x: i32, y: i32, scale: i32, color: [u8; 4]) {
        for (row_index, row_bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if (row_bits & (1 << (GLYPH_WIDTH - 1 - col))) == 0 {
                    continue;
                }
                let base_x = x + col * scale;
                let base_y = y + row_index as i32 * scale;
                for sy in 0..scale {
                    for sx in 0..scale {
                        self.write_pixel(base_x + sx, base_y + sy, color);
                    }
                }
            }
        }
    }
}

impl Surface for FrameBuffer {
    fn width(&self) -> f32 {
        self.width as f32
    }

    fn height(&self) -> f32 {
        self.height as f32
    }

    fn clear(&mut self) {
        for pixel in self.pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&self.clear_color);
        }
    }

    fn draw_image(&mut self, image: &ImageData, src: Rect, dst: Rect) {
        if image.width == 0 || image.height == 0 {
            return;
        }
        if src.width <= 0.0 || src.height <= 0.0 || dst.width <= 0.0 || dst.height <= 0.0 {
            return;
        }

        let dst_x = dst.x.round() as i32;
        let dst_y = dst.y.round() as i32;
        let dst_w = dst.width.round().max(1.0) as i32;
        let dst_h = dst.height.round().max(1.0) as i32;

        for py in 0..dst_h {
            for px in 0..dst_w {
                // Nearest sampling from the source rectangle.
                let sx = src.x + (px as f32 + 0.5) / dst_w as f32 * src.width;
                let sy = src.y + (py as f32 + 0.5) / dst_h as f32 * src.height;
                let sx = (sx.floor() as i64).clamp(0, image.width as i64 - 1) as usize;
                let sy = (sy.floor() as i64).clamp(0, image.height as i64 - 1) as usize;
                let offset = (sy * image.width as usize + sx) * 4;
                let Some(texel) = image.rgba.get(offset..offset + 4) else {
                    continue;
                };
                let color = [texel[0], texel[1], texel[2], texel[3]];
                self.write_pixel(dst_x + px, dst_y + py, color);
            }
        }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) {
        let scale = ((style.size / GLYPH_HEIGHT as f32).round() as i32).max(1);
        let advance = (GLYPH_WIDTH + 1) * scale;
        let mut pen_x = x.round() as i32;
        let pen_y = y.round() as i32;
        for ch in text.chars() {
            self.draw_glyph(glyph_for(ch), pen_x, pen_y, scale, style.color);
            pen_x += advance;
        }
    }
}

/// Compact 3x5 bitmap for ASCII; anything unmapped renders as a block so
/// missing glyphs are visible rather than silent.
fn glyph_for(ch: char) -> [u8; 5] {
    match ch.to_ascii_uppercase() {
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b011, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b101, 0b111, 0b111, 0b111, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b110, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '?' => [0b110, 0b001, 0b010, 0b000, 0b010],
        _ => [0b111, 0b111, 0b111, 0b111, 0b111],
    }
}
