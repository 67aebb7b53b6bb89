pub mod animation;
pub mod collection;
pub mod entity;
pub mod input;
pub mod loop_runner;
pub mod rendering;

pub use animation::{Animated, FrameCursor};
pub use collection::{Collection, CollectionError};
pub use entity::{Entity, Rect, TickContext};
pub use input::{InputEvent, PointerSnapshot, PointerState, ScaleRatio};
pub use loop_runner::{CollectionRegistry, Engine, LoopConfig};
pub use rendering::{
    draw_pointer_sprite, draw_text, FrameBuffer, Surface, TextStyle, DEFAULT_LINE_ADVANCE,
};
