//! A small fixed-tick frame-loop engine for 2D canvas-style applications:
//! ordered entity collections with automatic expiry, sprite-sheet
//! animation, pointer normalization under display scaling, and name-keyed
//! image and sound tables. Presentation is behind the [`Surface`] trait;
//! window and event wiring stay with the embedder.

pub mod app;
pub mod assets;
pub mod audio;

pub use app::{
    draw_pointer_sprite, draw_text, Animated, Collection, CollectionError, CollectionRegistry,
    Engine, Entity, FrameBuffer, FrameCursor, InputEvent, LoopConfig, PointerSnapshot,
    PointerState, Rect, ScaleRatio, Surface, TextStyle, TickContext, DEFAULT_LINE_ADVANCE,
};
pub use assets::{AssetError, AssetManifest, ImageData, ImageStore};
pub use audio::AudioContext;
