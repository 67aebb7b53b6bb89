use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::assets::{AssetManifest, ImageStore};
use crate::audio::AudioContext;

use super::collection::Collection;
use super::entity::{Entity, TickContext};
use super::input::{InputEvent, PointerState};
use super::rendering::Surface;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub tick_period: Duration,
    pub autoclear: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800,
            canvas_height: 600,
            tick_period: Duration::from_millis(30),
            autoclear: true,
        }
    }
}

/// Collections in registration order. Re-registering a name swaps the
/// instance but keeps its position, so step order never silently changes.
#[derive(Default)]
pub struct CollectionRegistry {
    entries: Vec<(String, Collection)>,
}

impl CollectionRegistry {
    pub fn install(&mut self, name: impl Into<String>, collection: Collection) {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(key, _)| *key == name) {
            debug!(name = name.as_str(), "collection_replaced");
            slot.1 = collection;
        } else {
            self.entries.push((name, collection));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Collection> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, collection)| collection)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Collection> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, collection)| collection)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The engine context: pointer state, asset tables, and the collection
/// registry, threaded explicitly through every call. One tick runs to
/// completion before the next begins.
pub struct Engine {
    config: LoopConfig,
    pointer: PointerState,
    images: ImageStore,
    audio: AudioContext,
    collections: CollectionRegistry,
    tick_count: u64,
}

impl Engine {
    pub fn new(config: LoopConfig) -> Self {
        Self::with_audio(config, AudioContext::new())
    }

    /// For tests and headless embedders that must never probe audio
    /// hardware.
    pub fn with_audio(config: LoopConfig, audio: AudioContext) -> Self {
        info!(
            canvas_width = config.canvas_width,
            canvas_height = config.canvas_height,
            tick_period_ms = config.tick_period.as_millis() as u64,
            autoclear = config.autoclear,
            "engine_created"
        );
        Self {
            config,
            pointer: PointerState::default(),
            images: ImageStore::new(),
            audio,
            collections: CollectionRegistry::default(),
            tick_count: 0,
        }
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn images_mut(&mut self) -> &mut ImageStore {
        &mut self.images
    }

    pub fn audio_mut(&mut self) -> &mut AudioContext {
        &mut self.audio
    }

    pub fn collections(&self) -> &CollectionRegistry {
        &self.collections
    }

    pub fn collections_mut(&mut self) -> &mut CollectionRegistry {
        &mut self.collections
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn install_collection(&mut self, name: impl Into<String>, collection: Collection) {
        self.collections.install(name, collection);
    }

    /// Registers one factory-backed collection per entry, in iteration
    /// order.
    pub fn setup_collections<N, F>(&mut self, factories: impl IntoIterator<Item = (N, F)>)
    where
        N: Into<String>,
        F: FnMut() -> Box<dyn Entity> + 'static,
    {
        for (name, factory) in factories {
            self.collections
                .install(name, Collection::new().with_factory(factory));
        }
    }

    pub fn load_manifest(&mut self, manifest: &AssetManifest) {
        self.images.load_all(&manifest.images);
        self.audio.load_all(&manifest.sounds);
    }

    /// Events mutate the pointer immediately, not at the next tick edge.
    pub fn handle_event(&mut self, event: InputEvent) {
        self.pointer.apply(
            event,
            self.config.canvas_width as f32,
            self.config.canvas_height as f32,
        );
    }

    /// One full tick: autoclear, collections in registration order, the
    /// user callback, then the click latch drops.
    pub fn run_tick<F>(&mut self, surface: &mut dyn Surface, callback: &mut F)
    where
        F: FnMut(&mut TickContext<'_>, &mut CollectionRegistry),
    {
        if self.config.autoclear {
            surface.clear();
        }
        let mut tick = TickContext {
            surface,
            pointer: self.pointer.snapshot(),
            images: &self.images,
            audio: &mut self.audio,
        };
        for (_, collection) in &mut self.collections.entries {
            collection.step(&mut tick);
        }
        callback(&mut tick, &mut self.collections);
        self.pointer.end_tick();
        self.tick_count += 1;
    }

    /// Blocking timer loop. `events` is polled once per tick; returning
    /// `None` ends the stream and the loop.
    pub fn run<F, E>(&mut self, surface: &mut dyn Surface, mut events: E, mut callback: F)
    where
        E: FnMut() -> Option<Vec<InputEvent>>,
        F: FnMut(&mut TickContext<'_>, &mut CollectionRegistry),
    {
        let period = self.config.tick_period;
        let mut deadline = Instant::now();
        loop {
            let Some(batch) = events() else {
                info!(ticks = self.tick_count, "engine_loop_ended");
                return;
            };
            for event in batch {
                self.handle_event(event);
            }
            self.run_tick(surface, &mut callback);

            deadline += period;
            let now = Instant::now();
            let sleep = next_tick_sleep(now, deadline);
            if sleep > Duration::ZERO {
                thread::sleep(sleep);
            } else {
                // Fell behind; restart pacing from now instead of
                // bursting to catch up.
                deadline = now;
            }
        }
    }
}

fn next_tick_sleep(now: Instant, deadline: Instant) -> Duration {
    deadline.saturating_duration_since(now)
}
