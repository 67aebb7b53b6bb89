use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use pixels::{Error as PixelsError, Pixels, SurfaceTexture};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, WindowBuilder};

use nectar::{
    draw_pointer_sprite, draw_text, AssetManifest, Collection, Engine, Entity, FrameBuffer,
    ImageData, InputEvent, LoopConfig, Rect, TextStyle, TickContext,
};

const CANVAS_WIDTH: u32 = 800;
const CANVAS_HEIGHT: u32 = 600;
const TICK_PERIOD: Duration = Duration::from_millis(30);
const MAX_TICKS_PER_FRAME: u32 = 5;
const MANIFEST_PATH: &str = "assets/manifest.json";
const PARTICLE_SPRITE: &str = "particle";
const CURSOR_SPRITE: &str = "cursor";
const CLICK_SOUND: &str = "pop";
const PARTICLE_GRAVITY: f32 = 0.35;
const HUD_COLOR: [u8; 4] = [240, 240, 240, 255];

#[derive(Debug, Error)]
enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to create presentation surface: {0}")]
    CreateSurface(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

struct Particle {
    rect: Rect,
    vx: f32,
    vy: f32,
}

impl Entity for Particle {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn draw(&mut self, tick: &mut TickContext<'_>) {
        if let Some(image) = tick.images.get(PARTICLE_SPRITE) {
            let src = Rect::new(0.0, 0.0, image.width as f32, image.height as f32);
            tick.surface.draw_image(image, src, self.rect);
        }
    }

    fn change(&mut self, _tick: &mut TickContext<'_>) {
        self.vy += PARTICLE_GRAVITY;
        self.rect.x += self.vx;
        self.rect.y += self.vy;
    }
}

fn main() {
    init_tracing();
    info!("=== Nectar Demo Startup ===");
    if let Err(err) = run() {
        error!(error = %err, "startup_failed");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn run() -> Result<(), AppError> {
    let config = LoopConfig {
        canvas_width: CANVAS_WIDTH,
        canvas_height: CANVAS_HEIGHT,
        tick_period: TICK_PERIOD,
        autoclear: true,
    };
    let mut engine = Engine::new(config);
    load_assets(&mut engine);

    // Factory and callback share the spawn point through a cell so new
    // particles appear at the last pointer position.
    let spawn_point = Rc::new(Cell::new((
        CANVAS_WIDTH as f32 / 2.0,
        CANVAS_HEIGHT as f32 / 2.0,
    )));
    let factory_spawn = Rc::clone(&spawn_point);
    let mut spawn_counter = 0u32;
    let particles = Collection::new()
        .with_factory(move || {
            spawn_counter = spawn_counter.wrapping_add(1);
            let (x, y) = factory_spawn.get();
            Box::new(Particle {
                rect: Rect::new(x, y, 6.0, 6.0),
                vx: (spawn_counter % 7) as f32 - 3.0,
                vy: -((spawn_counter % 5) as f32) - 2.0,
            })
        })
        .with_filter(|member, tick| !member.is_out_of_bounds(tick));
    engine.install_collection("particles", particles);

    let callback_spawn = Rc::clone(&spawn_point);
    let mut tick_callback = move |tick: &mut TickContext<'_>,
                                  collections: &mut nectar::CollectionRegistry| {
        callback_spawn.set((tick.pointer.x, tick.pointer.y));
        if tick.pointer.click {
            if let Some(particles) = collections.get_mut("particles") {
                for _ in 0..8 {
                    if let Err(err) = particles.add() {
                        warn!(error = %err, "particle_spawn_failed");
                        break;
                    }
                }
            }
            tick.audio.play(CLICK_SOUND);
        }
        let count = collections
            .get("particles")
            .map(Collection::len)
            .unwrap_or(0);
        let style = TextStyle {
            color: HUD_COLOR,
            size: 10.0,
        };
        draw_text(
            tick.surface,
            &format!("particles: {count}\nclick to burst"),
            8.0,
            8.0,
            &style,
            Some(16.0),
        );
        draw_pointer_sprite(tick, CURSOR_SPRITE, None);
    };

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window: &'static winit::window::Window = Box::leak(Box::new(
        WindowBuilder::new()
            .with_title("Nectar Demo")
            .with_inner_size(LogicalSize::new(CANVAS_WIDTH as f64, CANVAS_HEIGHT as f64))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    ));
    let surface_size = window.inner_size();
    let surface_texture = SurfaceTexture::new(surface_size.width, surface_size.height, window);
    let mut pixels = Pixels::new(CANVAS_WIDTH, CANVAS_HEIGHT, surface_texture)
        .map_err(AppError::CreateSurface)?;
    let mut framebuffer = FrameBuffer::new(CANVAS_WIDTH, CANVAS_HEIGHT);
    framebuffer.set_clear_color([16, 16, 24, 255]);

    event_loop.set_control_flow(ControlFlow::Poll);

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut is_fullscreen = false;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(err) = pixels.resize_surface(new_size.width, new_size.height) {
                        warn!(error = %err, "surface_resize_failed");
                        window_target.exit();
                        return;
                    }
                    engine.handle_event(scale_event_for_resize(
                        is_fullscreen,
                        new_size.width,
                        new_size.height,
                    ));
                }
                WindowEvent::CursorMoved { position, .. } => {
                    engine.handle_event(InputEvent::PointerMoved {
                        x: position.x as f32,
                        y: position.y as f32,
                    });
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    if button == MouseButton::Left {
                        engine.handle_event(match state {
                            ElementState::Pressed => InputEvent::PointerPressed,
                            ElementState::Released => InputEvent::PointerReleased,
                        });
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if event.state == ElementState::Pressed {
                        match event.physical_key {
                            PhysicalKey::Code(KeyCode::F11) => {
                                is_fullscreen = !is_fullscreen;
                                let mode =
                                    is_fullscreen.then(|| Fullscreen::Borderless(None));
                                info!(is_fullscreen, "fullscreen_toggled");
                                window.set_fullscreen(mode);
                            }
                            PhysicalKey::Code(KeyCode::Escape) => {
                                info!(reason = "escape_key", "shutdown_requested");
                                window_target.exit();
                            }
                            _ => {}
                        }
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    accumulator =
                        accumulator.saturating_add(now.saturating_duration_since(last_frame_instant));
                    last_frame_instant = now;

                    let mut ticks_run = 0;
                    while accumulator >= TICK_PERIOD && ticks_run < MAX_TICKS_PER_FRAME {
                        accumulator -= TICK_PERIOD;
                        engine.run_tick(&mut framebuffer, &mut tick_callback);
                        ticks_run += 1;
                    }
                    if accumulator >= TICK_PERIOD {
                        warn!(
                            backlog_ms = accumulator.as_millis() as u64,
                            "tick_backlog_dropped"
                        );
                        accumulator = Duration::ZERO;
                    }

                    pixels.frame_mut().copy_from_slice(framebuffer.frame());
                    if let Err(err) = pixels.render() {
                        warn!(error = %err, "present_failed");
                        window_target.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Loads the manifest when present, then guarantees the sprites the demo
/// draws with by generating fallbacks for any still missing.
fn load_assets(engine: &mut Engine) {
    if Path::new(MANIFEST_PATH).exists() {
        match AssetManifest::from_path(MANIFEST_PATH) {
            Ok(manifest) => engine.load_manifest(&manifest),
            Err(err) => warn!(error = %err, "manifest_load_failed_using_fallbacks"),
        }
    } else {
        info!(path = MANIFEST_PATH, "no_manifest_using_fallback_sprites");
    }
    if engine.images().get(PARTICLE_SPRITE).is_none() {
        engine
            .images_mut()
            .insert(PARTICLE_SPRITE, solid_sprite(6, 6, [255, 196, 64, 255]));
    }
    if engine.images().get(CURSOR_SPRITE).is_none() {
        engine
            .images_mut()
            .insert(CURSOR_SPRITE, cross_sprite(9, [240, 240, 240, 255]));
    }
}

/// A resize only changes the pointer scale while the window is fullscreen;
/// an ordinary drag-resize keeps (or restores) the identity ratio.
fn scale_event_for_resize(is_fullscreen: bool, width: u32, height: u32) -> InputEvent {
    if is_fullscreen {
        InputEvent::FullscreenEntered {
            viewport_width: width as f32,
            viewport_height: height as f32,
        }
    } else {
        InputEvent::FullscreenExited
    }
}

fn solid_sprite(width: u32, height: u32, color: [u8; 4]) -> ImageData {
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height {
        rgba.extend_from_slice(&color);
    }
    ImageData {
        width,
        height,
        rgba,
    }
}

/// Square sprite with a one-pixel cross through the center, transparent
/// elsewhere.
fn cross_sprite(size: u32, color: [u8; 4]) -> ImageData {
    let mut rgba = vec![0u8; (size * size * 4) as usize];
    let mid = size / 2;
    for i in 0..size {
        for (x, y) in [(i, mid), (mid, i)] {
            let offset = ((y * size + x) * 4) as usize;
            rgba[offset..offset + 4].copy_from_slice(&color);
        }
    }
    ImageData {
        width: size,
        height: size,
        rgba,
    }
}
