//! Desktop viewer: extruded headline, a field of donuts, and the panel.

mod gfx;
mod panel;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::event::{
    DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use marquee_assets::{FontFace, MatcapSet};
use marquee_render_wgpu::OrbitCamera;
use marquee_scene::{Scene, SceneConfig, SceneStats};

use crate::gfx::Gfx;

const FONT_FILE: &str = "helvetiker_regular.typeface.json";

#[derive(Parser)]
#[command(name = "marquee-desktop", about = "Matcap text and donuts viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding matcaps/ and fonts/
    #[arg(long, default_value = "./assets")]
    assets_dir: PathBuf,

    /// Text to extrude instead of the default
    #[arg(long)]
    text: Option<String>,

    /// Seed for donut placement
    #[arg(long)]
    seed: Option<u64>,

    /// Number of donuts to scatter
    #[arg(long)]
    donuts: Option<usize>,
}

/// Scene and interaction state. Outlives the GPU objects so a suspend or
/// surface rebuild never resets the camera or the materials.
pub struct AppState {
    pub scene: Scene,
    pub stats: SceneStats,
    pub camera: OrbitCamera,
    pub frame_ms: f32,
    rotating: bool,
    panning: bool,
    last_frame: Instant,
}

impl AppState {
    fn new(scene: Scene) -> Self {
        let stats = scene.stats();
        Self {
            scene,
            stats,
            camera: OrbitCamera::new(16.0 / 9.0),
            frame_ms: 0.0,
            rotating: false,
            panning: false,
            last_frame: Instant::now(),
        }
    }

    fn tick(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;
        // Smoothed over ~20 frames so the readout is legible.
        self.frame_ms += (dt * 1000.0 - self.frame_ms) * 0.05;
        self.camera.update(dt);
    }
}

struct App {
    state: AppState,
    matcaps: MatcapSet,
    gfx: Option<Gfx>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gfx.is_none() {
            let gfx = Gfx::init(event_loop, &self.state.scene, &self.matcaps);
            self.state
                .camera
                .set_aspect(gfx.config.width, gfx.config.height);
            self.gfx = Some(gfx);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(gfx) = self.gfx.as_mut() else {
            return;
        };
        if gfx.panel.handle_event(&gfx.window, &event) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                gfx.resize(size.width, size.height);
                self.state
                    .camera
                    .set_aspect(gfx.config.width, gfx.config.height);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match code {
                KeyCode::F1 => gfx.panel.toggle(),
                KeyCode::KeyR => self.state.camera.reset(),
                _ => {}
            },
            WindowEvent::MouseInput { button, state, .. } => {
                let pressed = state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.state.rotating = pressed,
                    MouseButton::Right => self.state.panning = pressed,
                    _ => {}
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
                };
                self.state.camera.zoom(amount);
            }
            WindowEvent::RedrawRequested => {
                self.state.tick();

                let frame = match gfx.surface.get_current_texture() {
                    Ok(frame) => frame,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        gfx.surface.configure(&gfx.device, &gfx.config);
                        return;
                    }
                    Err(err) => {
                        tracing::error!("surface error: {err}");
                        return;
                    }
                };
                let view = frame
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                gfx.renderer.render(
                    &gfx.device,
                    &gfx.queue,
                    &view,
                    &self.state.camera,
                    &self.state.scene.materials,
                );
                gfx.panel.draw(
                    &gfx.device,
                    &gfx.queue,
                    &gfx.window,
                    &view,
                    [gfx.config.width, gfx.config.height],
                    &mut self.state,
                );

                frame.present();
                gfx.window.request_redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if self.state.rotating {
                self.state.camera.rotate(dx as f32, dy as f32);
            } else if self.state.panning {
                self.state.camera.pan(dx as f32, dy as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gfx) = &self.gfx {
            gfx.window.request_redraw();
        }
    }
}

fn load_assets(dir: &Path) -> (MatcapSet, FontFace) {
    let matcaps = MatcapSet::load(dir);
    let font_path = dir.join("fonts").join(FONT_FILE);
    let face = match FontFace::load(&font_path) {
        Ok(face) => face,
        Err(e) => {
            tracing::warn!(
                "font {} unavailable ({e}); using the built-in face",
                font_path.display()
            );
            FontFace::builtin()
        }
    };
    (matcaps, face)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("marquee-desktop starting");

    let (matcaps, face) = load_assets(&cli.assets_dir);

    let mut config = SceneConfig::default();
    if let Some(text) = cli.text {
        config.text = text;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(count) = cli.donuts {
        config.donut_count = count;
    }

    let scene = Scene::build(&face, &config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        state: AppState::new(scene),
        matcaps,
        gfx: None,
    };
    event_loop.run_app(&mut app)?;

    Ok(())
}
