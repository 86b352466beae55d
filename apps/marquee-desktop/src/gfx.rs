//! Window and GPU bring-up.

use std::sync::Arc;

use tracing::info;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use marquee_assets::MatcapSet;
use marquee_render_wgpu::MatcapRenderer;
use marquee_scene::Scene;

use crate::panel::DebugPanel;

/// Everything that exists only while a window is open.
pub struct Gfx {
    pub window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub renderer: MatcapRenderer,
    pub panel: DebugPanel,
}

impl Gfx {
    /// Bring up the window, the wgpu device, and the scene renderer. A
    /// viewer cannot limp along without them, so failures here panic.
    pub fn init(event_loop: &ActiveEventLoop, scene: &Scene, matcaps: &MatcapSet) -> Self {
        let attrs = Window::default_attributes()
            .with_title("Marquee")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("find adapter");

        // Wireframe needs line rasterization; take it only where offered.
        let optional_features = wgpu::Features::POLYGON_MODE_LINE & adapter.features();
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("marquee_device"),
                required_features: optional_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .expect("create device");

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(caps.formats[0]);
        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = MatcapRenderer::new(
            &device,
            &queue,
            format,
            config.width,
            config.height,
            scene,
            matcaps,
        );
        let panel = DebugPanel::new(&device, format, &window, renderer.wireframe_available());

        info!(
            backend = adapter.get_info().backend.to_str(),
            "GPU initialized"
        );

        Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            panel,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }
}
