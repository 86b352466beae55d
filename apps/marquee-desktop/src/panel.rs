//! The debug panel: one egui window binding the shared materials,
//! plus scene and camera readouts.

use egui::Context;
use egui_wgpu::ScreenDescriptor;
use egui_winit::State as EguiState;
use winit::event::WindowEvent;
use winit::window::Window;

use marquee_assets::MatcapSlot;
use marquee_scene::MatcapMaterial;

use crate::AppState;

pub struct DebugPanel {
    state: EguiState,
    renderer: egui_wgpu::Renderer,
    visible: bool,
    wireframe_supported: bool,
}

impl DebugPanel {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        window: &Window,
        wireframe_supported: bool,
    ) -> Self {
        let state = EguiState::new(
            Context::default(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        // Painted on the resolved surface, outside the MSAA pass.
        let renderer = egui_wgpu::Renderer::new(device, format, None, 1, false);
        Self {
            state,
            renderer,
            visible: true,
            wireframe_supported,
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// True when egui consumed the event.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Run the panel UI and paint it over the finished frame.
    pub fn draw(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        window: &Window,
        view: &wgpu::TextureView,
        size: [u32; 2],
        app: &mut AppState,
    ) {
        let visible = self.visible;
        let wireframe = self.wireframe_supported;
        let input = self.state.take_egui_input(window);
        let output = self.state.egui_ctx().run(input, |ctx| {
            if visible {
                scene_window(ctx, app, wireframe);
            }
        });
        self.state
            .handle_platform_output(window, output.platform_output);

        let paint_jobs = self
            .state
            .egui_ctx()
            .tessellate(output.shapes, output.pixels_per_point);
        let screen = ScreenDescriptor {
            size_in_pixels: size,
            pixels_per_point: output.pixels_per_point,
        };

        for (id, delta) in &output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("panel_encoder"),
        });
        self.renderer
            .update_buffers(device, queue, &mut encoder, &paint_jobs, &screen);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("panel_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.renderer.render(&mut pass, &paint_jobs, &screen);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}

fn scene_window(ctx: &Context, app: &mut AppState, wireframe_supported: bool) {
    egui::Window::new("Scene")
        .default_width(240.0)
        .show(ctx, |ui| {
            material_controls(ui, "Text", &mut app.scene.materials.text, wireframe_supported);
            ui.separator();
            material_controls(ui, "Donuts", &mut app.scene.materials.donut, wireframe_supported);
            ui.separator();

            if ui.button("Reset materials").clicked() {
                app.scene.materials.reset();
            }

            ui.separator();
            ui.label(app.stats.to_string());
            ui.label(format!("Frame: {:.1} ms", app.frame_ms));
            let pos = app.camera.position();
            ui.label(format!(
                "Camera: ({:.1}, {:.1}, {:.1})  r={:.2}",
                pos.x,
                pos.y,
                pos.z,
                app.camera.radius()
            ));
            ui.small("F1: panel | R: recenter | drag: orbit | right drag: pan | wheel: zoom");
        });
}

/// Matcap dropdown, color swatch, and wireframe toggle for one material.
fn material_controls(
    ui: &mut egui::Ui,
    title: &str,
    material: &mut MatcapMaterial,
    wireframe_supported: bool,
) {
    ui.heading(title);

    egui::ComboBox::from_id_salt(title)
        .selected_text(material.matcap.name())
        .show_ui(ui, |ui| {
            for slot in MatcapSlot::all() {
                ui.selectable_value(&mut material.matcap, slot, slot.name());
            }
        });

    ui.horizontal(|ui| {
        ui.label("Color");
        let mut rgb = material.color.rgb_array();
        if ui.color_edit_button_rgb(&mut rgb).changed() {
            material.color.set_rgb(rgb);
        }
    });

    let wire = ui.add_enabled(
        wireframe_supported,
        egui::Checkbox::new(&mut material.wireframe, "Wireframe"),
    );
    if !wireframe_supported {
        wire.on_disabled_hover_text("not supported by this adapter");
    }
}
