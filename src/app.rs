// src/app.rs

use std::sync::Arc;

use winit::{
    event::{DeviceEvent, WindowEvent},
    window::Window,
};

use crate::ui::{build_ui, OverlayInfo};
use snowscape::engine_lib::{InputState, Orchestrator};
use snowscape::media::{FsAssets, MediaResolver};
use snowscape::rendering_lib::{FramePlan, Renderer, ShaderLibrary};
use snowscape::{Result, SceneConfig, SceneError};

pub struct SnowApp {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    renderer: Renderer,
    assets: FsAssets,
    orchestrator: Orchestrator,
    input: InputState,
    plan: Option<FramePlan>,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl SnowApp {
    pub async fn new(window: Arc<Window>, scene_config: &SceneConfig) -> Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window.clone())?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(SceneError::AdapterUnavailable)?;
        log::info!("Using adapter {}", adapter.get_info().name);
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    label: None,
                },
                None,
            )
            .await?;
        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(SceneError::AdapterUnavailable)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let assets = FsAssets::new(MediaResolver::new(&scene_config.media.search_dirs));
        let shaders = ShaderLibrary::load(&assets)?;
        let mut renderer = Renderer::new(
            device.clone(),
            queue.clone(),
            config.format,
            config.width,
            config.height,
            &scene_config.shadow,
            &shaders,
        )
        .await?;

        let mut orchestrator = Orchestrator::new(scene_config);
        orchestrator.resize(config.width, config.height);
        orchestrator.create_device_resources(&mut renderer, &assets)?;

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, config.format, None, 1);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            renderer,
            assets,
            orchestrator,
            input: InputState::new(scene_config.controls.clone()).with_gamepad(),
            plan: None,
            egui_ctx,
            egui_state,
            egui_renderer,
        })
    }

    pub fn get_size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.size
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.renderer.resize(new_size.width, new_size.height);
            self.orchestrator.resize(new_size.width, new_size.height);
        }
    }

    pub fn exit_requested(&self) -> bool {
        self.orchestrator.exit_requested() || self.input.exit_requested()
    }

    pub fn update(&mut self, elapsed: f64) {
        self.input.poll_gamepad();
        if let Some(plan) = self.orchestrator.tick(elapsed, &mut self.input) {
            self.plan = Some(plan);
        }
    }

    /// Rebuilds every scene resource after the surface reported itself lost.
    pub fn recover_lost_device(&mut self) -> Result<()> {
        self.surface.configure(&self.device, &self.config);
        self.plan = None;
        self.orchestrator.on_device_lost(&mut self.renderer);
        self.orchestrator.on_device_restored(&mut self.renderer, &self.assets)
    }

    fn overlay_info(&self) -> OverlayInfo {
        let look = self.orchestrator.look_angles();
        OverlayInfo {
            camera_position: self.orchestrator.camera().position(),
            pitch_deg: look.pitch.to_degrees(),
            yaw_deg: look.yaw.to_degrees(),
            mounted: self.orchestrator.mount_state().mounted,
            mouse_look: self.input.relative_mode(),
            steps: self.orchestrator.step_count(),
        }
    }

    /// Draws the last planned frame. Nothing is presented until a step has run.
    pub fn render(&mut self, window: &Window) -> std::result::Result<(), wgpu::SurfaceError> {
        let Some(plan) = self.plan.take() else {
            return Ok(());
        };
        let output_texture = self.surface.get_current_texture()?;
        let view = output_texture.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Main Command Encoder"),
        });

        self.renderer.execute(&mut encoder, &view, &plan);

        let info = self.overlay_info();
        let raw_input = self.egui_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| build_ui(ctx, &info));
        self.egui_state.handle_platform_output(window, full_output.platform_output);
        let tris = self.egui_ctx.tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer.update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: window.scale_factor() as f32,
        };
        self.egui_renderer.update_buffers(&self.device, &self.queue, &mut encoder, &tris, &screen_descriptor);
        {
            let mut gui_render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("GUI Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations { load: wgpu::LoadOp::Load, store: wgpu::StoreOp::Store },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.egui_renderer.render(&mut gui_render_pass, &tris, &screen_descriptor);
        }
        for tex_id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(tex_id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output_texture.present();
        Ok(())
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent, window: &Window) -> bool {
        // The cursor grab must be released even when egui swallows the release.
        if InputState::must_observe(event) {
            let handled = self.input.handle_window_event(event, window);
            let _ = self.egui_state.on_window_event(window, event);
            return handled;
        }
        if self.egui_state.on_window_event(window, event).consumed {
            return true;
        }
        self.input.handle_window_event(event, window)
    }

    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        self.input.handle_device_event(event);
    }
}
