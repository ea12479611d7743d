//! Flip panels
//!
//! Text cards on four rings of zones (past, present, near, far) that flip over
//! to reveal their next text. Cards flip on their own once the pointer has been
//! idle for a while.
//!
//! Controls:
//! - Mouse / touch: press a card to flip it; moving drifts the camera
//! - Space: Pause/resume
//! - F: Flip a random card

use std::time::Instant;

use common::{constants, seed_from_env, Camera3D, FrameInput, GraphicsContext, PointerClock};
use flip_panels::controls_ui::{draw_controls, ControlAction, ControlStatus};
use flip_panels::scene::{build_scene, drift_camera, paint, scene_camera};
use flip_panels::{default_layout, PanelFlipEngine};
use glam::Vec2;
use winit::{
    event::{ElementState, Event, KeyEvent, MouseButton, TouchPhase, WindowEvent},
    event_loop::ControlFlow,
    keyboard::{KeyCode, PhysicalKey},
};

const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.008,
    g: 0.008,
    b: 0.014,
    a: 1.0,
};

struct EguiState {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

struct App {
    ctx: GraphicsContext,
    engine: PanelFlipEngine,
    camera: Camera3D,
    clock: PointerClock,
    frame: Option<FrameInput>,
    start: Instant,
    egui: EguiState,
}

impl App {
    fn new(ctx: GraphicsContext) -> Self {
        let layout = default_layout();
        let engine = match seed_from_env() {
            Some(seed) => {
                log::info!("seeding RNG with {}", seed);
                PanelFlipEngine::seeded(&layout, seed)
            }
            None => PanelFlipEngine::new(&layout),
        };
        log::info!("{} panels ready", engine.panels().len());

        let camera = scene_camera(ctx.aspect_ratio());
        let clock = PointerClock::new(ctx.size.width as f32, ctx.size.height as f32, 0.0);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &ctx.window,
            Some(ctx.window.scale_factor() as f32),
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&ctx.device, ctx.config.format, None, 1);

        Self {
            ctx,
            engine,
            camera,
            clock,
            frame: None,
            start: Instant::now(),
            egui: EguiState {
                ctx: egui_ctx,
                state: egui_state,
                renderer: egui_renderer,
            },
        }
    }

    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if !self.ctx.resize(new_size) {
            return;
        }
        self.camera.update_aspect_ratio(self.ctx.aspect_ratio());
        self.clock
            .resize(new_size.width as f32, new_size.height as f32);
    }

    fn update(&mut self) {
        let frame = self.clock.begin_frame(self.now_ms());
        drift_camera(&mut self.camera, frame.ndc());
        self.engine.tick(&frame, &self.camera);
        self.frame = Some(frame);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let now = self.frame.map_or(0.0, |f| f.now_ms);
        let status = ControlStatus {
            paused: self.engine.paused(),
            panels: self.engine.panels().len(),
            active_flips: self.engine.active_flips(),
            idle_secs: self.frame.map_or(0.0, |f| (f.idle_ms / 1000.0) as f32),
        };

        let raw_input = self.egui.state.take_egui_input(&self.ctx.window);
        let mut action = None;
        let full_output = self.egui.ctx.run(raw_input, |ctx| {
            let rect = ctx.screen_rect();
            let viewport = Vec2::new(rect.width(), rect.height());
            let shapes = build_scene(&self.camera, self.engine.panels(), now, viewport);
            paint(
                &ctx.layer_painter(egui::LayerId::background()),
                rect.min,
                &shapes,
            );
            action = draw_controls(ctx, &status);
        });

        self.egui
            .state
            .handle_platform_output(&self.ctx.window, full_output.platform_output);
        let tris = self
            .egui
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui
                .renderer
                .update_texture(&self.ctx.device, &self.ctx.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.ctx.size.width, self.ctx.size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        self.egui.renderer.update_buffers(
            &self.ctx.device,
            &self.ctx.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Panel Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKGROUND),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui
                .renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui.renderer.free_texture(id);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(action) = action {
            self.apply(action);
        }

        Ok(())
    }

    fn apply(&mut self, action: ControlAction) {
        let now = self.now_ms();
        match action {
            ControlAction::TogglePause => {
                self.engine.toggle_pause(now);
            }
            ControlAction::RandomFlip => {
                if self.engine.trigger_random_flip(now).is_none() {
                    log::debug!("random flip landed on a card already turning");
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode, state: ElementState) {
        if state != ElementState::Pressed {
            return;
        }

        match key {
            KeyCode::Space => self.apply(ControlAction::TogglePause),
            KeyCode::KeyF => self.apply(ControlAction::RandomFlip),
            _ => {}
        }
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.egui
            .state
            .on_window_event(&self.ctx.window, event)
            .consumed
    }
}

fn main() {
    let (ctx, event_loop) = pollster::block_on(GraphicsContext::new(
        "Flip Panels",
        constants::WINDOW_WIDTH,
        constants::WINDOW_HEIGHT,
    ));

    let mut app = App::new(ctx);

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { ref event, .. } => {
                    let consumed = app.handle_window_event(event);

                    if !consumed {
                        match event {
                            WindowEvent::CloseRequested => elwt.exit(),
                            WindowEvent::Resized(size) => app.resize(*size),
                            WindowEvent::KeyboardInput {
                                event:
                                    KeyEvent {
                                        physical_key: PhysicalKey::Code(key),
                                        state,
                                        ..
                                    },
                                ..
                            } => app.handle_key(*key, *state),
                            WindowEvent::CursorMoved { position, .. } => {
                                let now = app.now_ms();
                                app.clock.pointer_moved(
                                    Vec2::new(position.x as f32, position.y as f32),
                                    now,
                                );
                            }
                            WindowEvent::MouseInput {
                                state: ElementState::Pressed,
                                button: MouseButton::Left,
                                ..
                            } => {
                                let now = app.now_ms();
                                app.clock.pointer_pressed(now);
                            }
                            WindowEvent::Touch(touch) => {
                                let now = app.now_ms();
                                app.clock.pointer_moved(
                                    Vec2::new(touch.location.x as f32, touch.location.y as f32),
                                    now,
                                );
                                if touch.phase == TouchPhase::Started {
                                    app.clock.pointer_pressed(now);
                                }
                            }
                            WindowEvent::RedrawRequested => {
                                app.update();
                                match app.render() {
                                    Ok(_) => {}
                                    Err(
                                        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
                                    ) => {
                                        log::warn!("surface lost, reconfiguring");
                                        app.ctx.reconfigure();
                                    }
                                    Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                                    Err(e) => log::error!("render error: {:?}", e),
                                }
                            }
                            _ => {}
                        }
                    }
                }
                Event::AboutToWait => {
                    app.ctx.window.request_redraw();
                }
                _ => {}
            }
        })
        .expect("Event loop error");
}
