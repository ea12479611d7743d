//! Tesseract trails
//!
//! A tesseract rotating through all six planes of 4D space, projected to the screen
//! and left to smear into ghost trails. Pointer speed drives rotation and bursts;
//! holding still grows a shimmer around the figure.
//!
//! Controls:
//! - Mouse / touch: steer rotation (position), camera distance (height), bursts (jerks)
//! - Space: Pause/resume
//! - C: Clear the accumulated trail
//! - S: Save the current frame as PNG

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use common::{constants, flag_from_env, seed_from_env, DrawList, GraphicsContext, PointerClock};
use glam::Vec2;
use tesseract::controls_ui::{draw_controls, ControlAction, ControlStatus};
use tesseract::renderer::CanvasRenderer;
use tesseract::{HypercubeConfig, HypercubeEngine};
use winit::{
    event::{ElementState, Event, KeyEvent, MouseButton, TouchPhase, WindowEvent},
    event_loop::ControlFlow,
    keyboard::{KeyCode, PhysicalKey},
};

struct EguiState {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

struct App {
    ctx: GraphicsContext,
    renderer: CanvasRenderer,
    engine: HypercubeEngine,
    clock: PointerClock,
    draw_list: DrawList,
    start: Instant,
    egui: EguiState,
}

impl App {
    fn new(ctx: GraphicsContext) -> Self {
        let renderer = CanvasRenderer::new(&ctx);
        let config = HypercubeConfig {
            clear_on_resize: flag_from_env(constants::CLEAR_ON_RESIZE_ENV),
            ..HypercubeConfig::default()
        };
        if config.clear_on_resize {
            log::info!("canvas clears on resize");
        }
        let engine = match seed_from_env() {
            Some(seed) => {
                log::info!("seeding RNG with {}", seed);
                HypercubeEngine::seeded(config, seed)
            }
            None => HypercubeEngine::new(config),
        };

        let size = Vec2::new(ctx.size.width as f32, ctx.size.height as f32);
        let clock = PointerClock::new(size.x, size.y, 0.0);

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
            renderer,
            engine,
            clock,
            draw_list: DrawList::new(size),
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
        self.renderer
            .resize(&self.ctx, self.engine.config().clear_on_resize);
        self.clock
            .resize(new_size.width as f32, new_size.height as f32);
    }

    fn update(&mut self) {
        let frame = self.clock.begin_frame(self.now_ms());
        self.draw_list.reset(frame.size);
        self.engine.tick(&frame, &mut self.draw_list);
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

        // An empty list still applies a pending clear while paused
        self.renderer.draw(&self.ctx, &mut encoder, &self.draw_list);
        self.renderer.present(&mut encoder, &view);

        let status = ControlStatus {
            paused: self.engine.paused(),
            ticks: self.engine.ticks(),
            trail_frames: self.engine.trail().len(),
            velocity: self.engine.frame().map_or(0.0, |f| f.motion.velocity),
        };

        let raw_input = self.egui.state.take_egui_input(&self.ctx.window);
        let mut action = None;
        let full_output = self.egui.ctx.run(raw_input, |ctx| {
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
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
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
        match action {
            ControlAction::TogglePause => self.engine.toggle_pause(),
            ControlAction::ClearTrail => {
                self.engine.clear_trail();
                self.renderer.clear();
            }
            ControlAction::SaveFrame => self.save_frame(),
        }
    }

    fn save_frame(&self) {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let path = std::path::PathBuf::from(format!("tesseract-{}.png", stamp));
        match self.renderer.save_png(&self.ctx, &path) {
            Ok(()) => log::info!("saved frame to {}", path.display()),
            Err(e) => log::error!("could not save frame: {:#}", e),
        }
    }

    fn handle_key(&mut self, key: KeyCode, state: ElementState) {
        if state != ElementState::Pressed {
            return;
        }

        match key {
            KeyCode::Space => self.apply(ControlAction::TogglePause),
            KeyCode::KeyC => self.apply(ControlAction::ClearTrail),
            KeyCode::KeyS => self.apply(ControlAction::SaveFrame),
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
        "Tesseract Trails",
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
