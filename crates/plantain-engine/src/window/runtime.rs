use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ouroboros::self_referencing;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::coords::Viewport;
use crate::core::{EngineConfig, FrameCtx, Game, UpdateCtx, WindowCtx};
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::input::{EventQueue, InputEvent, InputState};
use crate::render::{Canvas, Renderer};
use crate::time::{FixedStep, FpsCounter, FrameClock};

use super::translate::translate_window_event;

const TITLE_REFRESH: Duration = Duration::from_secs(1);

/// Entry point: opens the window and drives a [`Game`] until it exits.
pub struct Engine;

impl Engine {
    pub fn run<G>(config: EngineConfig, game: G) -> Result<()>
    where
        G: Game + 'static,
    {
        Self::run_with(config, GpuInit::default(), game)
    }

    /// Like [`Engine::run`] with explicit adapter and surface preferences.
    pub fn run_with<G>(config: EngineConfig, gpu_init: GpuInit, game: G) -> Result<()>
    where
        G: Game + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = EngineState::new(config, gpu_init, game);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// Everything that exists only while the window does.
struct Session {
    entry: WindowEntry,
    renderer: Renderer,
    canvas: Canvas,
}

struct EngineState<G: Game> {
    config: EngineConfig,
    gpu_init: GpuInit,
    game: G,

    session: Option<Session>,
    queue: EventQueue,
    input: InputState,

    clock: FrameClock,
    step: FixedStep,
    ticks: u64,
    fps: FpsCounter,
    title_updated: Instant,

    exit_requested: bool,
    error: Option<anyhow::Error>,
}

impl<G: Game> EngineState<G> {
    fn new(config: EngineConfig, gpu_init: GpuInit, game: G) -> Self {
        Self {
            queue: EventQueue::new(config.event_queue_capacity),
            step: FixedStep::with_rate(config.tick_rate),
            config,
            gpu_init,
            game,
            session: None,
            input: InputState::new(),
            clock: FrameClock::new(),
            ticks: 0,
            fps: FpsCounter::new(),
            title_updated: Instant::now(),
            exit_requested: false,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error = Some(err);
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_session(&mut self, event_loop: &ActiveEventLoop) -> Result<Session> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height))
            .with_resizable(self.config.resizable)
            .with_fullscreen(self.config.mode.to_fullscreen());

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let renderer = entry.with_gpu(|gpu| Renderer::new(gpu))?;

        let size = entry.with_gpu(|gpu| gpu.size());
        let mut canvas = Canvas::new(Viewport::from_size(size.width, size.height));
        canvas.set_clear_color(self.config.clear_color);
        canvas.set_vertex_limit(renderer.max_vertices());

        Ok(Session {
            entry,
            renderer,
            canvas,
        })
    }

    /// One loop iteration: input, fixed updates, then at most one frame.
    fn iterate(&mut self, event_loop: &ActiveEventLoop) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        for ev in self.queue.drain() {
            if let InputEvent::Resized { width, height } = ev {
                session
                    .entry
                    .with_gpu_mut(|gpu| gpu.resize(PhysicalSize::new(width, height)));
                if width > 0 && height > 0 {
                    session.canvas.set_viewport(Viewport::from_size(width, height));
                }
            }
            self.input.apply_event(ev);
        }

        let time = self.clock.tick();
        let due = self.step.advance(time.dt);
        let mut exit = false;

        for _ in 0..due {
            let mut ctx = UpdateCtx::new(&self.input, self.step.step(), self.ticks, &mut exit);
            self.game.update(&mut ctx);
            self.ticks += 1;
        }

        if due > 0 {
            let minimized = session.entry.with_gpu(|gpu| {
                let size = gpu.size();
                size.width == 0 || size.height == 0
            });

            if !minimized {
                let alpha = self.step.alpha();
                let game = &mut self.game;
                let input = &self.input;
                let canvas = &mut session.canvas;
                let renderer = &mut session.renderer;

                canvas.begin();
                session.entry.with_mut(|fields| {
                    {
                        let window = WindowCtx::new(fields.window);
                        let mut ctx = FrameCtx::new(canvas, input, window, time, alpha, &mut exit);
                        game.render(&mut ctx);
                    }

                    match fields.gpu.begin_frame() {
                        Ok(mut frame) => {
                            let stats = renderer.draw(fields.gpu, canvas, &mut frame);
                            log::trace!("frame {}: {stats:?}", time.frame_index);
                            fields.window.pre_present_notify();
                            fields.gpu.submit(frame);
                        }
                        Err(err) => {
                            if fields.gpu.handle_surface_error(err) == SurfaceErrorAction::Fatal {
                                exit = true;
                            }
                        }
                    }
                });

                self.fps.frame();
            }

            // Just-pressed input is consumed by the frame, even a skipped one.
            self.input.end_frame();
        }

        if self.config.show_fps && self.title_updated.elapsed() >= TITLE_REFRESH {
            self.title_updated = Instant::now();
            let title = format!("{} - {:.0} fps", self.config.title, self.fps.fps());
            session.entry.with_window(|w| w.set_title(&title));
        }

        if exit {
            self.exit_requested = true;
            event_loop.exit();
        }
    }
}

impl<G: Game> ApplicationHandler for EngineState<G> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() {
            return;
        }

        let mut session = match self.create_session(event_loop) {
            Ok(session) => session,
            Err(err) => return self.fail(event_loop, err),
        };

        if let Err(err) = self.game.init(&mut session.canvas) {
            return self.fail(event_loop, err.context("game initialization failed"));
        }

        log::info!(
            "window ready: {}x{}, {} Hz update",
            self.config.width,
            self.config.height,
            self.config.tick_rate
        );
        session.entry.with_window(|w| w.request_redraw());
        self.session = Some(session);
        self.clock.reset();
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(session) = &self.session {
            session.entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                log::info!("window closed");
                self.exit_requested = true;
                event_loop.exit();
                return;
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(session) = &self.session {
                    let size = session.entry.with_window(|w| w.inner_size());
                    self.queue.push(InputEvent::Resized {
                        width: size.width,
                        height: size.height,
                    });
                }
            }
            WindowEvent::RedrawRequested => {
                self.iterate(event_loop);
                return;
            }
            _ => {}
        }

        if let Some(ev) = translate_window_event(&self.input, &event) {
            self.queue.push(ev);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Surface and device go before the event loop tears the display down.
        self.session = None;
        log::debug!("engine stopped after {} updates", self.ticks);
    }
}
