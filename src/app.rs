use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::Context;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use gol_overlay::config::{SIM_TICK_HZ, WINDOW_HEIGHT, WINDOW_WIDTH};
use gol_overlay::gpu::GpuContext;
use gol_overlay::scene::{MeshBlendMode, SceneTargets, ViewId, ViewInfo, ViewRect};
use gol_overlay::{BonusEffectPass, GameOfLifePass, GolDriver, PassSettings, RenderPass, ViewContext};

use crate::demo::{DemoPrograms, DemoScene, OrbitCamera, SceneRenderer};

/// Advances simulation time from its own thread until dropped
struct DriverThread {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl DriverThread {
    fn spawn(driver: GolDriver) -> anyhow::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let interval = Duration::from_secs_f32(1.0 / SIM_TICK_HZ);
        let handle = thread::Builder::new()
            .name("gol-driver".into())
            .spawn({
                let stop = stop.clone();
                move || {
                    let mut last = Instant::now();
                    while !stop.load(Ordering::Relaxed) {
                        thread::sleep(interval);
                        let now = Instant::now();
                        driver.advance_time((now - last).as_secs_f32());
                        last = now;
                    }
                }
            })
            .context("failed to spawn driver thread")?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }
}

impl Drop for DriverThread {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Driver thread panicked");
            }
        }
    }
}

/// Everything that exists once the window and device are up
struct RunningState {
    gpu: GpuContext,
    renderer: SceneRenderer,
    scene: DemoScene,
    gol: GameOfLifePass,
    bonus: BonusEffectPass,
    driver: GolDriver,
    _driver_thread: DriverThread,
    cameras: [OrbitCamera; 2],
}

impl RunningState {
    fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        log::info!("Creating GPU context...");
        let gpu = pollster::block_on(GpuContext::new(window)).context("GPU initialization failed")?;

        let programs = DemoPrograms::load();
        let renderer = SceneRenderer::new(&gpu.device, gpu.format(), gpu.size());
        let scene = DemoScene::new(&gpu.device, &programs);

        let mut gol = GameOfLifePass::new(PassSettings::default());
        let mut bonus = BonusEffectPass::new();
        gol.init(&gpu.device);
        bonus.init(&gpu.device);

        let driver = gol.driver();
        driver.set_effect_program(programs.life.clone());
        let driver_thread = DriverThread::spawn(driver.clone())?;

        Ok(Self {
            gpu,
            renderer,
            scene,
            gol,
            bonus,
            driver,
            _driver_thread: driver_thread,
            cameras: [OrbitCamera::new(0.0), OrbitCamera::new(std::f32::consts::PI)],
        })
    }

    fn views(&self, split: bool, time: f32) -> Vec<ViewInfo> {
        let [width, height] = self.gpu.size();
        let rects = if split {
            let half = width / 2;
            vec![
                ViewRect::new(0, 0, half, height),
                ViewRect::new(half, 0, width - half, height),
            ]
        } else {
            vec![ViewRect::new(0, 0, width, height)]
        };
        rects
            .into_iter()
            .zip(&self.cameras)
            .enumerate()
            .map(|(i, (rect, camera))| {
                let (view_proj, camera_position) = camera.view_proj(time, rect.aspect());
                ViewInfo {
                    id: ViewId(i as u32),
                    rect,
                    view_proj,
                    camera_position,
                    time,
                }
            })
            .collect()
    }
}

/// Application state
pub struct App {
    window: Option<Arc<Window>>,
    state: Option<RunningState>,
    frame_number: u64,
    fps_counter: FpsCounter,
    split_view: bool,
    start: Instant,
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new() -> Self {
        Self {
            window: None,
            state: None,
            frame_number: 0,
            fps_counter: FpsCounter::new(),
            split_view: true,
            start: Instant::now(),
            error: None,
        }
    }

    /// The error that stopped the event loop, if any
    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }

    fn render(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let time = self.start.elapsed().as_secs_f32();
        state.scene.update(time);

        self.frame_number += 1;
        state.gol.tick(self.frame_number);
        state.bonus.tick(self.frame_number);

        let gpu = &state.gpu;
        let output = match gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return;
            }
        };

        let color = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        let views = state.views(self.split_view, time);
        state.renderer.clear(&mut encoder, &color);
        for view in &views {
            state
                .renderer
                .draw_view(&gpu.device, &mut encoder, &color, view, &state.scene);
        }

        let targets = SceneTargets {
            color: &color,
            color_format: gpu.format(),
            depth: state.renderer.depth_view(),
            extent: state.renderer.depth_size(),
        };
        for view in &views {
            let mut ctx = ViewContext {
                device: &gpu.device,
                encoder: &mut encoder,
                view,
                targets: &targets,
                scene: &state.scene,
            };
            state.bonus.render_view(&mut ctx);
            state.gol.render_view(&mut ctx);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(fps) = self.fps_counter.tick() {
            if let Some(window) = &self.window {
                let layout = if self.split_view { "split" } else { "single" };
                window.set_title(&format!("Game of Life Overlay - {:.0} FPS - {} view", fps, layout));
            }
        }
    }

    fn handle_key(&mut self, key_code: KeyCode) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        match key_code {
            KeyCode::KeyR => {
                state.driver.request_reinitialize();
                log::info!("Re-initialization requested");
            }
            KeyCode::KeyV => {
                self.split_view = !self.split_view;
                if !self.split_view {
                    state.gol.view_destroyed(ViewId(1));
                    state.bonus.view_destroyed(ViewId(1));
                }
                log::info!("Split view: {}", if self.split_view { "ON" } else { "OFF" });
            }
            KeyCode::Digit1 => state.scene.set_brush_blend_mode(MeshBlendMode::Alpha),
            KeyCode::Digit2 => state.scene.set_brush_blend_mode(MeshBlendMode::Additive),
            KeyCode::Digit3 => state.scene.set_brush_blend_mode(MeshBlendMode::Multiply),
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        log::info!("Initializing Game of Life overlay demo...");

        let window_attrs = Window::default_attributes()
            .with_title("Game of Life Overlay - Initializing...")
            .with_inner_size(winit::dpi::PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.error = Some(anyhow::Error::new(e).context("failed to create window"));
                event_loop.exit();
                return;
            }
        };

        match RunningState::new(window.clone()) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                self.error = Some(e);
                event_loop.exit();
                return;
            }
        }

        log::info!("Initialization complete!");
        log::info!("Controls:");
        log::info!("  R: Re-initialize the simulation");
        log::info!("  V: Toggle split view");
        log::info!("  1/2/3: Brush blend mode alpha/additive/multiply");
        log::info!("  Escape: Quit");

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() && !event.repeat {
                    if let PhysicalKey::Code(key_code) = event.physical_key {
                        if key_code == KeyCode::Escape {
                            log::info!("Escape pressed, exiting...");
                            event_loop.exit();
                        } else {
                            self.handle_key(key_code);
                        }
                    }
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Some(state) = &mut self.state {
                    log::info!("Window resized to {}x{}", new_size.width, new_size.height);
                    state.gpu.resize(new_size);
                    state.renderer.resize(&state.gpu.device, state.gpu.size());
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Simple FPS counter
struct FpsCounter {
    last_update: Instant,
    frame_count: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    /// Tick the counter, returns Some(fps) every second
    fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed.as_secs_f64() >= 1.0 {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.last_update = Instant::now();
            Some(fps)
        } else {
            None
        }
    }
}
