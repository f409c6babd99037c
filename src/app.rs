//! Desktop shell: one winit window, the wgpu renderer and the imgui overlay
//! driving a [`Game`] once per frame.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, ModifiersState, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::GameConfig;
use crate::game::Game;
use crate::gfx::rendering::{RenderTarget, WgpuRenderer};
use crate::ui::{panel, UiController, UiManager};

const WINDOW_TITLE: &str = "Garden Designer";
const ERROR_BACKGROUND: [f32; 3] = [0.17, 0.24, 0.31];

type GardenGame = Game<WgpuRenderer, UiController>;

/// Renderer and overlay, created together once a window exists
struct Gpu {
    renderer: WgpuRenderer,
    ui_manager: UiManager,
}

impl Gpu {
    fn new(window: &Arc<Window>) -> anyhow::Result<Self> {
        let (width, height) = window.inner_size().into();
        let renderer = pollster::block_on(WgpuRenderer::new(Arc::clone(window), width, height))
            .context("Failed to initialize graphics")?;
        let ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            window,
        );
        Ok(Self {
            renderer,
            ui_manager,
        })
    }
}

enum Session {
    Running {
        game: GardenGame,
        ui_manager: UiManager,
    },
    /// Startup failed; only the error screen and reload remain
    Failed { message: String, gpu: Option<Gpu> },
}

/// The garden designer application
pub struct GardenApp {
    config_path: Option<PathBuf>,
    save_path: PathBuf,
    window: Option<Arc<Window>>,
    session: Option<Session>,
    modifiers: ModifiersState,
}

impl GardenApp {
    /// # Arguments
    /// * `config_path` - Optional JSON file overriding the default tunables
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            save_path: PathBuf::from("garden-save.json"),
            window: None,
            session: None,
            modifiers: ModifiersState::empty(),
        }
    }

    /// Where Ctrl+S saves and Ctrl+L loads the garden
    pub fn with_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_path = path.into();
        self
    }

    /// Runs the event loop until the window closes
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = EventLoop::new().context("Failed to create event loop")?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run_app(&mut self)
            .context("Event loop terminated with an error")?;
        Ok(())
    }

    fn load_config(&self) -> anyhow::Result<GameConfig> {
        let Some(path) = &self.config_path else {
            return Ok(GameConfig::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        GameConfig::from_json_str(&json)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Builds a session, reusing `gpu` when a previous attempt got that far
    fn start_session(&self, window: &Arc<Window>, gpu: Option<Gpu>) -> Session {
        let gpu = match gpu.map(Ok).unwrap_or_else(|| Gpu::new(window)) {
            Ok(gpu) => gpu,
            Err(err) => {
                let message = format!("{:#}", err);
                log::error!("{}", message);
                window.set_title(&format!("{} - {} (press R to retry)", WINDOW_TITLE, message));
                return Session::Failed { message, gpu: None };
            }
        };

        match self.load_config() {
            Ok(config) => {
                window.set_title(WINDOW_TITLE);
                let ui = UiController::new(&config.ui);
                let game = Game::new(config, gpu.renderer, ui);
                Session::Running {
                    game,
                    ui_manager: gpu.ui_manager,
                }
            }
            Err(err) => {
                let message = format!("Failed to initialize the garden: {:#}", err);
                log::error!("{}", message);
                Session::Failed {
                    message,
                    gpu: Some(gpu),
                }
            }
        }
    }

    fn reload(&mut self, window: &Arc<Window>) {
        if let Some(Session::Failed { gpu, .. }) = self.session.take() {
            log::info!("Retrying initialization");
            self.session = Some(self.start_session(window, gpu));
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, window: &Arc<Window>, code: KeyCode) {
        if code == KeyCode::Escape {
            event_loop.exit();
            return;
        }

        if matches!(self.session, Some(Session::Failed { .. })) {
            if code == KeyCode::KeyR {
                self.reload(window);
            }
            return;
        }

        let control = self.modifiers.control_key() || self.modifiers.super_key();
        let Some(Session::Running { game, .. }) = self.session.as_mut() else {
            return;
        };
        if !control {
            return;
        }
        match code {
            KeyCode::KeyZ => {
                if !game.undo() {
                    log::debug!("Nothing to undo");
                }
            }
            KeyCode::KeyS => save_garden(game, &self.save_path),
            KeyCode::KeyL => load_garden(game, &self.save_path),
            _ => {}
        }
    }

    fn redraw(&mut self, window: &Arc<Window>) {
        let mut reload = false;
        match self.session.as_mut() {
            Some(Session::Running { game, ui_manager }) => {
                if let Err(err) = game.tick() {
                    log::error!("Render failed: {}", err);
                }
                let (renderer, ui) = game.target_and_ui_mut();
                renderer.finish_frame(|device, queue, encoder, view| {
                    ui_manager.draw(device, queue, encoder, window, view, |frame| {
                        panel::garden_panel(frame, ui);
                    });
                });
                // presses on the panel are queued until now
                game.process_events();
            }
            Some(Session::Failed {
                message,
                gpu: Some(gpu),
            }) => {
                if let Err(err) = gpu.renderer.clear_frame(ERROR_BACKGROUND) {
                    log::error!("Render failed: {}", err);
                }
                let ui_manager = &mut gpu.ui_manager;
                gpu.renderer.finish_frame(|device, queue, encoder, view| {
                    ui_manager.draw(device, queue, encoder, window, view, |frame| {
                        reload = panel::error_screen(frame, message);
                    });
                });
            }
            _ => {}
        }

        if reload {
            self.reload(window);
        }
    }
}

impl ApplicationHandler for GardenApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(1200, 800));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {}", err);
                event_loop.exit();
                return;
            }
        };

        self.session = Some(self.start_session(&window, None));
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // panels see input first so clicks on them never reach the garden
        let captured = match self.session.as_mut() {
            Some(Session::Running { ui_manager, .. })
            | Some(Session::Failed {
                gpu: Some(Gpu { ui_manager, .. }),
                ..
            }) => ui_manager.handle_event(&window, window_id, &event),
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                if let Some(Session::Running { game, .. }) = self.session.as_mut() {
                    game.dispose();
                }
                event_loop.exit();
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
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
            } if !captured => self.handle_key(event_loop, &window, code),
            WindowEvent::Resized(PhysicalSize { width, height }) => match self.session.as_mut() {
                Some(Session::Running { game, ui_manager }) => {
                    ui_manager.resize(width, height);
                    game.resize(width, height);
                }
                Some(Session::Failed { gpu: Some(gpu), .. }) => {
                    gpu.ui_manager.resize(width, height);
                    gpu.renderer.resize(width, height);
                }
                _ => {}
            },
            WindowEvent::RedrawRequested => self.redraw(&window),
            other if !captured => {
                if let Some(Session::Running { game, .. }) = self.session.as_mut() {
                    game.handle_window_event(&other);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn save_garden(game: &GardenGame, path: &Path) {
    let result = game
        .export_save()
        .map_err(anyhow::Error::from)
        .and_then(|json| Ok(std::fs::write(path, json)?));
    match result {
        Ok(()) => log::info!("Saved garden to {}", path.display()),
        Err(err) => log::error!("Failed to save garden: {:#}", err),
    }
}

fn load_garden(game: &mut GardenGame, path: &Path) {
    let result = std::fs::read_to_string(path)
        .map_err(anyhow::Error::from)
        .and_then(|json| Ok(game.import_save(&json)?));
    match result {
        Ok(()) => log::info!("Loaded garden from {}", path.display()),
        Err(err) => log::error!("Failed to load garden: {:#}", err),
    }
}
