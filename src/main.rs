//! Bit Jumper entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, PointerEvent, TouchEvent};

    use bit_jumper::platform::{haptics, query_param, time};
    use bit_jumper::renderer::{RenderOptions, RenderState, build_scene};
    use bit_jumper::result::{RunSummary, finalize};
    use bit_jumper::scoring::format_time;
    use bit_jumper::sim::{GamePhase, TickInput, World, tick};
    use bit_jumper::snapshot::{HudSnapshot, SnapshotThrottle};
    use bit_jumper::submit::{
        FetchSubmitter, LogSubmitter, ScoreSubmitter, SessionContext, SubmitStatus, submit_run,
    };
    use bit_jumper::{BestScores, Difficulty, Settings};

    /// Game instance holding all state
    struct Game {
        world: World,
        difficulty: Difficulty,
        render_state: Option<RenderState>,
        settings: Settings,
        best: BestScores,
        session: SessionContext,
        submitter: Box<dyn ScoreSubmitter>,
        /// Submission status of the current run
        status: SubmitStatus,
        last_time: f64,
        input: TickInput,
        /// Logical viewport (CSS pixels)
        view: (f32, f32),
        throttle: SnapshotThrottle,
        last_phase: GamePhase,
        summary: Option<RunSummary>,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        /// Pending requestAnimationFrame handle
        raf_id: Option<i32>,
        stopped: bool,
    }

    impl Game {
        fn new(seed: u64, difficulty: Difficulty, view: (f32, f32)) -> Self {
            let settings = Settings::load();
            let session = SessionContext::load();
            let submitter: Box<dyn ScoreSubmitter> = if session.session_id.is_some() {
                Box::new(FetchSubmitter::new(settings.scores_url()))
            } else {
                Box::new(LogSubmitter)
            };

            Self {
                world: World::start(seed, difficulty, view.0, view.1),
                difficulty,
                render_state: None,
                settings,
                best: BestScores::load(),
                session,
                submitter,
                status: SubmitStatus::new(),
                last_time: 0.0,
                input: TickInput::default(),
                view,
                throttle: SnapshotThrottle::new(),
                last_phase: GamePhase::Countdown,
                summary: None,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
                raf_id: None,
                stopped: false,
            }
        }

        /// Step the simulation by the frame delta
        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            self.last_time = time;

            tick(&mut self.world, &self.input, dt);
            haptics::play(&self.world.events, self.settings.haptics);

            if let Some(summary) = finalize(&mut self.world, &mut self.best) {
                submit_run(self.submitter.as_ref(), &self.session, &summary, &self.status);
                self.summary = Some(summary);
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            let options = RenderOptions::from_settings(&self.settings);
            let vertices = build_scene(&self.world, &options, (time / 1000.0) as f32);
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&vertices) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        let (w, h) = render_state.size;
                        render_state.resize(w, h, self.view);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM, at most every snapshot interval
        fn update_hud(&mut self, time: f64) {
            let phase_changed = self.world.phase != self.last_phase;
            self.last_phase = self.world.phase;
            if !self.throttle.ready(time, phase_changed) {
                return;
            }

            let status = self.status.get();
            let snap = HudSnapshot::capture(
                &self.world,
                self.best.get(self.difficulty),
                status.as_deref(),
            );

            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let set_text = |selector: &str, text: &str| {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    el.set_text_content(Some(text));
                }
            };

            set_text("#hud-score .hud-value", &snap.score.to_string());
            set_text("#hud-best .hud-value", &snap.best.to_string());
            set_text("#hud-time .hud-value", &snap.time);
            set_text("#hud-expression", &snap.expression);
            set_text("#hud-fps .hud-value", &self.fps.to_string());
            set_text("#hud-status", snap.status.as_deref().unwrap_or(""));

            // Pattern with the collected part marked
            let (done, todo) = snap.pattern.split_at(snap.pattern_index.min(snap.pattern.len()));
            set_text("#hud-pattern .done", done);
            set_text("#hud-pattern .todo", todo);

            if let Some(el) = document.get_element_by_id("hud-fps") {
                let class = if self.settings.show_fps { "hud-item" } else { "hud-item hidden" };
                let _ = el.set_attribute("class", class);
            }

            // Show/hide game over
            if let Some(el) = document.get_element_by_id("game-over") {
                if snap.phase.is_terminal() {
                    let _ = el.set_attribute("class", "");
                    let title = if snap.phase == GamePhase::Won {
                        "Pattern complete!"
                    } else {
                        "Game over"
                    };
                    set_text("#game-over-title", title);
                    set_text("#final-score", &snap.score.to_string());
                    if let Some(summary) = &self.summary {
                        set_text("#final-points", &summary.points().to_string());
                        set_text("#final-time", &format_time(summary.time_ms as f64));
                    }
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }

        /// Reset game state for restart
        fn restart(&mut self) {
            let seed = time::run_seed();
            self.world = World::start(seed, self.difficulty, self.view.0, self.view.1);
            self.input = TickInput::default();
            self.summary = None;
            self.last_time = 0.0;
            self.status = SubmitStatus::new();
            log::info!("Game restarted with seed: {}", seed);
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Bit Jumper starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let view = (canvas.client_width() as f32, canvas.client_height() as f32);
        let (width, height) = physical_size(&canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        let difficulty = Difficulty::normalize(query_param("difficulty").as_deref());
        let seed = time::run_seed();
        let game = Rc::new(RefCell::new(Game::new(seed, difficulty, view)));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&format!("Failed to create surface: {}", e)))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("Failed to get adapter: {}", e)))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height, view)
            .await
            .map_err(|e| JsValue::from_str(&format!("Failed to create device: {}", e)))?;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&canvas, game.clone());
        setup_restart_button(game.clone());
        setup_lifecycle(&canvas, game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game);

        log::info!("Bit Jumper running ({})", difficulty);
        Ok(())
    }

    /// Canvas backing store size in device pixels
    fn physical_size(canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
        (
            ((canvas.client_width() as f64 * dpr) as u32).max(1),
            ((canvas.client_height() as f64 * dpr) as u32).max(1),
        )
    }

    /// Horizontal pointer position as a fraction of the canvas width
    fn x_norm(canvas: &HtmlCanvasElement, client_x: i32) -> f32 {
        let rect = canvas.get_bounding_client_rect();
        if rect.width() <= 0.0 {
            return 0.5;
        }
        ((client_x as f64 - rect.left()) / rect.width()).clamp(0.0, 1.0) as f32
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Pointer move (mouse, pen and touch); last write wins
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                game.borrow_mut().input.x_norm = x_norm(&canvas_clone, event.client_x());
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer down: steer, or restart after game over
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                if g.world.phase.is_terminal() {
                    g.restart();
                }
                g.input.x_norm = x_norm(&canvas_clone, event.client_x());
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keep the page from scrolling while steering
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let handle = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(handle, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => game.borrow_mut().raf_id = Some(id),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.raf_id = None;
            if g.stopped {
                return;
            }

            g.update(time);
            g.render(time);
            g.update_hud(time);
        }

        request_animation_frame(game);
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().restart();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Page lifecycle: stop the loop on pagehide, skip the hidden-tab gap,
    /// follow canvas resizes
    fn setup_lifecycle(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.stopped = true;
                if let (Some(id), Some(window)) = (g.raf_id.take(), web_sys::window()) {
                    let _ = window.cancel_animation_frame(id);
                }
                log::info!("Page hidden, game loop stopped");
            });
            let _ = window
                .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Restart the loop when the page comes back from the back/forward cache
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let resume = {
                    let mut g = game.borrow_mut();
                    let resume = g.stopped;
                    g.stopped = false;
                    g.last_time = 0.0;
                    resume
                };
                if resume {
                    request_animation_frame(game.clone());
                }
            });
            let _ = window
                .add_event_listener_with_callback("pageshow", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(document) = window.document() {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Visible {
                    // Don't feed the hidden time into the next tick
                    game.borrow_mut().last_time = 0.0;
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        {
            let canvas = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let view = (canvas.client_width() as f32, canvas.client_height() as f32);
                let (width, height) = physical_size(&canvas);
                canvas.set_width(width);
                canvas.set_height(height);

                let mut g = game.borrow_mut();
                // The running world keeps its size; the next run uses the new one
                g.view = view;
                if let Some(render_state) = g.render_state.as_mut() {
                    let world_view = (g.world.width, g.world.height);
                    render_state.resize(width, height, world_view);
                }
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless run with a simple autopilot, for balancing and smoke testing
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use bit_jumper::platform::{query_param, time};
    use bit_jumper::result::finalize;
    use bit_jumper::scoring::format_time;
    use bit_jumper::sim::{TickInput, World, tick};
    use bit_jumper::submit::{LogSubmitter, SessionContext, SubmitStatus, submit_run};
    use bit_jumper::{BestScores, Difficulty};

    env_logger::init();
    log::info!("Bit Jumper (native) starting...");

    let difficulty = Difficulty::normalize(query_param("difficulty").as_deref());
    let seed = query_param("seed")
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(time::run_seed);

    let mut world = World::start(seed, difficulty, 390.0, 844.0);
    let dt = 1.0 / 60.0;
    let max_ticks = 60 * 180;

    for _ in 0..max_ticks {
        let input = autopilot(&world);
        tick(&mut world, &input, dt);
        if world.phase.is_terminal() {
            break;
        }
    }

    let mut best = BestScores::load();
    let Some(summary) = finalize(&mut world, &mut best) else {
        log::info!(
            "Run still going after {} (score {}, bits {}/{})",
            format_time(world.play_ms),
            world.score,
            world.pattern_index,
            world.pattern().len()
        );
        return;
    };

    println!(
        "seed={} difficulty={} won={} score={}{} time={} errors={} points={} fallbacks={}",
        seed,
        difficulty,
        summary.won,
        summary.score,
        if summary.new_best { " (best)" } else { "" },
        format_time(summary.time_ms as f64),
        summary.errors,
        summary.points(),
        world.spacing_fallbacks
    );

    let status = SubmitStatus::new();
    submit_run(&LogSubmitter, &SessionContext::load(), &summary, &status);
    if let Some(line) = status.get() {
        log::info!("Submission: {}", line);
    }

    fn autopilot(world: &World) -> TickInput {
        use bit_jumper::consts::COLLECTIBLE_LIFT;
        use bit_jumper::sim::{CollectibleKind, Platform};

        let wanted = world.wanted_bit();
        let feet = world.player.pos.y + world.player.radius;

        // A platform is bad if it carries a bit we don't want
        let carries_wrong_bit = |p: &Platform| {
            world.collectibles.iter().any(|c| {
                matches!(c.kind, CollectibleKind::Bit(b) if Some(b) != wanted)
                    && (c.pos.x - p.center_x()).abs() < 1.0
                    && (c.pos.y + COLLECTIBLE_LIFT - p.y).abs() < 1.0
            })
        };

        // Next platform up that is safe to land on
        let target = world
            .platforms
            .iter()
            .filter(|p| !p.is_broken() && p.y < feet && !carries_wrong_bit(p))
            .max_by(|a, b| a.y.total_cmp(&b.y));

        match target {
            Some(p) => TickInput {
                x_norm: p.center_x() / world.width,
            },
            None => TickInput {
                x_norm: world.player.pos.x / world.width,
            },
        }
    }
}
