//! Sinkhole entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use sinkhole::consts::NOMINAL_DT;
    use sinkhole::renderer::Renderer;
    use sinkhole::sim::{DirectionalInput, World, WorldEvent};
    use sinkhole::{QualityPreset, Settings, Tuning};

    /// Game instance holding all state
    struct Game {
        world: World,
        renderer: Option<Renderer>,
        settings: Settings,
        input: DirectionalInput,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64, settings: Settings) -> Self {
            let mut tuning = Tuning::default();
            if let Some(count) = settings.object_count {
                tuning.object_count = count;
            }
            Self {
                world: World::new(tuning, seed),
                renderer: None,
                settings,
                input: DirectionalInput::default(),
                last_time: 0.0,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Advance the world one frame
        fn update(&mut self, dt: f32, time: f64) {
            for event in self.world.tick(&self.input, dt) {
                if let WorldEvent::Swallowed { kind, .. } = event {
                    log::debug!("HUD: swallowed a {}", kind.as_str());
                }
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
        fn render(&mut self, dt: f32) {
            if let Some(ref mut renderer) = self.renderer {
                match renderer.render(&self.world, &self.settings, dt) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        renderer.reconfigure();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let stats = self.world.stats();
            let hole = self.world.hole_snapshot();

            if let Some(el) = document.query_selector("#hud-swallowed .hud-value").ok().flatten() {
                el.set_text_content(Some(&stats.count.to_string()));
            }
            if let Some(el) = document.query_selector("#hud-radius .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!("{:.1}", hole.radius)));
            }
            if let Some(el) = document.get_element_by_id("hud-fps") {
                let class = if self.settings.show_fps { "hud-item" } else { "hud-item hidden" };
                let _ = el.set_attribute("class", class);
            }
            if let Some(el) = document.query_selector("#hud-fps .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.fps.to_string()));
            }
        }
    }

    /// Value of `?key=...` in the page URL
    fn query_param(window: &web_sys::Window, key: &str) -> Option<String> {
        let search = window.location().search().ok()?;
        search
            .trim_start_matches('?')
            .split('&')
            .find_map(|pair| pair.strip_prefix(key)?.strip_prefix('='))
            .map(str::to_owned)
    }

    /// Seed from `?seed=N`, else the clock
    fn seed_from_location(window: &web_sys::Window) -> u64 {
        query_param(window, "seed")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| js_sys::Date::now() as u64)
    }

    /// Stored settings, with `?quality=low|medium|high` taking precedence
    fn settings_from_location(window: &web_sys::Window) -> Settings {
        let mut settings = Settings::load();
        if let Some(value) = query_param(window, "quality") {
            match QualityPreset::parse(&value) {
                Some(quality) => settings.quality = quality,
                None => log::warn!("Unknown quality preset {value:?}"),
            }
        }
        settings
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Sinkhole starting...");

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

        let (width, height) = fit_canvas(&window, &canvas);

        let seed = seed_from_location(&window);
        let game = Rc::new(RefCell::new(Game::new(seed, settings_from_location(&window))));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&format!("Failed to create surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("Failed to get adapter: {e}")))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let renderer = Renderer::new(surface, &adapter, width, height)
            .await
            .map_err(|e| JsValue::from_str(&format!("Failed to create device: {e}")))?;
        game.borrow_mut().renderer = Some(renderer);

        setup_input_handlers(&window, game.clone());
        setup_focus_handlers(&window, &document, game.clone());
        setup_resize_handler(&window, canvas, game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Start frame loop
        request_animation_frame(game);

        log::info!("Sinkhole running!");
        Ok(())
    }

    /// Size the canvas backing store to its CSS size times the pixel ratio
    fn fit_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    fn setup_input_handlers(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                if g.input.apply_key(&key, true) {
                    // Arrow keys would otherwise scroll the page
                    event.prevent_default();
                } else if key == "q" || key == "Q" {
                    g.settings.cycle_quality();
                    g.settings.save();
                    log::info!("Quality: {}", g.settings.quality.as_str());
                } else if key == "f" || key == "F" {
                    g.settings.show_fps = !g.settings.show_fps;
                    g.settings.save();
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                game.borrow_mut().input.apply_key(&event.key(), false);
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Key-up events are lost while unfocused, so drop held keys
    fn setup_focus_handlers(window: &web_sys::Window, document: &web_sys::Document, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().input.clear();
                    log::info!("Input cleared (tab hidden)");
                }
            });
            let _ = document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().input.clear();
                log::info!("Input cleared (window blur)");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize_handler(window: &web_sys::Window, canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window_clone = window.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::UiEvent| {
            let (width, height) = fit_canvas(&window_clone, &canvas);
            if let Some(ref mut renderer) = game.borrow_mut().renderer {
                renderer.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time (the world caps long frames)
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                NOMINAL_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.render(dt);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Sinkhole (native) starting...");
    log::info!("Native mode runs headless - use `trunk serve` for the web version");

    let tuning = native::load_tuning(std::env::args().nth(1).as_deref());
    native::run_demo(tuning, 7);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use sinkhole::Tuning;
    use sinkhole::consts::NOMINAL_DT;
    use sinkhole::sim::{Direction, DirectionalInput, World, WorldEvent};

    /// Tuning from a JSON file, or defaults if none is given or it is invalid
    pub fn load_tuning(path: Option<&str>) -> Tuning {
        let Some(path) = path else {
            return Tuning::default();
        };
        let loaded = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()));
        match loaded {
            Ok(tuning) => {
                log::info!("Loaded tuning from {path}");
                tuning
            }
            Err(e) => {
                log::warn!("Using default tuning ({path}: {e})");
                Tuning::default()
            }
        }
    }

    /// Drive the hole along a fixed square sweep and report what it ate
    pub fn run_demo(tuning: Tuning, seed: u64) {
        let mut world = World::new(tuning, seed);
        let script = [
            (&[Direction::Right][..], 1.5),
            (&[Direction::Down][..], 1.5),
            (&[Direction::Left][..], 3.0),
            (&[Direction::Up][..], 3.0),
            (&[Direction::Right, Direction::Down][..], 2.0),
            (&[][..], 1.0),
        ];

        for (keys, seconds) in script {
            let input = DirectionalInput::holding(keys);
            let frames = (seconds / NOMINAL_DT).round() as usize;
            for _ in 0..frames {
                for event in world.tick(&input, NOMINAL_DT) {
                    if let WorldEvent::Lost { id, kind } = event {
                        log::info!("Lost {} #{id}", kind.as_str());
                    }
                }
            }
        }

        let stats = world.stats();
        let hole = world.hole_snapshot();
        println!(
            "Swallowed {} objects ({:.1} mass), lost {}, hole radius {:.2} at ({:.1}, {:.1}), {} left",
            stats.count,
            stats.mass,
            stats.lost,
            hole.radius,
            hole.position.x,
            hole.position.y,
            world.object_count()
        );
    }
}
