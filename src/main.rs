//! Arena Survival entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{EventTarget, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent};

    use arena_survival::platform::dom::{self, DomOverlay, DomPointerLock};
    use arena_survival::platform::{FrameClock, PlatformError};
    use arena_survival::renderer::{RenderError, RenderState, build_scene};
    use arena_survival::sim::PointerCapture;
    use arena_survival::settings::{QualityPreset, UnknownPreset};
    use arena_survival::{Session, Settings, Tuning};

    const CANVAS_ID: &str = "canvas";
    const COARSE_TICK_MS: i32 = 1000;

    type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

    /// Game instance holding all state
    struct Game {
        session: Session,
        render_state: Option<RenderState>,
        clock: FrameClock,
        overlay: DomOverlay,
        capture: DomPointerLock,
        canvas: HtmlCanvasElement,
        /// Health revision last shown on the HUD
        hud_revision: u64,
        frames_this_second: u32,
        fps: u32,
    }

    impl Game {
        fn key_down(&mut self, code: &str) -> bool {
            let Game {
                session,
                overlay,
                capture,
                ..
            } = self;
            session.key_down(code, overlay, capture)
        }

        fn overlay_clicked(&mut self) {
            let Game {
                session,
                overlay,
                capture,
                ..
            } = self;
            session.overlay_clicked(overlay, capture);
        }

        fn pointer_lock_changed(&mut self) {
            if dom::is_pointer_locked() {
                self.session.lock_acquired(&mut self.overlay);
            } else {
                self.session.lock_lost(&mut self.overlay);
            }
        }

        /// One animation frame: step, render, refresh the HUD if health moved
        fn frame(&mut self, time: f64) {
            let elapsed = self.clock.tick(time);
            self.session.frame(elapsed);
            self.render();
            self.frames_this_second += 1;

            let revision = self.session.health_channel().revision();
            if revision != self.hud_revision {
                self.hud_revision = revision;
                self.update_hud();
            }
        }

        /// 1 Hz: day-night, invincibility countdown, FPS
        fn coarse_tick(&mut self) {
            self.session.coarse_tick();
            self.fps = std::mem::take(&mut self.frames_this_second);
            self.update_hud();
        }

        /// Render the current frame (runs even while paused)
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                let frame = build_scene(
                    &self.session.state,
                    &self.session.look,
                    render_state.aspect(),
                    &self.session.settings,
                );
                match render_state.render(&frame) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        fn resize(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (width, height) = canvas_pixel_size(&window, &self.canvas);
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            if let Some(ref mut render_state) = self.render_state {
                render_state.resize(width, height);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let hud = self.session.hud();

            if let Some(el) = html_element(&document, "health-fill") {
                dom::set_style(&el, "width", &hud.health_width());
            }
            if let Some(el) = document.get_element_by_id("health-text") {
                el.set_text_content(Some(&hud.health_label));
            }
            if let Some(el) = html_element(&document, "invincibility") {
                match hud.invincibility_text() {
                    Some(text) => {
                        dom::set_display(&el, "");
                        el.set_text_content(Some(&text));
                    }
                    None => dom::set_display(&el, "none"),
                }
            }
            if let Some(el) = html_element(&document, "hud-fps") {
                if self.session.settings.show_fps {
                    dom::set_display(&el, "");
                    el.set_text_content(Some(&format!("{} fps", self.fps)));
                } else {
                    dom::set_display(&el, "none");
                }
            }
        }
    }

    /// An installed DOM listener, kept so teardown can remove it
    struct Listener {
        target: EventTarget,
        event: &'static str,
        closure: Closure<dyn FnMut(web_sys::Event)>,
    }

    /// Everything that keeps the game alive in the page
    struct Runtime {
        game: Rc<RefCell<Game>>,
        listeners: Vec<Listener>,
        frame_callback: FrameCallback,
        frame_id: Rc<Cell<Option<i32>>>,
        interval: Option<(i32, Closure<dyn FnMut()>)>,
    }

    thread_local! {
        static RUNTIME: RefCell<Option<Runtime>> = const { RefCell::new(None) };
    }

    fn html_element(document: &web_sys::Document, id: &str) -> Option<HtmlElement> {
        document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    fn canvas_pixel_size(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        (width.max(1), height.max(1))
    }

    fn listen<F>(listeners: &mut Vec<Listener>, target: &EventTarget, event: &'static str, handler: F)
    where
        F: FnMut(web_sys::Event) + 'static,
    {
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
        match target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
            Ok(()) => listeners.push(Listener {
                target: target.clone(),
                event,
                closure,
            }),
            Err(e) => log::warn!("Could not listen for {}: {:?}", event, e),
        }
    }

    async fn create_renderer(canvas: &HtmlCanvasElement, width: u32, height: u32) -> Result<RenderState, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        RenderState::new(surface, &adapter, width, height).await
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger already initialized: {}", e).into());
        }

        log::info!("Arena Survival starting...");

        let window = web_sys::window().ok_or(PlatformError::NoWindow).map_err(to_js)?;
        let document = window.document().ok_or(PlatformError::NoDocument).map_err(to_js)?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            if let Err(e) = loading.set_attribute("class", "hidden") {
                log::warn!("Could not hide loading indicator: {:?}", e);
            }
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id(CANVAS_ID)
            .and_then(|el| el.dyn_into().ok())
            .ok_or_else(|| PlatformError::MissingElement(CANVAS_ID.to_string()))
            .map_err(to_js)?;

        let (width, height) = canvas_pixel_size(&window, &canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        let overlay = DomOverlay::from_document(&document).map_err(to_js)?;

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let mut session = Session::new(seed, Tuning::load(), Settings::load());
        log::info!("Game initialized with seed: {}", seed);

        // A missing GPU leaves the overlay and simulation usable
        let render_state = match create_renderer(&canvas, width, height).await {
            Ok(render_state) => Some(render_state),
            Err(e) => {
                log::error!("Rendering disabled: {}", e);
                None
            }
        };

        let mut overlay = overlay;
        session.mount(&mut overlay);
        let instructions: EventTarget = overlay.instructions().clone().into();

        let game = Rc::new(RefCell::new(Game {
            session,
            render_state,
            clock: FrameClock::new(),
            overlay,
            capture: DomPointerLock::new(CANVAS_ID),
            canvas,
            hud_revision: 0,
            frames_this_second: 0,
            fps: 0,
        }));
        game.borrow().update_hud();

        let listeners = setup_input_handlers(&window, &document, &instructions, &game);
        let interval = start_coarse_tick(&window, &game);
        let (frame_callback, frame_id) = start_frame_loop(&game);

        RUNTIME.with(|slot| {
            *slot.borrow_mut() = Some(Runtime {
                game,
                listeners,
                frame_callback,
                frame_id,
                interval,
            })
        });

        log::info!("Arena Survival running!");
        Ok(())
    }

    fn to_js(e: PlatformError) -> JsValue {
        JsValue::from_str(&e.to_string())
    }

    fn setup_input_handlers(
        window: &web_sys::Window,
        document: &web_sys::Document,
        instructions: &EventTarget,
        game: &Rc<RefCell<Game>>,
    ) -> Vec<Listener> {
        let mut listeners = Vec::new();
        let doc: &EventTarget = document.as_ref();
        let win: &EventTarget = window.as_ref();

        {
            let game = game.clone();
            listen(&mut listeners, doc, "keydown", move |event| {
                if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                    if game.borrow_mut().key_down(&event.code()) {
                        event.prevent_default();
                    }
                }
            });
        }
        {
            let game = game.clone();
            listen(&mut listeners, doc, "keyup", move |event| {
                if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                    game.borrow_mut().session.key_up(&event.code());
                }
            });
        }
        {
            let game = game.clone();
            listen(&mut listeners, doc, "mousedown", move |event| {
                if let Some(event) = event.dyn_ref::<MouseEvent>() {
                    game.borrow_mut().session.mouse_down(event.button());
                }
            });
        }
        {
            let game = game.clone();
            listen(&mut listeners, doc, "mousemove", move |event| {
                if let Some(event) = event.dyn_ref::<MouseEvent>() {
                    game.borrow_mut()
                        .session
                        .mouse_move(event.movement_x() as f32, event.movement_y() as f32);
                }
            });
        }
        {
            let game = game.clone();
            listen(&mut listeners, instructions, "click", move |_event| {
                game.borrow_mut().overlay_clicked();
            });
        }
        {
            let game = game.clone();
            listen(&mut listeners, doc, "pointerlockchange", move |_event| {
                game.borrow_mut().pointer_lock_changed();
            });
        }
        {
            let game = game.clone();
            listen(&mut listeners, doc, "pointerlockerror", move |_event| {
                let mut g = game.borrow_mut();
                let Game { session, overlay, .. } = &mut *g;
                session.lock_failed(overlay);
            });
        }
        {
            let game = game.clone();
            listen(&mut listeners, win, "blur", move |_event| {
                game.borrow_mut().session.focus_lost();
            });
        }
        {
            let game = game.clone();
            listen(&mut listeners, win, "resize", move |_event| {
                game.borrow_mut().resize();
            });
        }
        listen(&mut listeners, win, "pagehide", move |_event| {
            teardown();
        });

        listeners
    }

    fn start_coarse_tick(window: &web_sys::Window, game: &Rc<RefCell<Game>>) -> Option<(i32, Closure<dyn FnMut()>)> {
        let game = game.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            game.borrow_mut().coarse_tick();
        });
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            COARSE_TICK_MS,
        ) {
            Ok(id) => Some((id, closure)),
            Err(e) => {
                log::error!("Could not start the 1 Hz tick: {:?}", e);
                None
            }
        }
    }

    fn request_animation_frame(callback: &FrameCallback) -> Option<i32> {
        let window = web_sys::window()?;
        let slot = callback.borrow();
        let closure = slot.as_ref()?;
        window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .ok()
    }

    fn start_frame_loop(game: &Rc<RefCell<Game>>) -> (FrameCallback, Rc<Cell<Option<i32>>>) {
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let frame_id = Rc::new(Cell::new(None));
        {
            let game = game.clone();
            let next = callback.clone();
            let id = frame_id.clone();
            *callback.borrow_mut() = Some(Closure::new(move |time: f64| {
                game.borrow_mut().frame(time);
                id.set(request_animation_frame(&next));
            }));
        }
        frame_id.set(request_animation_frame(&callback));
        (callback, frame_id)
    }

    /// Cancel the frame loop and the 1 Hz tick, remove every listener and
    /// release the pointer. Safe to call more than once.
    pub fn set_quality(name: &str) -> Result<(), JsValue> {
        let preset: QualityPreset = name.parse().map_err(|e: UnknownPreset| JsValue::from_str(&e.to_string()))?;
        RUNTIME.with(|slot| match slot.borrow().as_ref() {
            Some(runtime) => match runtime.game.try_borrow_mut() {
                Ok(mut game) => {
                    game.session.set_quality(preset);
                    Ok(())
                }
                Err(_) => Err(JsValue::from_str("game is busy")),
            },
            None => Err(JsValue::from_str("game is not running")),
        })
    }

    pub fn teardown() {
        let Some(runtime) = RUNTIME.with(|slot| slot.borrow_mut().take()) else {
            return;
        };
        let Some(window) = web_sys::window() else {
            return;
        };

        if let Some(id) = runtime.frame_id.take() {
            if let Err(e) = window.cancel_animation_frame(id) {
                log::warn!("Could not cancel animation frame {}: {:?}", id, e);
            }
        }
        let frame_closure = runtime.frame_callback.borrow_mut().take();

        if let Some((id, _)) = &runtime.interval {
            window.clear_interval_with_handle(*id);
        }

        for listener in &runtime.listeners {
            if let Err(e) = listener
                .target
                .remove_event_listener_with_callback(listener.event, listener.closure.as_ref().unchecked_ref())
            {
                log::warn!("Could not remove {} listener: {:?}", listener.event, e);
            }
        }

        if let Ok(mut game) = runtime.game.try_borrow_mut() {
            if game.session.gate().is_locked() {
                game.capture.release_lock();
            }
        }

        log::info!("Arena Survival torn down ({} listeners removed)", runtime.listeners.len());

        // Closures may be on the call stack right now (pagehide); drop them later
        wasm_bindgen_futures::spawn_local(async move {
            drop(frame_closure);
            drop(runtime);
        });
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

/// Switch the graphics preset by name ("low", "medium", "high") and save it
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn set_quality(name: &str) -> Result<(), JsValue> {
    wasm_game::set_quality(name)
}

/// Stop the game and detach it from the page
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn teardown() {
    wasm_game::teardown();
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::collections::BTreeMap;

    use arena_survival::platform::{CoarseTicker, HeadlessOverlay, InstantLock};
    use arena_survival::sim::{GameEvent, pickup};
    use arena_survival::{Session, Settings, Tuning, consts::NOMINAL_DT};

    const SEED: u64 = 42;
    const DURATION_SECS: f32 = 10.0;

    fn forward_lock_events(session: &mut Session, overlay: &mut HeadlessOverlay, capture: &mut InstantLock) {
        match capture.take_event() {
            Some(true) => session.lock_acquired(overlay),
            Some(false) => session.lock_lost(overlay),
            None => {}
        }
    }

    fn event_name(event: &GameEvent) -> &'static str {
        match event {
            GameEvent::Jumped { .. } => "jumped",
            GameEvent::Landed { .. } => "landed",
            GameEvent::LeftSupport => "left support",
            GameEvent::Attack(_) => "attack",
            GameEvent::PowerUpCollected { .. } => "power-up",
            GameEvent::WeaponEquipped { .. } => "equip",
            GameEvent::HealthRefilled => "refill",
            GameEvent::InvincibilityGranted { .. } => "invincible",
            GameEvent::DamageAbsorbed => "absorbed",
            GameEvent::DamageTaken { .. } => "damage",
            GameEvent::HealthDepleted => "depleted",
            GameEvent::TorchToggled { .. } => "torch",
        }
    }

    /// Scripted session: walk toward the nearest power-up, jump, fight, take a hit
    pub fn run() {
        let mut session = Session::new(SEED, Tuning::load(), Settings::load());
        let mut overlay = HeadlessOverlay::default();
        let mut capture = InstantLock::default();
        let mut ticker = CoarseTicker::new();

        session.mount(&mut overlay);
        session.overlay_clicked(&mut overlay, &mut capture);
        forward_lock_events(&mut session, &mut overlay, &mut capture);
        log::info!("Gate: {:?}, overlay: {:?}", session.gate().state(), overlay.view);

        let mut counts: BTreeMap<&'static str, u32> = BTreeMap::new();
        let frames = (DURATION_SECS / NOMINAL_DT) as u32;

        for frame in 0..frames {
            let t = frame as f32 * NOMINAL_DT;
            let at = |s: f32| (t - s).abs() < NOMINAL_DT / 2.0;
            let mut press = Vec::new();

            if frame == 0 {
                session.key_down("KeyW", &mut overlay, &mut capture);
                session.key_down("ShiftLeft", &mut overlay, &mut capture);
            }
            if at(1.0) || at(1.3) {
                press.push("Space");
            }
            if at(3.0) {
                session.mouse_down(0);
            }
            if at(3.5) {
                session.mouse_down(1);
            }
            if at(4.0) {
                press.push("KeyF");
            }
            if at(5.0) {
                session.key_down("KeyC", &mut overlay, &mut capture);
            }
            if at(6.0) {
                session.key_up("KeyC");
                let outcome = session.damage_player(25);
                log::info!("Took a hit at t={:.1}s: {:?}", t, outcome);
            }
            for code in press {
                session.key_down(code, &mut overlay, &mut capture);
                session.key_up(code);
            }

            // Steer at the closest power-up still lying around
            let position = session.state.player.position;
            let target = pickup::active(&session.state.world.power_ups)
                .map(|p| p.position)
                .min_by(|a, b| {
                    a.distance_squared(position)
                        .total_cmp(&b.distance_squared(position))
                });
            if let Some(target) = target {
                let to = target - position;
                session.look.yaw = (-to.x).atan2(-to.z);
            }

            for event in session.frame(NOMINAL_DT as f64) {
                *counts.entry(event_name(&event)).or_default() += 1;
            }
            for _ in 0..ticker.advance(NOMINAL_DT) {
                session.coarse_tick();
            }
        }

        let state = &session.state;
        let hud = session.hud();
        log::info!(
            "After {:.1}s ({} frames): position ({:.2}, {:.2}, {:.2}), health {}, weapon {}, torch {}",
            state.clock,
            state.frame,
            state.player.position.x,
            state.player.position.y,
            state.player.position.z,
            hud.health_label,
            state.combat.equipped.map_or("none", |w| w.name()),
            if state.torch_on { "on" } else { "off" },
        );
        log::info!(
            "Day-night: {} at {:.0}s",
            state.day_night.phase_name(&state.tuning.day_night),
            state.day_night.current_time
        );
        for (name, count) in &counts {
            log::info!("  {:<14} {}", name, count);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Arena Survival (native) starting...");
    log::info!("Native mode runs a scripted headless session - run with `trunk serve` for the web version");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
