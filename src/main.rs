//! Starlit Letter entry point
//!
//! Wires the DOM to the experience core and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, DragEvent, Element, HtmlCanvasElement, MouseEvent,
        TouchEvent,
    };

    use starlit_letter::audio::MusicPlayer;
    use starlit_letter::consts::*;
    use starlit_letter::content::{FINAL_MESSAGE, MUSIC_DISCS, SCRATCH_HINT};
    use starlit_letter::platform::{SessionClock, SurfaceRect, mouse_sample, touch_sample};
    use starlit_letter::sim::{
        Effect, Experience, ExperienceSnapshot, Input, PointerSample, RooftopSnapshot, Scene,
        SceneView, TurntableSnapshot, TypewriterSnapshot,
    };
    use starlit_letter::Settings;

    const FOG_COLOR: &str = "#cbd5e1";
    const HINT_COLOR: &str = "#64748b";
    const DISC_DATA_KEY: &str = "discId";

    /// Shell state: the core plus everything tied to the page
    struct App {
        experience: Experience,
        clock: SessionClock,
        music: MusicPlayer,
        /// Shooting star elements currently in the sky, by star id
        star_elements: HashMap<u32, Element>,
        backdrop_drawn: bool,
        scratch: Option<(HtmlCanvasElement, CanvasRenderingContext2d)>,
    }

    impl App {
        fn new(settings: Settings, seed: u64) -> Self {
            Self {
                experience: Experience::new(seed),
                clock: SessionClock::new(),
                music: MusicPlayer::new(settings),
                star_elements: HashMap::new(),
                backdrop_drawn: false,
                scratch: None,
            }
        }

        fn now_ms(&mut self) -> u64 {
            self.clock.now_ms(js_sys::Date::now())
        }

        /// Feed one input to the core and apply its effects
        fn dispatch(&mut self, input: Input) {
            let now = self.now_ms();
            let effects = self.experience.handle(input, now);
            self.apply(effects);
        }

        fn update(&mut self) {
            let now = self.now_ms();
            let effects = self.experience.tick(now);
            self.apply(effects);
        }

        fn apply(&mut self, effects: Vec<Effect>) {
            for effect in effects {
                match effect {
                    Effect::PlayMusic {
                        src,
                        looping,
                        volume,
                        ..
                    } => self.music.play(src, looping, volume),
                    Effect::SceneChanged(scene) => self.enter_scene(scene),
                }
            }
        }

        fn enter_scene(&mut self, scene: Scene) {
            let Some(document) = document() else { return };
            for s in Scene::ALL {
                toggle_class(&document, s.element_id(), "hidden", s != scene);
            }
            if scene == Scene::Finale {
                self.reset_scratch_surface();
            }
        }

        /// Size the canvas to its container, repaint the fog and tell the core
        fn reset_scratch_surface(&mut self) {
            let Some((canvas, ctx)) = &self.scratch else { return };
            let Some(container) = canvas.parent_element() else { return };

            let width = container.client_width().max(0) as u32;
            let height = container.client_height().max(0) as u32;
            canvas.set_width(width);
            canvas.set_height(height);

            let _ = ctx.set_global_composite_operation("source-over");
            ctx.set_fill_style_str(FOG_COLOR);
            ctx.fill_rect(0.0, 0.0, width as f64, height as f64);
            ctx.set_fill_style_str(HINT_COLOR);
            ctx.set_font("24px serif");
            ctx.set_text_align("center");
            ctx.set_text_baseline("middle");
            let _ = ctx.fill_text(SCRATCH_HINT, width as f64 / 2.0, height as f64 / 2.0);

            self.dispatch(Input::Resize { width, height });
        }

        /// Punch the brush hole into the canvas, then update the core
        fn scratch(&mut self, sample: PointerSample) {
            if !sample.pressed {
                return;
            }
            if let Some((_, ctx)) = &self.scratch {
                let _ = ctx.set_global_composite_operation("destination-out");
                ctx.begin_path();
                let _ = ctx.arc(
                    sample.x as f64,
                    sample.y as f64,
                    ERASE_RADIUS as f64,
                    0.0,
                    std::f64::consts::TAU,
                );
                ctx.fill();
            }
            self.dispatch(Input::Scratch(sample));
        }

        fn scratch_rect(&self) -> Option<SurfaceRect> {
            let (canvas, _) = self.scratch.as_ref()?;
            let rect = canvas.get_bounding_client_rect();
            Some(SurfaceRect::with_backing(
                rect.left() as f32,
                rect.top() as f32,
                rect.width() as f32,
                rect.height() as f32,
                canvas.width(),
                canvas.height(),
            ))
        }

        /// Push the current snapshot into the page
        fn render(&mut self) {
            let Some(document) = document() else { return };
            let snapshot = self.experience.snapshot();
            render_music_badge(&document, &snapshot);
            match &snapshot.view {
                SceneView::Intro(view) => render_turntable(&document, view),
                SceneView::Letter(view) => render_letter(&document, view),
                SceneView::Collection(view) => self.render_rooftop(&document, view),
                SceneView::Finale(view) => {
                    toggle_class(&document, Scene::Finale.element_id(), "revealed", view.revealed);
                    toggle_class(&document, "replay-btn", "hidden", !view.revealed);
                }
            }
        }

        fn render_rooftop(&mut self, document: &Document, view: &RooftopSnapshot) {
            let Some(sky) = document.get_element_by_id("sky") else { return };

            if !self.backdrop_drawn {
                for star in &view.backdrop {
                    if let Ok(el) = document.create_element("div") {
                        el.set_class_name("twinkle");
                        let _ = el.set_attribute(
                            "style",
                            &format!(
                                "top:{:.2}%;left:{:.2}%;width:{:.1}px;height:{:.1}px;animation-delay:{:.2}s",
                                star.top, star.left, star.size, star.size, star.delay
                            ),
                        );
                        let _ = sky.append_child(&el);
                    }
                }
                self.backdrop_drawn = true;
            }

            // Drop elements for stars that were caught or burnt out
            self.star_elements.retain(|id, el| {
                let alive = view.stars.iter().any(|s| s.id == *id);
                if !alive {
                    el.remove();
                }
                alive
            });
            for star in &view.stars {
                if self.star_elements.contains_key(&star.id) {
                    continue;
                }
                let Ok(el) = document.create_element("div") else { continue };
                el.set_class_name("shooting-star");
                let _ = el.set_attribute("data-star-id", &star.id.to_string());
                let _ = el.set_attribute(
                    "style",
                    &format!("top:{:.2}%;left:{:.2}%", star.top, star.left),
                );
                let _ = sky.append_child(&el);
                self.star_elements.insert(star.id, el);
            }

            if let Some(popup) = document.get_element_by_id("message-popup") {
                match &view.message {
                    Some(msg) => {
                        popup.set_text_content(Some(msg.text));
                        let _ = popup.set_attribute(
                            "style",
                            &format!("top:{}px;left:{}px", msg.pos.y - 60.0, msg.pos.x - 100.0),
                        );
                        let _ = popup.class_list().toggle_with_force("hidden", false);
                    }
                    None => {
                        let _ = popup.class_list().toggle_with_force("hidden", true);
                    }
                }
            }

            if let Some(bar) = document.get_element_by_id("progress-bar") {
                let _ = bar.set_attribute("style", &format!("width:{}%", view.progress_percent));
            }
            set_text(
                document,
                "progress-count",
                &format!("{} / {}", view.collected, view.needed),
            );
            toggle_class(document, "collector", "hidden", view.tree_grown);
            toggle_class(document, "tree-btn", "hidden", !view.tree_grown);
            toggle_class(document, "sparkle", "hidden", view.collected == 0 || view.tree_grown);
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn toggle_class(document: &Document, id: &str, class: &str, on: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force(class, on);
        }
    }

    fn render_music_badge(document: &Document, snapshot: &ExperienceSnapshot) {
        match snapshot.selection {
            Some(disc) => {
                set_text(document, "music-title", disc.title);
                toggle_class(document, "music-badge", "hidden", false);
            }
            None => toggle_class(document, "music-badge", "hidden", true),
        }
    }

    fn render_turntable(document: &Document, view: &TurntableSnapshot) {
        toggle_class(document, "turntable", "drag-over", view.dragging_over);
        toggle_class(document, "platter-disc", "hidden", view.placed.is_none());
        toggle_class(document, "platter-disc", "spinning", view.playing);
        toggle_class(document, "tone-arm", "playing", view.playing);
        toggle_class(document, "begin-btn", "hidden", !view.playing);
        toggle_class(document, "change-record-btn", "hidden", view.placed.is_none());

        if let Some(label) = document.get_element_by_id("platter-label") {
            let class = view.placed.map(|d| d.color).unwrap_or_default();
            label.set_class_name(&format!("label {}", class));
        }
        match (view.playing, view.placed) {
            (true, Some(disc)) => set_text(document, "now-playing", &format!("Now Playing: {}", disc.title)),
            _ => set_text(document, "now-playing", "Drag a record to play"),
        }

        for disc in MUSIC_DISCS.iter() {
            let on_shelf = view.shelf.iter().any(|d| d.id == disc.id);
            toggle_class(document, &format!("disc-{}", disc.id), "hidden", !on_shelf);
        }
    }

    fn render_letter(document: &Document, view: &TypewriterSnapshot) {
        set_text(document, "letter-text", &view.text);
        toggle_class(document, "cursor", "hidden", view.complete);
        toggle_class(document, "tear-btn", "hidden", !view.complete || view.tearing);
        toggle_class(document, Scene::Letter.element_id(), "tearing", view.tearing);
        for key in 0..TYPEWRITER_KEYS {
            toggle_class(document, &format!("key-{}", key), "pressed", view.pressed_key == Some(key));
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Debug).expect("Failed to init logger");

        let settings = Settings::load();
        log::set_max_level(settings.log_level().to_level_filter());
        log::info!("Starlit Letter starting...");

        let document = document().expect("no document");
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }
        toggle_class(&document, "app", "reduced-motion", settings.reduced_motion);

        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let app = Rc::new(RefCell::new(App::new(settings, seed)));
        log::info!("Experience initialized with seed: {}", seed);

        build_static_dom(&document);
        set_text(&document, "final-message", FINAL_MESSAGE);

        let canvas: Option<HtmlCanvasElement> = document
            .get_element_by_id("scratch-canvas")
            .and_then(|el| el.dyn_into().ok());
        if let Some(canvas) = canvas {
            let ctx = canvas
                .get_context("2d")
                .ok()
                .flatten()
                .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok());
            match ctx {
                Some(ctx) => {
                    setup_scratch_handlers(&canvas, app.clone());
                    app.borrow_mut().scratch = Some((canvas, ctx));
                }
                None => log::error!("No 2d context for the scratch card"),
            }
        }

        setup_turntable_handlers(&document, app.clone());
        setup_letter_handlers(&document, app.clone());
        setup_rooftop_handlers(&document, app.clone());
        setup_finale_handlers(&document, app.clone());
        setup_resize_handler(app.clone());

        app.borrow_mut().enter_scene(Scene::Intro);
        request_animation_frame(app);

        log::info!("Starlit Letter running!");
    }

    /// Shelf records and typewriter keys
    fn build_static_dom(document: &Document) {
        if let Some(shelf) = document.get_element_by_id("shelf") {
            for disc in MUSIC_DISCS.iter() {
                let Ok(el) = document.create_element("div") else { continue };
                el.set_id(&format!("disc-{}", disc.id));
                el.set_class_name(&format!("disc {}", disc.color));
                let _ = el.set_attribute("draggable", "true");
                let _ = el.set_attribute("data-disc-id", disc.id);
                let _ = el.set_attribute("title", disc.title);
                let _ = shelf.append_child(&el);
            }
        }
        if let Some(keys) = document.get_element_by_id("keys") {
            for key in 0..TYPEWRITER_KEYS {
                let Ok(el) = document.create_element("div") else { continue };
                el.set_id(&format!("key-{}", key));
                el.set_class_name("key");
                let _ = keys.append_child(&el);
            }
        }
    }

    fn on_click(document: &Document, id: &str, app: Rc<RefCell<App>>, input: Input) {
        let Some(el) = document.get_element_by_id(id) else {
            log::warn!("Missing #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            app.borrow_mut().dispatch(input.clone());
        });
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Disc id carried by the element under the event, if any
    fn disc_id_from_event(event: &web_sys::Event) -> Option<String> {
        let target: Element = event.target()?.dyn_into().ok()?;
        target
            .closest("[data-disc-id]")
            .ok()
            .flatten()?
            .get_attribute("data-disc-id")
    }

    fn setup_turntable_handlers(document: &Document, app: Rc<RefCell<App>>) {
        // Shelf: click to place, drag to carry the id
        if let Some(shelf) = document.get_element_by_id("shelf") {
            {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                    if let Some(disc_id) = disc_id_from_event(&event) {
                        app.borrow_mut().dispatch(Input::PlaceDisc { disc_id });
                    }
                });
                let _ = shelf.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
            {
                let closure = Closure::<dyn FnMut(_)>::new(move |event: DragEvent| {
                    let Some(disc_id) = disc_id_from_event(&event) else { return };
                    if let Some(dt) = event.data_transfer() {
                        let _ = dt.set_data(DISC_DATA_KEY, &disc_id);
                        dt.set_effect_allowed("move");
                    }
                });
                let _ = shelf.add_event_listener_with_callback("dragstart", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        if let Some(turntable) = document.get_element_by_id("turntable") {
            {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: DragEvent| {
                    event.prevent_default();
                    app.borrow_mut().dispatch(Input::DragOver(true));
                });
                let _ = turntable.add_event_listener_with_callback("dragover", closure.as_ref().unchecked_ref());
                closure.forget();
            }
            {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: DragEvent| {
                    app.borrow_mut().dispatch(Input::DragOver(false));
                });
                let _ = turntable.add_event_listener_with_callback("dragleave", closure.as_ref().unchecked_ref());
                closure.forget();
            }
            {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: DragEvent| {
                    event.prevent_default();
                    let disc_id = event
                        .data_transfer()
                        .and_then(|dt| dt.get_data(DISC_DATA_KEY).ok())
                        .unwrap_or_default();
                    let mut a = app.borrow_mut();
                    a.dispatch(Input::DragOver(false));
                    if !disc_id.is_empty() {
                        a.dispatch(Input::PlaceDisc { disc_id });
                    }
                });
                let _ = turntable.add_event_listener_with_callback("drop", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        on_click(document, "change-record-btn", app.clone(), Input::ChangeRecord);
        on_click(document, "begin-btn", app, Input::Begin);
    }

    fn setup_letter_handlers(document: &Document, app: Rc<RefCell<App>>) {
        on_click(document, "tear-btn", app, Input::Tear);
    }

    fn setup_rooftop_handlers(document: &Document, app: Rc<RefCell<App>>) {
        // One listener for every shooting star
        if let Some(sky) = document.get_element_by_id("sky") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                    return;
                };
                let id = target
                    .closest(".shooting-star")
                    .ok()
                    .flatten()
                    .and_then(|el| el.get_attribute("data-star-id"))
                    .and_then(|id| id.parse::<u32>().ok());
                if let Some(id) = id {
                    event.stop_propagation();
                    app.borrow_mut().dispatch(Input::CollectStar {
                        id,
                        x: event.client_x() as f32,
                        y: event.client_y() as f32,
                    });
                }
            });
            let _ = sky.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        on_click(document, "tree-btn", app, Input::ClickTree);
    }

    fn setup_finale_handlers(document: &Document, app: Rc<RefCell<App>>) {
        if let Some(btn) = document.get_element_by_id("replay-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                if !app.borrow().experience.can_replay() {
                    log::debug!("Replay ignored, card not revealed yet");
                    return;
                }
                if let Some(window) = web_sys::window() {
                    let _ = window.location().reload();
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_scratch_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        for event_name in ["mousemove", "mousedown"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                let Some(rect) = a.scratch_rect() else { return };
                let sample = mouse_sample(
                    &rect,
                    event.client_x() as f32,
                    event.client_y() as f32,
                    event.buttons(),
                );
                a.scratch(sample);
            });
            let _ = canvas.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for event_name in ["touchstart", "touchmove"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                let Some(rect) = a.scratch_rect() else { return };
                let first = event
                    .touches()
                    .get(0)
                    .map(|t| (t.client_x() as f32, t.client_y() as f32));
                if let Some(sample) = touch_sample(&rect, first) {
                    a.scratch(sample);
                }
            });
            let _ = canvas.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize_handler(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut a = app.borrow_mut();
            if a.experience.scene() == Scene::Finale {
                a.reset_scratch_surface();
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |_time: f64| {
            frame(app);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame(app: Rc<RefCell<App>>) {
        {
            let mut a = app.borrow_mut();
            a.update();
            a.render();
        }
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use starlit_letter::Settings;
    use starlit_letter::sim::{Effect, Experience, Input, PointerSample, Scene, SceneState};

    let settings = Settings::load();
    env_logger::Builder::new()
        .filter_level(settings.log_level().to_level_filter())
        .parse_default_env()
        .init();
    log::info!("Starlit Letter (native) starting...");
    log::info!("The interactive version runs in the browser - use `trunk serve`");

    // Headless walk through all four scenes
    let seed = settings.seed.unwrap_or(2024);
    let mut exp = Experience::new(seed);
    let mut now = 0u64;

    exp.handle(Input::PlaceDisc { disc_id: "1".into() }, now);
    now += 1000;
    for effect in exp.tick(now) {
        if let Effect::PlayMusic { title, .. } = effect {
            println!("Playing: {}", title);
        }
    }
    exp.handle(Input::Begin, now);

    while matches!(exp.state(), SceneState::Letter(tw) if !tw.is_complete()) {
        now += 100;
        exp.tick(now);
    }
    exp.handle(Input::Tear, now);
    while exp.scene() == Scene::Letter {
        now += 100;
        exp.tick(now);
    }

    while exp.scene() == Scene::Collection {
        now += 100;
        exp.tick(now);
        let ids: Vec<u32> = match exp.state() {
            SceneState::Collection(roof) => roof.stars().iter().map(|s| s.id).collect(),
            _ => Vec::new(),
        };
        for id in ids {
            exp.handle(Input::CollectStar { id, x: 0.0, y: 0.0 }, now);
        }
        exp.handle(Input::ClickTree, now);
    }

    exp.handle(Input::Resize { width: 100, height: 100 }, now);
    for y in (0..=100).step_by(10) {
        for x in (0..=100).step_by(10) {
            exp.handle(Input::Scratch(PointerSample::pressed(x as f32, y as f32)), now);
        }
    }

    match serde_json::to_string_pretty(&exp.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Snapshot serialization failed: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
