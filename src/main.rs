//! Devil Levels entry point
//!
//! In the browser this wires the game to the page. Natively it runs the
//! highscore server that also serves the page.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, Element, EventTarget, HtmlCanvasElement, HtmlElement, HtmlInputElement,
        KeyboardEvent, TouchEvent, Window,
    };

    use devil_levels::bridge::{HttpHighScoreService, Presenter};
    use devil_levels::driver::{self, App, SharedApp};
    use devil_levels::highscores::HighScoreEntry;
    use devil_levels::platform::ControlsHint;
    use devil_levels::platform::web::RafScheduler;
    use devil_levels::renderer::CanvasSurface;
    use devil_levels::settings::ControlsPreference;
    use devil_levels::sim::{GameEvent, Simulation};
    use devil_levels::{Settings, Tuning};

    type Game = SharedApp<RafScheduler, CanvasSurface>;

    fn element(document: &Document, id: &str) -> Option<Element> {
        document.get_element_by_id(id)
    }

    fn show(document: &Document, id: &str) {
        if let Some(el) = element(document, id) {
            let _ = el.class_list().remove_1("hidden");
        }
    }

    fn hide(document: &Document, id: &str) {
        if let Some(el) = element(document, id) {
            let _ = el.class_list().add_1("hidden");
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = element(document, id) {
            el.set_text_content(Some(text));
        }
    }

    fn name_input(document: &Document) -> Option<HtmlInputElement> {
        element(document, "playerName")?.dyn_into().ok()
    }

    /// Mirrors game events into the page
    struct DomPresenter {
        window: Window,
        document: Document,
        settings: Rc<RefCell<Settings>>,
    }

    impl Presenter for DomPresenter {
        fn notify(&mut self, event: &GameEvent) {
            let doc = &self.document;
            match *event {
                GameEvent::ScoreChanged(score) => set_text(doc, "score", &score.to_string()),
                GameEvent::LevelChanged(level) => set_text(doc, "level", &level.to_string()),
                GameEvent::LivesChanged(lives) => set_text(doc, "lives", &lives.to_string()),
                GameEvent::LevelCleared { new_level } => {
                    show(doc, "nextLevelBtn");
                    set_text(doc, "overlayTitle", "Level Cleared!");
                    set_text(
                        doc,
                        "overlayText",
                        &format!(
                            "Level {} cleared. Ready for level {}?",
                            new_level.saturating_sub(1),
                            new_level
                        ),
                    );
                    show(doc, "overlay");
                }
                GameEvent::GameOver { final_score } => {
                    set_text(doc, "overlayTitle", "Game Over");
                    set_text(doc, "overlayText", &format!("Score: {}", final_score));
                    show(doc, "nameLabel");
                    if let Some(input) = name_input(doc) {
                        input.set_value(&self.settings.borrow().player_name);
                    }
                    show(doc, "submitScoreBtn");
                    show(doc, "restartBtn");
                    show(doc, "overlay");
                }
            }
        }

        fn leaderboard_loaded(&mut self, entries: &[HighScoreEntry]) {
            let Some(list) = element(&self.document, "highscoreList") else {
                return;
            };
            list.set_inner_html("");
            for entry in entries {
                if let Ok(li) = self.document.create_element("li") {
                    li.set_text_content(Some(&format!("{} — {}", entry.name, entry.score)));
                    let _ = list.append_child(&li);
                }
            }
        }

        fn score_submitted(&mut self) {
            hide(&self.document, "overlay");
        }

        fn show_error(&mut self, message: &str) {
            let _ = self.window.alert_with_message(message);
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Devil Levels starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = element(&document, "gameCanvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let surface = CanvasSurface::new(&canvas).ok_or("no 2d context")?;
        let (width, height) = surface.size();

        let settings = Rc::new(RefCell::new(Settings::load()));
        let (endpoint, background_grid, controls) = {
            let s = settings.borrow();
            (s.highscore_endpoint.clone(), s.background_grid, s.controls)
        };

        let seed = js_sys::Date::now() as u64;
        let overrides = canvas.get_attribute("data-tuning");
        let tuning = Tuning::from_overrides(overrides.as_deref()).with_surface(width, height);
        let sim = Simulation::new(tuning, seed);
        let scheduler = Rc::new(RafScheduler::new().ok_or("no window")?);
        let presenter = DomPresenter {
            window: window.clone(),
            document: document.clone(),
            settings: settings.clone(),
        };
        let game = App::new(
            sim,
            scheduler,
            surface,
            Box::new(presenter),
            Rc::new(HttpHighScoreService::new(endpoint)),
        )
        .with_background_grid(background_grid)
        .into_shared();

        log::info!("Game initialized with seed: {}", seed);

        let hud = game.borrow().hud();
        set_text(&document, "score", &hud.score.to_string());
        set_text(&document, "level", &hud.level.to_string());
        set_text(&document, "lives", &hud.lives.to_string());

        setup_keyboard(&window, game.clone());
        setup_touch(&document, game.clone());
        setup_buttons(&document, game.clone(), settings);
        setup_controls_hint(&window, &document, controls);
        setup_auto_pause(&document, game.clone());

        game.borrow_mut().draw();
        driver::fetch_leaderboard(&game);

        log::info!("Devil Levels ready");
        Ok(())
    }

    fn listen(target: &EventTarget, event: &str, handler: impl FnMut(web_sys::Event) + 'static) {
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
        if let Err(e) =
            target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        {
            log::warn!("Could not listen for {}: {:?}", event, e);
        }
        closure.forget();
    }

    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        match element(document, id) {
            Some(el) => listen(&el, "click", move |_| handler()),
            None => log::warn!("Missing #{}", id),
        }
    }

    fn setup_keyboard(window: &Window, game: Game) {
        {
            let game = game.clone();
            listen(window, "keydown", move |event| {
                if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                    game.borrow_mut().input.key_down(&event.key());
                }
            });
        }
        listen(window, "keyup", move |event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                game.borrow_mut().input.key_up(&event.key());
            }
        });
    }

    fn first_touch_x(event: &web_sys::Event) -> Option<f32> {
        let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
        Some(touch.client_x() as f32)
    }

    fn setup_touch(document: &Document, game: Game) {
        {
            let game = game.clone();
            listen(document, "touchstart", move |event| {
                if let Some(x) = first_touch_x(&event) {
                    game.borrow_mut().input.touch_start(x);
                }
            });
        }
        {
            let game = game.clone();
            listen(document, "touchmove", move |event| {
                if let Some(x) = first_touch_x(&event) {
                    game.borrow_mut().input.touch_move(x);
                }
            });
        }
        listen(document, "touchend", move |_| {
            game.borrow_mut().input.touch_end();
        });
    }

    fn setup_buttons(document: &Document, game: Game, settings: Rc<RefCell<Settings>>) {
        {
            let game = game.clone();
            let doc = document.clone();
            on_click(document, "startBtn", move || {
                if driver::start(&game) {
                    hide(&doc, "overlay");
                    hide(&doc, "startBtn");
                    hide(&doc, "nextLevelBtn");
                    hide(&doc, "restartBtn");
                }
            });
        }
        {
            let game = game.clone();
            let doc = document.clone();
            on_click(document, "nextLevelBtn", move || {
                hide(&doc, "overlay");
                hide(&doc, "nextLevelBtn");
                driver::continue_level(&game);
            });
        }
        {
            let game = game.clone();
            let doc = document.clone();
            on_click(document, "restartBtn", move || {
                hide(&doc, "overlay");
                hide(&doc, "restartBtn");
                hide(&doc, "submitScoreBtn");
                hide(&doc, "nameLabel");
                show(&doc, "startBtn");
                driver::restart(&game);
            });
        }
        {
            let doc = document.clone();
            on_click(document, "closeOverlay", move || hide(&doc, "overlay"));
        }
        {
            let doc = document.clone();
            on_click(document, "submitScoreBtn", move || {
                let name = name_input(&doc).map(|i| i.value()).unwrap_or_default();
                {
                    let mut s = settings.borrow_mut();
                    s.remember_name(&name);
                    s.save();
                }
                driver::submit_score(&game, &name);
            });
        }
    }

    fn set_display(document: &Document, selector: &str, value: &str) {
        let el = document
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|e| e.dyn_into::<HtmlElement>().ok());
        if let Some(el) = el {
            let _ = el.style().set_property("display", value);
        }
    }

    fn show_controls_hint(window: &Window, document: &Document, preference: ControlsPreference) {
        let agent = window.navigator().user_agent().unwrap_or_default();
        let width = window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(0.0);
        let (pc, mobile) = match preference.resolve(ControlsHint::detect(&agent, width)) {
            ControlsHint::Keyboard => ("inline", "none"),
            ControlsHint::Touch => ("none", "inline"),
        };
        set_display(document, ".pc-controls", pc);
        set_display(document, ".mobile-controls", mobile);
    }

    fn setup_controls_hint(window: &Window, document: &Document, preference: ControlsPreference) {
        show_controls_hint(window, document, preference);

        let win = window.clone();
        let doc = document.clone();
        listen(window, "resize", move |_| {
            show_controls_hint(&win, &doc, preference);
        });
    }

    /// Stop the frame loop while the tab is hidden
    fn setup_auto_pause(document: &Document, game: Game) {
        let doc = document.clone();
        listen(document, "visibilitychange", move |_| {
            if doc.hidden() {
                game.borrow_mut().input.clear();
                driver::stop(&game);
                log::info!("Paused (tab hidden)");
            } else if driver::resume(&game) {
                log::info!("Resumed");
            }
        });
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = devil_levels::server::ServerConfig::from_env()?;
    devil_levels::server::run(config)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}
