//! Coin Flap entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, HtmlInputElement,
        KeyboardEvent,
    };

    use coin_flap::App;
    use coin_flap::audio::AudioManager;
    use coin_flap::consts::*;
    use coin_flap::leaderboard::LocalLeaderboard;
    use coin_flap::persistence::LocalStorage;
    use coin_flap::renderer::canvas::CanvasSurface;
    use coin_flap::sim::Difficulty;
    use coin_flap::skins::CATALOG;

    /// Buttons for the purchasable skins, in catalog order after the default
    const SKIN_BUTTONS: [(&str, &str); 3] = [
        ("bird1Button", "duckError"),
        ("bird2Button", "twitterError"),
        ("bird3Button", "blackError"),
    ];

    /// Game instance: app state plus the page it draws on
    struct Game {
        app: App,
        surface: CanvasSurface,
        /// An animation frame is pending
        looping: bool,
    }

    impl Game {
        fn render(&mut self) {
            self.app.draw(&mut self.surface);
        }

        /// Update DOM elements that mirror game state
        fn update_dom(&self, document: &Document) {
            if let Some(el) = document.get_element_by_id("coinDisplay") {
                el.set_text_content(Some(&self.app.progression.coins.to_string()));
            }

            let controls = self.app.controls();
            set_visible(document, "startHtmlButton", controls.start);
            set_visible(document, "restartButton", controls.restart);

            for achievement in coin_flap::Achievement::ALL {
                if let Some(el) = document.get_element_by_id(achievement.key()) {
                    let unlocked = self.app.progression.is_unlocked(achievement);
                    let _ = el.class_list().toggle_with_force("unlocked", unlocked);
                }
            }
        }

        fn update_leaderboards(&self, document: &Document) {
            for difficulty in Difficulty::ALL {
                let id = format!("{}Leaderboard", difficulty.as_str());
                let Some(list) = document.get_element_by_id(&id) else {
                    continue;
                };
                list.set_inner_html("");
                for line in self.app.board(difficulty).lines(difficulty) {
                    if let Ok(li) = document.create_element("li") {
                        li.set_text_content(Some(&line));
                        let _ = list.append_child(&li);
                    }
                }
            }
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            let _ = el
                .style()
                .set_property("display", if visible { "block" } else { "none" });
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Coin Flap starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let seed = coin_flap::platform::random_seed();
        let app = App::new(
            Box::new(LocalStorage),
            Box::new(LocalLeaderboard::new(LocalStorage)),
            Box::new(AudioManager::new()),
            seed,
        );

        if let Some(input) = document
            .get_element_by_id("playerName")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value(app.player_name());
        }
        if let Some(slider) = document
            .get_element_by_id("volumeSlider")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            slider.set_value(&app.settings.master_volume.to_string());
        }

        let game = Rc::new(RefCell::new(Game {
            app,
            surface: CanvasSurface::new(ctx),
            looping: false,
        }));

        resize_canvas(&canvas);
        {
            let mut g = game.borrow_mut();
            g.render();
            g.update_dom(&document);
            g.update_leaderboards(&document);
        }
        highlight_difficulty(&document, game.borrow().app.settings.difficulty);

        setup_resize(canvas.clone(), game.clone());
        setup_input_handlers(&canvas, game.clone());
        setup_buttons(game.clone());
        setup_difficulty_buttons(game.clone());
        setup_skin_buttons(game.clone());
        setup_volume(game);

        log::info!("Coin Flap running!");
    }

    /// Fit the canvas into the window keeping the playfield aspect ratio
    fn resize_canvas(canvas: &HtmlCanvasElement) {
        let Some(window) = web_sys::window() else { return };
        let inner = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let aspect = (PLAYFIELD_WIDTH / PLAYFIELD_HEIGHT) as f64;

        let mut w = (inner(window.inner_width()) - 40.0).min(PLAYFIELD_WIDTH as f64);
        let mut h = (inner(window.inner_height()) - 100.0).min(PLAYFIELD_HEIGHT as f64);
        if w / h > aspect {
            w = h * aspect;
        } else {
            h = w / aspect;
        }
        canvas.set_width(w.max(1.0) as u32);
        canvas.set_height(h.max(1.0) as u32);
    }

    fn setup_resize(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            resize_canvas(&canvas);
            game.borrow_mut().render();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Start or jump; kicks off the frame loop when a run begins
    fn activate(game: &Rc<RefCell<Game>>) {
        let started = game.borrow_mut().app.activate();
        if started {
            if let Some(document) = document() {
                game.borrow().update_dom(&document);
            }
            let mut g = game.borrow_mut();
            if !g.looping {
                g.looping = true;
                drop(g);
                request_animation_frame(game.clone());
            }
        }
    }

    /// Read the name box and remember it
    fn take_player_name(game: &Rc<RefCell<Game>>) {
        let name = document()
            .and_then(|d| d.get_element_by_id("playerName"))
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default();
        game.borrow_mut().app.set_player_name(&name);
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Space bar
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.code() == "Space" {
                    event.prevent_default();
                    activate(&game);
                }
            });
            if let Some(document) = document() {
                let _ = document
                    .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            }
            closure.forget();
        }

        // Click / tap on the playfield
        for event_name in ["click", "touchstart"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                event.prevent_default();
                activate(&game);
            });
            let _ =
                canvas.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(id: &str, mut handler: impl FnMut() + 'static) {
        let Some(el) = document().and_then(|d| d.get_element_by_id(id)) else {
            log::warn!("Missing element #{id}");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| handler());
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        for id in ["startGameButton", "startHtmlButton"] {
            let game = game.clone();
            on_click(id, move || {
                take_player_name(&game);
                activate(&game);
            });
        }
        on_click("restartButton", move || activate(&game));
    }

    fn highlight_difficulty(document: &Document, selected: Difficulty) {
        for difficulty in Difficulty::ALL {
            let id = format!("{}Button", difficulty.as_str());
            if let Some(btn) = document.get_element_by_id(&id) {
                let _ = btn
                    .class_list()
                    .toggle_with_force("active-difficulty", difficulty == selected);
            }
        }
    }

    fn setup_difficulty_buttons(game: Rc<RefCell<Game>>) {
        for difficulty in Difficulty::ALL {
            let game = game.clone();
            on_click(&format!("{}Button", difficulty.as_str()), move || {
                if game.borrow_mut().app.select_difficulty(difficulty) {
                    if let Some(document) = document() {
                        highlight_difficulty(&document, difficulty);
                    }
                }
            });
        }
    }

    fn setup_skin_buttons(game: Rc<RefCell<Game>>) {
        for (skin, (button_id, error_id)) in CATALOG[1..].iter().zip(SKIN_BUTTONS) {
            let skin_id = skin.id;
            let game = game.clone();
            on_click(button_id, move || {
                let Some(document) = document() else { return };

                // Clear old error messages first
                for (_, id) in SKIN_BUTTONS {
                    if let Some(div) = document.get_element_by_id(id) {
                        div.set_text_content(None);
                    }
                    set_visible(&document, id, false);
                }

                let mut g = game.borrow_mut();
                match g.app.purchase_or_equip(skin_id) {
                    Ok(_) => {
                        for (id, _) in SKIN_BUTTONS {
                            if let Some(b) = document.get_element_by_id(id) {
                                let _ = b.class_list().toggle_with_force("selected", id == button_id);
                            }
                        }
                        g.update_dom(&document);
                        if !g.app.run.is_running() {
                            g.render();
                        }
                    }
                    Err(_) => {
                        if let Some(div) = document.get_element_by_id(error_id) {
                            div.set_text_content(g.app.shop_message());
                        }
                        set_visible(&document, error_id, true);
                    }
                }
            });
        }
    }

    fn setup_volume(game: Rc<RefCell<Game>>) {
        let Some(slider) = document()
            .and_then(|d| d.get_element_by_id("volumeSlider"))
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        let input = slider.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if let Ok(volume) = input.value().parse::<f32>() {
                game.borrow_mut().app.set_master_volume(volume);
            }
        });
        let _ = slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let keep_going = {
            let mut g = game.borrow_mut();
            let keep_going = g.app.frame(time);
            g.render();
            if !keep_going {
                g.looping = false;
                if let Some(document) = document() {
                    g.update_dom(&document);
                    g.update_leaderboards(&document);
                }
                for achievement in g.app.take_unlocked() {
                    log::info!("Unlocked: {}", achievement.title());
                }
            } else if let Some(el) = document().and_then(|d| d.get_element_by_id("coinDisplay")) {
                el.set_text_content(Some(&g.app.progression.coins.to_string()));
            }
            keep_going
        };

        // No new frame once the run is over
        if keep_going {
            request_animation_frame(game);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Coin Flap (native) starting...");
    log::info!("The playable version runs in the browser - build for wasm32 with `trunk serve`");

    headless::run_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Autopilot run against in-memory collaborators
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use coin_flap::App;
    use coin_flap::audio::Silent;
    use coin_flap::consts::*;
    use coin_flap::leaderboard::LocalLeaderboard;
    use coin_flap::persistence::MemoryStore;
    use coin_flap::sim::Difficulty;

    /// Longest simulated run
    const MAX_RUN_MS: f64 = 120_000.0;

    pub fn run_demo() {
        let mut app = App::new(
            Box::new(MemoryStore::new()),
            Box::new(LocalLeaderboard::new(MemoryStore::new())),
            Box::new(Silent),
            coin_flap::platform::random_seed(),
        );
        app.set_player_name("Autopilot");
        println!("Seed: {}", app.run.seed);

        for difficulty in Difficulty::ALL {
            app.select_difficulty(difficulty);
            app.activate();

            // Past the time limit the autopilot lets go and the avatar falls,
            // so every tier's run ends before the next one starts
            let mut t = 0.0;
            loop {
                if t < MAX_RUN_MS && should_flap(&app) {
                    app.activate();
                }
                if !app.frame(t) {
                    break;
                }
                t += SIM_DT_MS as f64;
            }

            if let Some(summary) = app.last_run() {
                let survived = if t >= MAX_RUN_MS { " (survived the time limit)" } else { "" };
                println!(
                    "{:>6}: score {:>3}, ended by {:?}{survived}",
                    difficulty.label(),
                    summary.score,
                    summary.cause
                );
            }
        }

        println!("Coins collected: {}", app.progression.coins);
        for difficulty in Difficulty::ALL {
            for line in app.board(difficulty).lines(difficulty) {
                println!("  [{}] {line}", difficulty.label());
            }
        }
    }

    /// Flap when falling below the middle of the next gap
    fn should_flap(app: &App) -> bool {
        let avatar = &app.run.avatar;
        let target = app
            .run
            .obstacles
            .iter()
            .find(|o| o.right() >= avatar.left())
            .map(|o| o.gap_center() + 30.0)
            .unwrap_or(app.run.height / 2.0);
        avatar.velocity >= 0.0 && avatar.center().y > target
    }
}
