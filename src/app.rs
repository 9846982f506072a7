//! Application state
//!
//! Owns the run, progression, settings and the outside collaborators
//! (storage, leaderboard, audio). The simulation reports what happened as
//! events; this is the one place those events turn into coin credits,
//! sound cues and leaderboard submissions.

use crate::audio::{AudioSink, SoundCue};
use crate::consts::*;
use crate::leaderboard::{BoardView, Leaderboard, LeaderboardEntry};
use crate::persistence::{KeyValueStore, keys};
use crate::platform;
use crate::progression::{Achievement, Progression, Purchase, ShopError};
use crate::renderer::{self, Surface};
use crate::settings::Settings;
use crate::sim::{Difficulty, EndCause, GameEvent, GameState, RunPhase, TickInput, tick};
use crate::skins;

pub const DEFAULT_PLAYER_NAME: &str = "Anonymous";

/// Which run controls should be visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub start: bool,
    pub restart: bool,
}

/// How the last run went
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub score: u32,
    pub difficulty: Difficulty,
    pub cause: EndCause,
    pub new_best: bool,
}

/// Game instance holding all state
pub struct App {
    pub run: GameState,
    pub settings: Settings,
    pub progression: Progression,
    store: Box<dyn KeyValueStore>,
    leaderboard: Box<dyn Leaderboard>,
    audio: Box<dyn AudioSink>,
    input: TickInput,
    accumulator: f32,
    last_time: Option<f64>,
    player_name: String,
    shop_message: Option<String>,
    last_run: Option<RunSummary>,
    unlocked: Vec<Achievement>,
}

impl App {
    pub fn new(
        store: Box<dyn KeyValueStore>,
        leaderboard: Box<dyn Leaderboard>,
        mut audio: Box<dyn AudioSink>,
        seed: u64,
    ) -> Self {
        let settings = Settings::load(store.as_ref());
        let progression = Progression::load(store.as_ref());
        let player_name = store
            .get(keys::PLAYER_NAME)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_PLAYER_NAME.to_string());

        let mut run = GameState::new(seed);
        run.set_difficulty(settings.difficulty);
        run.rules = settings.rules();
        audio.set_volumes(
            settings.effective_sfx_volume(),
            settings.effective_music_volume(),
        );

        Self {
            run,
            settings,
            progression,
            store,
            leaderboard,
            audio,
            input: TickInput::default(),
            accumulator: 0.0,
            last_time: None,
            player_name,
            shop_message: None,
            last_run: None,
            unlocked: Vec::new(),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.run.phase
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn controls(&self) -> Controls {
        Controls {
            start: self.run.phase == RunPhase::Idle,
            restart: self.run.phase == RunPhase::Ended,
        }
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// Remember the name used for leaderboard submissions
    pub fn set_player_name(&mut self, raw: &str) {
        let name = raw.trim();
        self.player_name = if name.is_empty() {
            DEFAULT_PLAYER_NAME.to_string()
        } else {
            name.to_string()
        };
        if let Err(e) = self.store.set(keys::PLAYER_NAME, &self.player_name) {
            log::warn!("Failed to save player name: {e}");
        }
    }

    /// The single "activate" input: start when stopped, jump when running.
    ///
    /// Returns true when a new run started (the caller should begin
    /// requesting frames).
    pub fn activate(&mut self) -> bool {
        if self.run.is_running() {
            self.input.jump = true;
            false
        } else {
            self.start_run()
        }
    }

    /// Start (from Idle) or restart (from Ended) a run
    pub fn start_run(&mut self) -> bool {
        self.run.rules = self.settings.rules();
        if !self.run.start() {
            return false;
        }
        self.input = TickInput::default();
        self.accumulator = 0.0;
        self.last_time = None;
        self.handle_events();
        true
    }

    /// Feed one display frame. Returns whether another frame is wanted.
    pub fn frame(&mut self, time_ms: f64) -> bool {
        if !self.run.is_running() {
            self.last_time = None;
            return false;
        }
        let dt = match self.last_time {
            Some(last) => ((time_ms - last) as f32).clamp(0.0, MAX_FRAME_DELTA_MS),
            None => 0.0,
        };
        self.last_time = Some(time_ms);
        self.advance(dt)
    }

    /// Run fixed simulation steps for `dt_ms` of wall-clock time
    pub fn advance(&mut self, dt_ms: f32) -> bool {
        self.accumulator += dt_ms;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
            tick(&mut self.run, &self.input, SIM_DT_MS);
            self.accumulator -= SIM_DT_MS;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.jump = false;

            self.handle_events();
            if !self.run.is_running() {
                self.accumulator = 0.0;
                return false;
            }
        }
        true
    }

    fn handle_events(&mut self) {
        for event in self.run.drain_events() {
            if let Some(cue) = SoundCue::for_event(&event) {
                self.audio.play(cue);
            }

            match event {
                GameEvent::RunStarted { difficulty, restart } => {
                    log::info!("Run started on {}", difficulty.label());
                    self.audio.start_music(restart);
                }
                GameEvent::Jumped => {}
                GameEvent::ObstaclePassed { .. } => {
                    let unlocked = self.progression.record_obstacle_pass(self.store.as_mut());
                    self.unlocked.extend(unlocked);
                }
                GameEvent::CoinCollected { .. } => {
                    let unlocked = self.progression.credit_coin(self.store.as_mut());
                    self.unlocked.extend(unlocked);
                }
                GameEvent::RunEnded {
                    score,
                    difficulty,
                    cause,
                } => {
                    log::info!(
                        "Run ended ({cause:?}) with score {score} on {}",
                        difficulty.label()
                    );
                    self.audio.stop_music();
                    let entry = LeaderboardEntry {
                        name: self.player_name.clone(),
                        score,
                        timestamp: platform::now_millis(),
                        difficulty,
                    };
                    let record = self.progression.record_run_end(
                        self.store.as_mut(),
                        self.leaderboard.as_mut(),
                        entry,
                    );
                    self.unlocked.extend(record.unlocked);
                    self.last_run = Some(RunSummary {
                        score,
                        difficulty,
                        cause,
                        new_best: record.new_best,
                    });
                }
            }
        }
    }

    pub fn last_run(&self) -> Option<&RunSummary> {
        self.last_run.as_ref()
    }

    /// Achievements unlocked since the last call
    pub fn take_unlocked(&mut self) -> Vec<Achievement> {
        std::mem::take(&mut self.unlocked)
    }

    /// Choose the tier for the next run; refused mid-run
    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> bool {
        if !self.run.set_difficulty(difficulty) {
            log::warn!(
                "Ignoring difficulty change to {} during a run",
                difficulty.label()
            );
            return false;
        }
        self.settings.difficulty = difficulty;
        self.settings.save(self.store.as_mut());
        true
    }

    /// Buy or equip a skin. Failures are also kept as the shop message.
    pub fn purchase_or_equip(&mut self, skin_id: &str) -> Result<Purchase, ShopError> {
        self.shop_message = None;
        let result = self
            .progression
            .purchase_or_equip(self.store.as_mut(), skin_id);
        if let Err(e) = &result {
            self.shop_message = Some(e.to_string());
        }
        result
    }

    /// Inline message from the last shop action
    pub fn shop_message(&self) -> Option<&str> {
        self.shop_message.as_deref()
    }

    pub fn equipped_image(&self) -> &'static str {
        skins::image_for(&self.progression.equipped)
    }

    pub fn hud_text(&self) -> String {
        renderer::hud_text(self.run.score, self.progression.coins)
    }

    /// Leaderboard panel for one difficulty
    pub fn board(&self, difficulty: Difficulty) -> BoardView {
        BoardView::fetch(
            self.leaderboard.as_ref(),
            difficulty,
            self.settings.leaderboard_size,
        )
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, volume: f32) {
        self.settings.master_volume = volume.clamp(0.0, 1.0);
        self.audio.set_volumes(
            self.settings.effective_sfx_volume(),
            self.settings.effective_music_volume(),
        );
        self.settings.save(self.store.as_mut());
    }

    /// Toggle the ceiling rule; applies from the next run
    pub fn set_ceiling_is_fatal(&mut self, fatal: bool) {
        self.settings.ceiling_is_fatal = fatal;
        self.settings.save(self.store.as_mut());
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        renderer::draw_frame(
            surface,
            &self.run,
            self.equipped_image(),
            self.progression.coins,
        );
    }
}
