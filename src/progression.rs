//! Coin economy and long-term progression
//!
//! Persisted to the key-value store after every mutation. Shop actions
//! write before they change anything in memory, and a purchase that can't
//! be fully written is put back the way it was, so a reload never sees half
//! of one. Counter updates are single writes whose failures only get logged.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::leaderboard::{Leaderboard, LeaderboardEntry};
use crate::persistence::{self, KeyValueStore, StorageError, keys};
use crate::sim::Difficulty;
use crate::skins::{self, DEFAULT_SKIN};

/// Why a shop action was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShopError {
    #[error("Not enough coins! Need {required}, have {available}.")]
    InsufficientFunds { required: u64, available: u64 },
    #[error("Unknown skin `{0}`")]
    UnknownSkin(String),
    #[error("Couldn't save your purchase, try again. ({0})")]
    Storage(String),
}

/// Outcome of a successful shop action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purchase {
    /// Already owned, now equipped
    Equipped,
    /// Bought and equipped
    Bought { cost: u64 },
}

/// One-way achievement flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Achievement {
    Coins100,
    Obstacles20,
    Obstacles50,
    Obstacles100,
    Score20,
}

impl Achievement {
    pub const ALL: [Achievement; 5] = [
        Achievement::Coins100,
        Achievement::Obstacles20,
        Achievement::Obstacles50,
        Achievement::Obstacles100,
        Achievement::Score20,
    ];

    /// Storage key inside the achievement map
    pub fn key(&self) -> &'static str {
        match self {
            Achievement::Coins100 => "coins100",
            Achievement::Obstacles20 => "obstacles20",
            Achievement::Obstacles50 => "obstacles50",
            Achievement::Obstacles100 => "obstacles100",
            Achievement::Score20 => "score20",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Achievement::Coins100 => "Collect 100 coins",
            Achievement::Obstacles20 => "Pass 20 pillars",
            Achievement::Obstacles50 => "Pass 50 pillars",
            Achievement::Obstacles100 => "Pass 100 pillars",
            Achievement::Score20 => "Score 20 in one run",
        }
    }

    fn is_met(&self, p: &Progression) -> bool {
        match self {
            Achievement::Coins100 => p.lifetime_coins >= 100,
            Achievement::Obstacles20 => p.lifetime_obstacles >= 20,
            Achievement::Obstacles50 => p.lifetime_obstacles >= 50,
            Achievement::Obstacles100 => p.lifetime_obstacles >= 100,
            Achievement::Score20 => p.best_run() >= 20,
        }
    }
}

/// Result of recording a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    pub new_best: bool,
    pub unlocked: Vec<Achievement>,
}

/// Durable player progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progression {
    /// Spendable coins
    pub coins: u64,
    /// Skin id -> owned
    pub purchased: BTreeMap<String, bool>,
    pub equipped: String,
    /// Every coin ever collected (never decreases)
    pub lifetime_coins: u64,
    /// Every pillar ever passed (never decreases)
    pub lifetime_obstacles: u64,
    /// Difficulty id -> best score
    pub best_scores: BTreeMap<String, u32>,
    /// Achievement key -> unlocked. Unknown keys are kept as-is.
    pub achievements: BTreeMap<String, bool>,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            coins: 0,
            purchased: BTreeMap::new(),
            equipped: DEFAULT_SKIN.to_string(),
            lifetime_coins: 0,
            lifetime_obstacles: 0,
            best_scores: BTreeMap::new(),
            achievements: BTreeMap::new(),
        }
    }
}

impl Progression {
    /// Load from the store; missing or corrupt entries fall back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let coins = persistence::load_u64(store, keys::COIN_COUNT);
        let mut lifetime_coins = persistence::load_u64(store, keys::LIFETIME_COINS);
        if lifetime_coins < coins {
            // Saves from before lifetime tracking
            lifetime_coins = coins;
        }

        let purchased: BTreeMap<String, bool> = persistence::load_json(store, keys::PURCHASED_SKINS);
        let equipped = store
            .get(keys::EQUIPPED_SKIN)
            .filter(|id| *id == DEFAULT_SKIN || purchased.get(id.as_str()).copied().unwrap_or(false))
            .unwrap_or_else(|| DEFAULT_SKIN.to_string());

        let progression = Self {
            coins,
            purchased,
            equipped,
            lifetime_coins,
            lifetime_obstacles: persistence::load_u64(store, keys::LIFETIME_OBSTACLES),
            best_scores: persistence::load_json(store, keys::BEST_SCORES),
            achievements: persistence::load_json(store, keys::ACHIEVEMENTS),
        };
        log::info!(
            "Loaded progression: {} coins, {} skins owned",
            progression.coins,
            progression.purchased.values().filter(|v| **v).count()
        );
        progression
    }

    pub fn owns(&self, skin_id: &str) -> bool {
        skin_id == DEFAULT_SKIN || self.purchased.get(skin_id).copied().unwrap_or(false)
    }

    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        self.achievements
            .get(achievement.key())
            .copied()
            .unwrap_or(false)
    }

    pub fn best_score(&self, difficulty: Difficulty) -> u32 {
        self.best_scores
            .get(difficulty.as_str())
            .copied()
            .unwrap_or(0)
    }

    /// Best single-run score on any difficulty
    pub fn best_run(&self) -> u32 {
        self.best_scores.values().copied().max().unwrap_or(0)
    }

    /// Equip an owned skin, or buy and equip it
    pub fn purchase_or_equip(
        &mut self,
        store: &mut dyn KeyValueStore,
        skin_id: &str,
    ) -> Result<Purchase, ShopError> {
        let skin = skins::find(skin_id).ok_or_else(|| ShopError::UnknownSkin(skin_id.to_string()))?;

        if self.owns(skin.id) {
            store
                .set(keys::EQUIPPED_SKIN, skin.id)
                .map_err(|e| ShopError::Storage(e.to_string()))?;
            self.equipped = skin.id.to_string();
            return Ok(Purchase::Equipped);
        }

        if self.coins < skin.cost {
            log::info!(
                "Can't afford {} ({} coins, have {})",
                skin.name,
                skin.cost,
                self.coins
            );
            return Err(ShopError::InsufficientFunds {
                required: skin.cost,
                available: self.coins,
            });
        }

        let coins = self.coins - skin.cost;
        let mut purchased = self.purchased.clone();
        purchased.insert(skin.id.to_string(), true);

        if let Err(e) = save_purchase(store, &purchased, skin.id, coins) {
            log::warn!("Purchase of {} not saved, rolling back: {e}", skin.name);
            persist(persistence::save_json(store, keys::PURCHASED_SKINS, &self.purchased));
            persist(store.set(keys::EQUIPPED_SKIN, &self.equipped));
            return Err(ShopError::Storage(e.to_string()));
        }

        self.coins = coins;
        self.purchased = purchased;
        self.equipped = skin.id.to_string();
        log::info!("Bought {} for {} coins ({} left)", skin.name, skin.cost, self.coins);

        Ok(Purchase::Bought { cost: skin.cost })
    }

    /// One coin picked up
    pub fn credit_coin(&mut self, store: &mut dyn KeyValueStore) -> Vec<Achievement> {
        self.coins += 1;
        self.lifetime_coins += 1;
        persist(persistence::save_u64(store, keys::COIN_COUNT, self.coins));
        persist(persistence::save_u64(store, keys::LIFETIME_COINS, self.lifetime_coins));
        self.check_achievements(store)
    }

    /// One pillar passed
    pub fn record_obstacle_pass(&mut self, store: &mut dyn KeyValueStore) -> Vec<Achievement> {
        self.lifetime_obstacles += 1;
        persist(persistence::save_u64(
            store,
            keys::LIFETIME_OBSTACLES,
            self.lifetime_obstacles,
        ));
        self.check_achievements(store)
    }

    /// Fold a finished run into progress and report it to the leaderboard.
    ///
    /// Leaderboard failures are logged and don't affect local state.
    pub fn record_run_end(
        &mut self,
        store: &mut dyn KeyValueStore,
        leaderboard: &mut dyn Leaderboard,
        entry: LeaderboardEntry,
    ) -> RunRecord {
        let key = entry.difficulty.as_str();
        let previous = self.best_scores.get(key).copied().unwrap_or(0);
        let new_best = entry.score > previous;
        if new_best {
            self.best_scores.insert(key.to_string(), entry.score);
            persist(persistence::save_json(store, keys::BEST_SCORES, &self.best_scores));
            log::info!("New best on {}: {}", entry.difficulty.label(), entry.score);
        }

        let unlocked = self.check_achievements(store);

        if let Err(e) = leaderboard.submit(&entry) {
            log::warn!("Leaderboard submit failed: {e}");
        }

        RunRecord { new_best, unlocked }
    }

    /// Set every newly satisfied achievement; returns the ones that flipped.
    ///
    /// Flags are never cleared. The full flag set is written on every call.
    pub fn check_achievements(&mut self, store: &mut dyn KeyValueStore) -> Vec<Achievement> {
        let mut unlocked = Vec::new();
        for achievement in Achievement::ALL {
            if !self.is_unlocked(achievement) && achievement.is_met(self) {
                self.achievements.insert(achievement.key().to_string(), true);
                log::info!("Achievement unlocked: {}", achievement.title());
                unlocked.push(achievement);
            }
        }
        persist(persistence::save_json(store, keys::ACHIEVEMENTS, &self.achievements));
        unlocked
    }
}

/// Ownership and the equipped skin go first; coins are only debited once
/// the skin is safely recorded
fn save_purchase(
    store: &mut dyn KeyValueStore,
    purchased: &BTreeMap<String, bool>,
    equipped: &str,
    coins: u64,
) -> Result<(), StorageError> {
    persistence::save_json(store, keys::PURCHASED_SKINS, purchased)?;
    store.set(keys::EQUIPPED_SKIN, equipped)?;
    persistence::save_u64(store, keys::COIN_COUNT, coins)
}

/// Counter writes are fire-and-forget; a failed write only gets logged
fn persist(result: Result<(), StorageError>) {
    if let Err(e) = result {
        log::warn!("Failed to persist progression: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::{LeaderboardError, LocalLeaderboard};
    use crate::persistence::MemoryStore;

    fn entry(score: u32, difficulty: Difficulty) -> LeaderboardEntry {
        LeaderboardEntry {
            name: "Tester".to_string(),
            score,
            timestamp: 1_700_000_000_000,
            difficulty,
        }
    }

    struct BrokenBoard;

    impl Leaderboard for BrokenBoard {
        fn submit(&mut self, _entry: &LeaderboardEntry) -> Result<(), LeaderboardError> {
            Err(LeaderboardError::Backend("offline".to_string()))
        }

        fn query(&self, _difficulty: Difficulty) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
            Err(LeaderboardError::Backend("offline".to_string()))
        }
    }

    /// Store that refuses writes to one key
    struct FlakyStore {
        inner: MemoryStore,
        reject: &'static str,
    }

    impl FlakyStore {
        fn with_coins(coins: u64, reject: &'static str) -> Self {
            let mut inner = MemoryStore::new();
            persistence::save_u64(&mut inner, keys::COIN_COUNT, coins).unwrap();
            Self { inner, reject }
        }
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == self.reject {
                return Err(StorageError::Rejected {
                    key: key.to_string(),
                });
            }
            self.inner.set(key, value)
        }
    }

    fn assert_nothing_bought(p: &Progression, store: &dyn KeyValueStore) {
        assert_eq!(p.coins, 60);
        assert!(!p.owns("twitter"));
        assert_eq!(p.equipped, DEFAULT_SKIN);

        let reloaded = Progression::load(store);
        assert_eq!(reloaded.coins, 60);
        assert!(!reloaded.owns("twitter"));
        assert_eq!(reloaded.equipped, DEFAULT_SKIN);
    }

    #[test]
    fn test_unsaved_ownership_keeps_coins() {
        let mut store = FlakyStore::with_coins(60, keys::PURCHASED_SKINS);
        let mut p = Progression::load(&store);

        let result = p.purchase_or_equip(&mut store, "twitter");
        assert!(matches!(result, Err(ShopError::Storage(_))));
        assert_nothing_bought(&p, &store);
    }

    #[test]
    fn test_unsaved_debit_rolls_back_ownership() {
        let mut store = FlakyStore::with_coins(60, keys::COIN_COUNT);
        let mut p = Progression::load(&store);

        let result = p.purchase_or_equip(&mut store, "twitter");
        assert!(matches!(result, Err(ShopError::Storage(_))));
        assert_nothing_bought(&p, &store);
        assert_eq!(store.get(keys::PURCHASED_SKINS).as_deref(), Some("{}"));
    }

    #[test]
    fn test_unsaved_equip_keeps_current_skin() {
        let mut store = FlakyStore::with_coins(60, "");
        let mut p = Progression::load(&store);
        p.purchase_or_equip(&mut store, "duck").unwrap();

        store.reject = keys::EQUIPPED_SKIN;
        let result = p.purchase_or_equip(&mut store, DEFAULT_SKIN);
        assert!(matches!(result, Err(ShopError::Storage(_))));
        assert_eq!(p.equipped, "duck");
        assert_eq!(Progression::load(&store).equipped, "duck");
    }

    #[test]
    fn test_purchase_survives_reload() {
        let mut store = MemoryStore::new();
        persistence::save_u64(&mut store, keys::COIN_COUNT, 60).unwrap();
        let mut p = Progression::load(&store);

        let result = p.purchase_or_equip(&mut store, "twitter");
        assert_eq!(result, Ok(Purchase::Bought { cost: 50 }));
        assert_eq!(p.coins, 10);
        assert!(p.owns("twitter"));
        assert_eq!(p.equipped, "twitter");

        let reloaded = Progression::load(&store);
        assert_eq!(reloaded.coins, 10);
        assert!(reloaded.owns("twitter"));
        assert_eq!(reloaded.equipped, "twitter");
    }

    #[test]
    fn test_insufficient_funds_changes_nothing() {
        let mut store = MemoryStore::new();
        let mut p = Progression::default();
        p.coins = 5;

        let result = p.purchase_or_equip(&mut store, "duck");
        assert_eq!(
            result,
            Err(ShopError::InsufficientFunds {
                required: 10,
                available: 5
            })
        );
        assert_eq!(p.coins, 5);
        assert!(p.purchased.is_empty());
        assert_eq!(p.equipped, DEFAULT_SKIN);
        assert!(store.is_empty());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Not enough coins! Need 10, have 5."
        );
    }

    #[test]
    fn test_owned_skin_equips_for_free() {
        let mut store = MemoryStore::new();
        let mut p = Progression::default();
        p.coins = 10;
        p.purchase_or_equip(&mut store, "duck").unwrap();
        p.purchase_or_equip(&mut store, DEFAULT_SKIN).unwrap();
        assert_eq!(p.equipped, DEFAULT_SKIN);

        assert_eq!(p.purchase_or_equip(&mut store, "duck"), Ok(Purchase::Equipped));
        assert_eq!(p.coins, 0);
        assert_eq!(p.equipped, "duck");
    }

    #[test]
    fn test_unknown_skin() {
        let mut store = MemoryStore::new();
        let mut p = Progression::default();
        assert_eq!(
            p.purchase_or_equip(&mut store, "dragon"),
            Err(ShopError::UnknownSkin("dragon".to_string()))
        );
    }

    #[test]
    fn test_credit_coin_persists_both_counters() {
        let mut store = MemoryStore::new();
        let mut p = Progression::default();
        p.credit_coin(&mut store);
        p.credit_coin(&mut store);
        assert_eq!(store.get(keys::COIN_COUNT).as_deref(), Some("2"));
        assert_eq!(store.get(keys::LIFETIME_COINS).as_deref(), Some("2"));
    }

    #[test]
    fn test_spending_keeps_lifetime_coins() {
        let mut store = MemoryStore::new();
        let mut p = Progression::default();
        for _ in 0..12 {
            p.credit_coin(&mut store);
        }
        p.purchase_or_equip(&mut store, "duck").unwrap();
        assert_eq!(p.coins, 2);
        assert_eq!(p.lifetime_coins, 12);
    }

    #[test]
    fn test_lifetime_coins_migrated_from_balance() {
        let mut store = MemoryStore::new();
        persistence::save_u64(&mut store, keys::COIN_COUNT, 30).unwrap();
        let p = Progression::load(&store);
        assert_eq!(p.lifetime_coins, 30);
    }

    #[test]
    fn test_equipped_skin_must_be_owned() {
        let mut store = MemoryStore::new();
        store.set(keys::EQUIPPED_SKIN, "black").unwrap();
        let p = Progression::load(&store);
        assert_eq!(p.equipped, DEFAULT_SKIN);
    }

    #[test]
    fn test_corrupt_store_loads_defaults() {
        let mut store = MemoryStore::new();
        store.set(keys::COIN_COUNT, "NaN").unwrap();
        store.set(keys::ACHIEVEMENTS, "[[[").unwrap();
        store.set(keys::BEST_SCORES, "null").unwrap();
        let p = Progression::load(&store);
        assert_eq!(p, Progression::default());
    }

    #[test]
    fn test_obstacle_achievements() {
        let mut store = MemoryStore::new();
        let mut p = Progression::default();
        let mut unlocked = Vec::new();
        for _ in 0..50 {
            unlocked.extend(p.record_obstacle_pass(&mut store));
        }
        assert_eq!(unlocked, vec![Achievement::Obstacles20, Achievement::Obstacles50]);
        assert!(!p.is_unlocked(Achievement::Obstacles100));

        let reloaded = Progression::load(&store);
        assert_eq!(reloaded.lifetime_obstacles, 50);
        assert!(reloaded.is_unlocked(Achievement::Obstacles50));
    }

    #[test]
    fn test_achievements_never_clear() {
        let mut store = MemoryStore::new();
        let mut p = Progression::default();
        for _ in 0..100 {
            p.credit_coin(&mut store);
        }
        assert!(p.is_unlocked(Achievement::Coins100));

        // Counter reads lower than the threshold again
        p.lifetime_coins = 3;
        assert!(p.check_achievements(&mut store).is_empty());
        assert!(p.is_unlocked(Achievement::Coins100));
        assert!(Progression::load(&store).is_unlocked(Achievement::Coins100));
    }

    #[test]
    fn test_check_achievements_is_idempotent() {
        let mut store = MemoryStore::new();
        let mut p = Progression::default();
        p.lifetime_obstacles = 25;
        assert_eq!(p.check_achievements(&mut store), vec![Achievement::Obstacles20]);
        let flags = p.achievements.clone();
        assert!(p.check_achievements(&mut store).is_empty());
        assert_eq!(p.achievements, flags);
    }

    #[test]
    fn test_run_end_updates_best_and_leaderboard() {
        let mut store = MemoryStore::new();
        let mut board = LocalLeaderboard::new(MemoryStore::new());
        let mut p = Progression::default();

        let record = p.record_run_end(&mut store, &mut board, entry(21, Difficulty::Hard));
        assert!(record.new_best);
        assert_eq!(record.unlocked, vec![Achievement::Score20]);
        assert_eq!(p.best_score(Difficulty::Hard), 21);
        assert_eq!(p.best_score(Difficulty::Easy), 0);

        let record = p.record_run_end(&mut store, &mut board, entry(4, Difficulty::Hard));
        assert!(!record.new_best);
        assert_eq!(p.best_score(Difficulty::Hard), 21);

        assert_eq!(board.query(Difficulty::Hard).unwrap().len(), 2);
        assert_eq!(Progression::load(&store).best_score(Difficulty::Hard), 21);
    }

    #[test]
    fn test_leaderboard_failure_keeps_local_state() {
        let mut store = MemoryStore::new();
        let mut p = Progression::default();
        let record = p.record_run_end(&mut store, &mut BrokenBoard, entry(3, Difficulty::Easy));
        assert!(record.new_best);
        assert_eq!(p.best_score(Difficulty::Easy), 3);
    }
}
