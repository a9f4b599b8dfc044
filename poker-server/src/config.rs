//! Process configuration. `figment` layers a `Poker.toml` file with `POKER_`-prefixed
//! environment variable overrides, the same crate Rocket itself builds its own config on, so no
//! new ecosystem is introduced purely for this.
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Every configuration key spec.md §6 names, plus the bind address and SQLite path needed to
/// actually run a process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_address: String,
    pub bind_port: u16,
    pub database_url: String,
    pub action_timeout_secs: u32,
    pub hand_timeout_secs: u32,
    pub auto_start_delay_secs: u32,
    pub min_buy_in_multiplier: u32,
    pub max_buy_in_multiplier: u32,
    pub max_players: u8,
    pub currency: String,
    pub rake_policy: RakePolicy,
    /// Blinds for a table the Hub spawns on first `join-table` for a never-before-seen
    /// `TableId` — table creation has no wire verb of its own (spec.md §1 excludes admin/CRUD
    /// endpoints), so a fresh table always starts at these stakes.
    pub default_small_blind_cents: i64,
    pub default_big_blind_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RakePolicy {
    pub strategy: String,
    pub percentage: f64,
    pub max_rake: i64,
    pub min_pot: i64,
    pub time_amount: i64,
}

impl Default for RakePolicy {
    fn default() -> Self {
        Self {
            strategy: "percentage".into(),
            percentage: 0.05,
            max_rake: 300,
            min_pot: 0,
            time_amount: 0,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".into(),
            bind_port: 8000,
            database_url: "poker.sqlite".into(),
            action_timeout_secs: 30,
            hand_timeout_secs: 600,
            auto_start_delay_secs: 3,
            min_buy_in_multiplier: 20,
            max_buy_in_multiplier: 200,
            max_players: 9,
            currency: "USD".into(),
            rake_policy: RakePolicy::default(),
            default_small_blind_cents: 100,
            default_big_blind_cents: 200,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("Poker.toml"))
            .merge(Env::prefixed("POKER_"))
            .extract()
    }
}
