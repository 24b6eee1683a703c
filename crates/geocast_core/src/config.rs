//! Configuration management for simulation parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `config.toml` file. Every tunable of the protocol (activation
//! probability, active and cooldown windows, radius range) is supplied here
//! and never computed internally.
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (hardcoded in `Default` impl)
//! 2. `config.toml` file (overrides defaults)
//! 3. CLI flags for seed and round count
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! node_count = 100
//! width = 100.0
//! height = 100.0
//! depth = 10.0
//! communication_range = 15.0
//! round_period_secs = 1.0
//! rounds = 300
//! seed = 42
//! deterministic = true
//!
//! [source]
//! activation_probability = 0.25
//! min_active_secs = 15.0
//! cooldown_secs = 15.0
//! radius_min = 10
//! radius_max = 30
//! content_prefix = "geocast"
//!
//! [mobility]
//! enabled = false
//! max_speed = 0.0
//!
//! [report]
//! mode = "Received"
//! snapshot_interval = 10
//! ```

use serde::{Deserialize, Serialize};

/// World-level simulation configuration.
///
/// Defines the bounding box nodes are placed in, how far a node can hear its
/// neighbors, and how simulated time advances per round.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub node_count: usize,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub communication_range: f64,
    /// Floor on the distance a field value travels per hop. Keeps stale
    /// values growing between co-located nodes so they drain.
    pub min_hop: f64,
    pub round_period_secs: f64,
    pub rounds: u64,
    pub seed: Option<u64>,
    pub deterministic: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            node_count: 100,
            width: 100.0,
            height: 100.0,
            depth: 10.0,
            communication_range: 15.0,
            min_hop: 1.0,
            round_period_secs: 1.0,
            rounds: 300,
            seed: None,
            deterministic: false,
        }
    }
}

/// Source-role state machine parameters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    /// Independent per-round probability that an idle node becomes a source.
    pub activation_probability: f64,
    pub min_active_secs: f64,
    pub cooldown_secs: f64,
    /// Inclusive integer range the per-episode radius is drawn from.
    pub radius_min: u32,
    pub radius_max: u32,
    pub content_prefix: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            activation_probability: 0.25,
            min_active_secs: 15.0,
            cooldown_secs: 15.0,
            radius_min: 10,
            radius_max: 30,
            content_prefix: "geocast".to_string(),
        }
    }
}

impl SourceConfig {
    /// The simple variant: 25% per-round draw, no active window, no cooldown.
    pub fn simple() -> Self {
        Self {
            min_active_secs: 0.0,
            cooldown_secs: 0.0,
            ..Self::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct MobilityConfig {
    pub enabled: bool,
    /// Maximum displacement per second along each axis.
    pub max_speed: f64,
}

/// What the round function reports back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReportMode {
    /// Running total of distinct messages received.
    #[default]
    Received,
    /// Filtered map of currently-visible senders.
    Senders,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub mode: ReportMode,
    /// Rounds between snapshots; 0 disables snapshots.
    pub snapshot_interval: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            mode: ReportMode::Received,
            snapshot_interval: 10,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub source: SourceConfig,
    pub mobility: MobilityConfig,
    pub report: ReportConfig,
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    ///
    /// # Validation Rules
    /// - World extents must be positive and finite
    /// - Probabilities must be in [0.0, 1.0]
    /// - Durations must be non-negative
    /// - The radius range must be non-empty
    pub fn validate(&self) -> anyhow::Result<()> {
        // World validation
        anyhow::ensure!(
            self.world.node_count <= 100_000,
            "Node count too large (max 100000)"
        );
        for (name, extent) in [
            ("width", self.world.width),
            ("height", self.world.height),
            ("depth", self.world.depth),
        ] {
            anyhow::ensure!(
                extent.is_finite() && extent >= 0.0,
                "World {name} must be finite and non-negative"
            );
        }
        anyhow::ensure!(
            self.world.width > 0.0 && self.world.height > 0.0,
            "World width and height must be positive"
        );
        anyhow::ensure!(
            self.world.communication_range.is_finite() && self.world.communication_range > 0.0,
            "Communication range must be positive"
        );
        anyhow::ensure!(
            self.world.min_hop.is_finite() && self.world.min_hop > 0.0,
            "Minimum hop distance must be positive"
        );
        anyhow::ensure!(
            self.world.round_period_secs.is_finite() && self.world.round_period_secs > 0.0,
            "Round period must be positive"
        );

        // Source validation
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.source.activation_probability),
            "Activation probability must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            self.source.min_active_secs >= 0.0,
            "Minimum active duration must be non-negative"
        );
        anyhow::ensure!(
            self.source.cooldown_secs >= 0.0,
            "Cooldown duration must be non-negative"
        );
        anyhow::ensure!(
            self.source.radius_min <= self.source.radius_max,
            "Radius range is empty ({} > {})",
            self.source.radius_min,
            self.source.radius_max
        );

        // Mobility validation
        anyhow::ensure!(
            self.mobility.max_speed.is_finite() && self.mobility.max_speed >= 0.0,
            "Max speed must be non-negative"
        );

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path, "config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Hash of the protocol-relevant parameters, for tagging run reports.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.world).as_bytes());
        hasher.update(format!("{:?}", self.source).as_bytes());
        hasher.update(format!("{:?}", self.mobility).as_bytes());
        hex::encode(hasher.finalize())
    }
}
