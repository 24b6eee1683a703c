pub mod macros;

use geocast_lib::model::config::{AppConfig, SourceConfig};
use geocast_lib::model::data::{NodeId, Position};
use geocast_lib::model::network::Network;

#[allow(dead_code)]
pub struct NetworkBuilder {
    config: AppConfig,
    positions: Vec<Position>,
    sources: Vec<(NodeId, SourceConfig)>,
}

#[allow(dead_code)]
impl NetworkBuilder {
    /// A deterministic network in which no node volunteers as a source.
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.seed = Some(7);
        config.world.deterministic = true;
        config.source.activation_probability = 0.0;
        config.report.snapshot_interval = 0;
        Self {
            config,
            positions: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_range(mut self, range: f64) -> Self {
        self.config.world.communication_range = range;
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_node(mut self, x: f64, y: f64, z: f64) -> Self {
        self.positions.push(Position::new(x, y, z));
        self
    }

    pub fn with_positions(mut self, positions: Vec<Position>) -> Self {
        self.positions = positions;
        self
    }

    /// Overrides the source parameters of the node at index `id`.
    pub fn with_source(mut self, id: u32, source: SourceConfig) -> Self {
        self.sources.push((NodeId(id), source));
        self
    }

    pub fn build(self) -> Network {
        let mut network = Network::with_positions(self.config, self.positions)
            .expect("Failed to create network in test builder");
        for (id, source) in self.sources {
            network.set_source_config(id, source);
        }
        network
    }
}

/// A node that becomes a source on its first draw, with a fixed radius.
#[allow(dead_code)]
pub fn eager_source(radius: u32) -> SourceConfig {
    SourceConfig {
        activation_probability: 1.0,
        radius_min: radius,
        radius_max: radius,
        ..SourceConfig::default()
    }
}
