//! Source-role state machine.
//!
//! `Idle -> Active -> Cooldown -> Idle`, evaluated once per round from local
//! state and a per-node RNG only. Neighbor data is never consulted.

use crate::config::SourceConfig;
use geocast_data::{NodeId, RoleState, SourcePayload, SourceRole};
use rand::Rng;

/// What happened to the role during one step.
#[derive(Debug, Clone, PartialEq)]
pub enum RoleTransition {
    /// No state change (includes a failed activation draw).
    Unchanged,
    /// Started a new source episode with this payload.
    Activated(SourcePayload),
    /// Left the source role and entered cooldown.
    Retired,
    /// Cooldown elapsed; eligible for a draw from the next round on.
    Rearmed,
}

pub trait RoleLogic {
    fn step<R: Rng>(
        &mut self,
        id: NodeId,
        now: f64,
        config: &SourceConfig,
        rng: &mut R,
    ) -> RoleTransition;

    /// The payload to emit this round, if the node is an active source.
    fn emitting(&self) -> Option<&SourcePayload>;
}

impl RoleLogic for SourceRole {
    fn step<R: Rng>(
        &mut self,
        id: NodeId,
        now: f64,
        config: &SourceConfig,
        rng: &mut R,
    ) -> RoleTransition {
        match self.state {
            RoleState::Idle => {
                self.last_attempt = Some(now);
                if !rng.gen_bool(config.activation_probability.clamp(0.0, 1.0)) {
                    return RoleTransition::Unchanged;
                }

                self.emission_counter += 1;
                let radius_max = config.radius_max.max(config.radius_min);
                let budget = f64::from(rng.gen_range(config.radius_min..=radius_max));
                let content = format!(
                    "{}-{}-{}",
                    config.content_prefix, id, self.emission_counter
                );
                let payload = SourcePayload::new(id, budget, content, self.emission_counter);

                self.state = RoleState::Active { since: now };
                self.last_role_flip = now;
                self.current_message = Some(payload.clone());
                RoleTransition::Activated(payload)
            }
            RoleState::Active { since } => {
                if now - since >= config.min_active_secs {
                    self.state = RoleState::Cooldown { since: now };
                    self.last_role_flip = now;
                    self.current_message = None;
                    RoleTransition::Retired
                } else {
                    RoleTransition::Unchanged
                }
            }
            RoleState::Cooldown { since } => {
                if now - since >= config.cooldown_secs {
                    self.state = RoleState::Idle;
                    RoleTransition::Rearmed
                } else {
                    RoleTransition::Unchanged
                }
            }
        }
    }

    fn emitting(&self) -> Option<&SourcePayload> {
        if self.is_source() {
            self.current_message.as_ref()
        } else {
            None
        }
    }
}
