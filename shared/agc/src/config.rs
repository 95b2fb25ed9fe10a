use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AgcError, AgcResult};
use crate::feedback::FeedbackGainController;
use crate::sample::FeedbackSample;

/// Serializable description of a [`FeedbackGainController`].
///
/// Each variant names its fields, so a config file cannot silently swap the
/// two rates the way positional arguments can.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FeedbackConfig {
    AttackDecay {
        attack: f64,
        decay: f64,
        #[serde(default = "unit_reference")]
        reference: f64,
    },
    DecayAttackCeiling {
        decay: f64,
        attack: f64,
        reference: f64,
        max_gain: f64,
    },
}

fn unit_reference() -> f64 {
    1.0
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self::AttackDecay {
            attack: 0.1,
            decay: 0.01,
            reference: 1.0,
        }
    }
}

impl FeedbackConfig {
    /// Validate and construct the controller at precision `T`.
    pub fn build<T: FeedbackSample>(&self) -> AgcResult<FeedbackGainController<T>> {
        debug!(config = ?self, "building feedback agc");
        match *self {
            Self::AttackDecay { attack, decay, reference } => {
                let attack = non_negative::<T>(attack, "attack must be finite and non-negative")?;
                let decay = non_negative::<T>(decay, "decay must be finite and non-negative")?;
                let reference = non_negative::<T>(reference, "reference must be finite and non-negative")?;
                Ok(FeedbackGainController::with_attack_decay(attack, decay, reference))
            }
            Self::DecayAttackCeiling { decay, attack, reference, max_gain } => {
                let decay = non_negative::<T>(decay, "decay must be finite and non-negative")?;
                let attack = non_negative::<T>(attack, "attack must be finite and non-negative")?;
                let reference = non_negative::<T>(reference, "reference must be finite and non-negative")?;
                let max_gain = non_negative::<T>(max_gain, "max_gain must be finite and positive")?;
                if !(max_gain > T::ZERO) {
                    return Err(AgcError::InvalidArgument("max_gain must be finite and positive"));
                }
                Ok(FeedbackGainController::with_decay_attack_ceiling(decay, attack, reference, max_gain))
            }
        }
    }
}

fn non_negative<T: FeedbackSample>(v: f64, msg: &'static str) -> AgcResult<T> {
    // converted first: a finite f64 can still overflow f32
    let v = T::from_f64(v);
    if v.is_finite() && v >= T::ZERO {
        Ok(v)
    } else {
        Err(AgcError::InvalidArgument(msg))
    }
}
