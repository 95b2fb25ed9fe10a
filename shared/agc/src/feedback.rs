//! Per-sample feedback AGC with asymmetric attack/decay.
//!
//! The gain is nudged after every sample by `error * rate`, where `error` is
//! the distance between the output magnitude and the reference. The fast
//! attack rate is chosen whenever that error is larger than the gain itself.

use tracing::{debug, trace};

use crate::sample::FeedbackSample;

/// Gain the controller falls back to instead of going to or below zero.
pub const GAIN_FLOOR: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct FeedbackGainController<T: FeedbackSample> {
    attack: T,
    decay: T,
    reference: T,
    max_gain: Option<T>,
    gain: T,
}

impl<T: FeedbackSample> FeedbackGainController<T> {
    /// Controller without a gain ceiling.
    pub fn with_attack_decay(attack: T, decay: T, reference: T) -> Self {
        Self::new(attack, decay, reference, None)
    }

    /// [`with_attack_decay`](Self::with_attack_decay) tracking a reference of 1.0.
    pub fn unit_reference(attack: T, decay: T) -> Self {
        Self::with_attack_decay(attack, decay, T::ONE)
    }

    /// Controller with a gain ceiling.
    ///
    /// Takes the decay rate *first*, unlike
    /// [`with_attack_decay`](Self::with_attack_decay). Existing modem tuning
    /// tables pass their four parameters in this order; keep them as they are
    /// rather than swapping the rates. `max_gain` must be positive.
    pub fn with_decay_attack_ceiling(decay: T, attack: T, reference: T, max_gain: T) -> Self {
        Self::new(attack, decay, reference, Some(max_gain))
    }

    fn new(attack: T, decay: T, reference: T, max_gain: Option<T>) -> Self {
        debug!(?attack, ?decay, ?reference, ?max_gain, "feedback agc created");
        Self {
            attack,
            decay,
            reference,
            max_gain,
            gain: T::ONE,
        }
    }

    /// Amplify one sample and adapt the gain for the next one.
    ///
    /// The returned sample is scaled by the gain in effect *before* this call.
    #[inline]
    pub fn process(&mut self, sample: T) -> T {
        let output = sample * self.gain;
        let error = output.abs() - self.reference;

        let rate = if error.abs() > self.gain {
            self.attack
        } else {
            self.decay
        };

        self.gain = self.gain - error * rate;

        // Also catches NaN from a non-finite input.
        if !(self.gain > T::ZERO) {
            trace!(?sample, ?error, "agc gain floored");
            self.gain = T::GAIN_FLOOR;
        }

        if let Some(max_gain) = self.max_gain {
            if self.gain > max_gain {
                self.gain = max_gain;
            }
        }

        output
    }

    /// Run [`process`](Self::process) over `samples` in order, in place.
    pub fn process_in_place(&mut self, samples: &mut [T]) {
        for s in samples.iter_mut() {
            *s = self.process(*s);
        }
    }

    pub fn gain(&self) -> T {
        self.gain
    }

    pub fn attack(&self) -> T {
        self.attack
    }

    pub fn decay(&self) -> T {
        self.decay
    }

    pub fn reference(&self) -> T {
        self.reference
    }

    pub fn max_gain(&self) -> Option<T> {
        self.max_gain
    }
}
