//! Block feedforward AGC with a lookahead delay line.
//!
//! Samples leave the delay line `DELAY` positions after they entered it and
//! are scaled by the gain computed at the end of the previous block. That gain
//! comes from the peak of the whole delay line, so a loud burst lowers the
//! gain before the burst itself is emitted.

use tracing::{debug, trace};

use crate::sample::BlockSample;

/// Feedforward AGC over blocks of `BLOCK` samples with a `DELAY` sample delay line.
///
/// Storage is inline; nothing is allocated after construction.
#[derive(Debug, Clone)]
pub struct DelayedBlockGainController<T: BlockSample, const DELAY: usize, const BLOCK: usize> {
    delay_line: [T; DELAY],
    block: [T; BLOCK],
    cursor: usize,
    reference: T,
    gain: T,
}

impl<T: BlockSample, const DELAY: usize, const BLOCK: usize> DelayedBlockGainController<T, DELAY, BLOCK> {
    pub const DELAY_LEN: usize = DELAY;
    pub const BLOCK_SIZE: usize = BLOCK;

    const NON_EMPTY: () = assert!(DELAY > 0 && BLOCK > 0, "delay line and block must be non-empty");

    /// Zero-filled controller. The gain starts at zero, so the first block out is silent.
    pub fn new(reference: T) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_EMPTY;

        debug!(delay = DELAY, block = BLOCK, ?reference, "feedforward agc created");
        Self {
            delay_line: [T::ZERO; DELAY],
            block: [T::ZERO; BLOCK],
            cursor: 0,
            reference,
            gain: T::ZERO,
        }
    }

    /// Push one block through the delay line and return the delayed, scaled block.
    ///
    /// The returned slice is the controller's own output buffer; it stays
    /// borrowed until the next call, which overwrites it.
    pub fn process(&mut self, input: &[T; BLOCK]) -> &[T; BLOCK] {
        for (out, &sample) in self.block.iter_mut().zip(input.iter()) {
            *out = self.delay_line[self.cursor].scale(self.gain);
            self.delay_line[self.cursor] = sample;
            self.cursor += 1;
            if self.cursor == DELAY {
                self.cursor = 0;
            }
        }

        let peak = self.peak();
        self.gain = T::gain_for_peak(self.reference, peak);
        trace!(?peak, gain = ?self.gain, "feedforward agc gain updated");

        &self.block
    }

    /// Same as [`process`](Self::process), copying the result into `output`.
    pub fn process_into(&mut self, input: &[T; BLOCK], output: &mut [T; BLOCK]) {
        *output = *self.process(input);
    }

    /// Gain that will be applied to the next block.
    pub fn gain(&self) -> T {
        self.gain
    }

    pub fn reference(&self) -> T {
        self.reference
    }

    /// Delay line slot the next input sample is written to.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn peak(&self) -> T {
        self.delay_line.iter().fold(T::ZERO, |peak, &x| {
            let m = x.magnitude();
            if m > peak {
                m
            } else {
                peak
            }
        })
    }
}
