//! Automatic gain control for the TNC receive path.
//!
//! Two unrelated controllers normalise the amplitude of a sample stream ahead
//! of demodulation:
//!
//! * [`FeedbackGainController`] adapts a scalar gain per sample from the
//!   error between output amplitude and a reference, with separate attack and
//!   decay rates.
//! * [`DelayedBlockGainController`] delays the stream through a fixed delay
//!   line, looks at the peak of everything in that line and picks the next
//!   gain as a power-of-two scale.
//!
//! Neither allocates after construction and neither can fail while
//! processing; degenerate gain values are clamped.

pub mod config;
pub mod error;
pub mod feedback;
pub mod feedforward;
pub mod sample;

pub use config::FeedbackConfig;
pub use error::{AgcError, AgcResult};
pub use feedback::{FeedbackGainController, GAIN_FLOOR};
pub use feedforward::DelayedBlockGainController;
pub use sample::{floor_log2, BlockSample, FeedbackSample};

/// Double precision feedback AGC.
pub type Agc = FeedbackGainController<f64>;

/// Single precision feedback AGC for the hot path.
pub type FastAgc = FeedbackGainController<f32>;
