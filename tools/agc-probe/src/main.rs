use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use tnc_agc::{DelayedBlockGainController, FeedbackConfig, FeedbackGainController, FeedbackSample};

mod report;
mod signal;
mod validate;

use report::{peak, settled_peak, ProbeReport, SegmentReport};
use signal::ToneSource;

/// Delay line length for the block controller (samples).
const DELAY: usize = 64;
/// Block size for the block controller (samples).
const BLOCK: usize = 32;

#[derive(Parser, Debug)]
#[command(name = "tnc-agc-probe", about = "Drive the TNC AGC with synthetic tones and report levels")]
struct Args {
    /// Samples generated per amplitude segment
    #[arg(long, default_value_t = 4800)]
    segment_len: usize,

    /// Tone period in samples
    #[arg(long, default_value_t = 20.0)]
    period: f64,

    /// Uniform noise amplitude added to every sample (0 disables)
    #[arg(long, default_value_t = 0.0)]
    noise: f64,

    /// RNG seed for the noise
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Write JSON report to this path
    #[arg(long)]
    report_json: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Per-sample feedback controller
    Feedback {
        /// JSON controller config; overrides the rate flags
        #[arg(long)]
        config: Option<String>,

        #[arg(long, default_value_t = 0.1)]
        attack: f64,

        #[arg(long, default_value_t = 0.01)]
        decay: f64,

        #[arg(long, default_value_t = 1.0)]
        reference: f64,

        /// Enable a gain ceiling
        #[arg(long)]
        max_gain: Option<f64>,

        /// Run at single precision
        #[arg(long, default_value_t = false)]
        single: bool,

        /// Tone amplitude per segment; repeat for a level step sequence
        #[arg(long = "amplitude", default_values_t = [0.05, 2.0, 0.5])]
        amplitudes: Vec<f64>,
    },

    /// Block feedforward controller on integer samples
    Block {
        #[arg(long, default_value_t = 1 << 14)]
        reference: i32,

        /// Tone amplitude per segment; repeat for a level step sequence
        #[arg(long = "amplitude", default_values_t = [200.0, 3000.0, 800.0])]
        amplitudes: Vec<f64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let args = Args::parse();
    validate::positive(args.period, "period")?;
    validate::non_negative(args.noise, "noise")?;

    let mut source = ToneSource::new(args.period, args.noise, args.seed);

    let rep = match args.cmd {
        Cmd::Feedback { config, attack, decay, reference, max_gain, single, amplitudes } => {
            let amplitudes = validate::amplitudes(&amplitudes)?;
            let cfg: FeedbackConfig = match config.as_deref() {
                Some(path) => {
                    let raw = std::fs::read_to_string(path).with_context(|| format!("read {path}"))?;
                    serde_json::from_str(&raw).with_context(|| format!("parse {path}"))?
                }
                None => match max_gain {
                    Some(max_gain) => FeedbackConfig::DecayAttackCeiling { decay, attack, reference, max_gain },
                    None => FeedbackConfig::AttackDecay { attack, decay, reference },
                },
            };
            info!(?cfg, single, "feedback probe");

            if single {
                run_feedback(cfg.build::<f32>()?, amplitudes, args.segment_len, &mut source)
            } else {
                run_feedback(cfg.build::<f64>()?, amplitudes, args.segment_len, &mut source)
            }
        }
        Cmd::Block { reference, amplitudes } => {
            let amplitudes = validate::amplitudes(&amplitudes)?;
            info!(reference, delay = DELAY, block = BLOCK, "block probe");
            run_block(reference, amplitudes, args.segment_len, &mut source)?
        }
    };

    info!("report: {}", serde_json::to_string_pretty(&rep)?);

    if let Some(path) = args.report_json.as_deref() {
        std::fs::write(path, serde_json::to_vec_pretty(&rep)?).with_context(|| format!("write {path}"))?;
        info!("wrote {}", path);
    }

    Ok(())
}

fn run_feedback<T: FeedbackSample>(
    mut agc: FeedbackGainController<T>,
    amplitudes: &[f64],
    segment_len: usize,
    source: &mut ToneSource,
) -> ProbeReport {
    let mut rep = ProbeReport {
        controller: "feedback".into(),
        ..Default::default()
    };

    for &amplitude in amplitudes {
        let input = source.segment(amplitude, segment_len);
        let mut samples: Vec<T> = input.iter().map(|&x| T::from_f64(x)).collect();
        agc.process_in_place(&mut samples);
        let output: Vec<f64> = samples.iter().map(|x| x.to_f64()).collect();

        let seg = SegmentReport {
            amplitude,
            input_peak: peak(&input),
            settled_output_peak: settled_peak(&output),
            final_gain: agc.gain().to_f64(),
        };
        info!(amplitude, gain = seg.final_gain, out_peak = seg.settled_output_peak, "segment");
        rep.samples += input.len();
        rep.segments.push(seg);
    }

    rep
}

fn run_block(
    reference: i32,
    amplitudes: &[f64],
    segment_len: usize,
    source: &mut ToneSource,
) -> Result<ProbeReport> {
    let mut agc = DelayedBlockGainController::<i32, DELAY, BLOCK>::new(reference);

    let mut input: Vec<i32> = Vec::new();
    let mut bounds = Vec::with_capacity(amplitudes.len());
    for &amplitude in amplitudes {
        let start = input.len();
        input.extend(source.segment(amplitude, segment_len).into_iter().map(|x| x.round() as i32));
        bounds.push((amplitude, start, input.len()));
    }

    // trailing silence flushes the last segment out of the delay line
    let total = input.len();
    input.resize((total + DELAY).div_ceil(BLOCK) * BLOCK, 0);

    let mut output = Vec::with_capacity(input.len());
    let mut gains = Vec::with_capacity(input.len() / BLOCK);
    for chunk in input.chunks_exact(BLOCK) {
        let block: &[i32; BLOCK] = chunk.try_into().context("split input into blocks")?;
        output.extend_from_slice(agc.process(block));
        gains.push(agc.gain());
    }

    let as_f64 = |xs: &[i32]| xs.iter().map(|&x| f64::from(x)).collect::<Vec<_>>();

    let mut rep = ProbeReport {
        controller: "block".into(),
        samples: total,
        ..Default::default()
    };
    for (amplitude, start, end) in bounds {
        if start == end {
            continue;
        }
        let seg = SegmentReport {
            amplitude,
            input_peak: peak(&as_f64(&input[start..end])),
            settled_output_peak: settled_peak(&as_f64(&output[start + DELAY..end + DELAY])),
            // gain picked while the segment's last sample sat in the delay line
            final_gain: f64::from(gains[(end - 1) / BLOCK]),
        };
        info!(amplitude, gain = seg.final_gain, out_peak = seg.settled_output_peak, "segment");
        rep.segments.push(seg);
    }

    Ok(rep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_probe_reports_every_segment() {
        let mut source = ToneSource::new(20.0, 0.0, 1);
        let agc = FeedbackConfig::default().build::<f64>().unwrap();
        let rep = run_feedback(agc, &[0.05, 2.0], 4000, &mut source);
        assert_eq!(rep.samples, 8000);
        assert_eq!(rep.segments.len(), 2);
        for seg in &rep.segments {
            assert!(seg.final_gain > 0.0);
            assert!((seg.input_peak - seg.amplitude).abs() < 1e-9);
        }
    }

    #[test]
    fn block_probe_normalises_level_steps() {
        let mut source = ToneSource::new(20.0, 0.0, 1);
        let rep = run_block(1 << 14, &[200.0, 3000.0], 2048, &mut source).unwrap();
        assert_eq!(rep.samples, 4096);
        // 16384 >> floor_log2(200) and 16384 >> floor_log2(3000)
        assert_eq!(rep.segments[0].final_gain, 128.0);
        assert_eq!(rep.segments[1].final_gain, 8.0);
        for seg in &rep.segments {
            assert!(seg.settled_output_peak >= 8192.0 && seg.settled_output_peak < 32768.0);
        }
    }
}
