use tnc_agc::{Agc, DelayedBlockGainController, FastAgc, FeedbackConfig, GAIN_FLOOR};

const DELAY: usize = 32;
const BLOCK: usize = 16;

fn tone(amplitude: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|n| amplitude * (n as f64 * std::f64::consts::TAU / 20.0).sin())
        .collect()
}

#[test]
fn feedback_agc_tracks_level_steps() {
    let cfg: FeedbackConfig =
        serde_json::from_str(r#"{"mode":"attack_decay","attack":0.1,"decay":0.02,"reference":0.5}"#).unwrap();
    let mut agc: Agc = cfg.build().unwrap();

    for amplitude in [0.05, 4.0, 0.3] {
        let mut out = tone(amplitude, 8000);
        agc.process_in_place(&mut out);
        assert!(agc.gain() >= GAIN_FLOOR);

        let tail_peak = out[7000..].iter().fold(0.0f64, |m, x| m.max(x.abs()));
        assert!(
            tail_peak > 0.6 && tail_peak < 0.95,
            "amplitude {amplitude}: settled peak {tail_peak}"
        );
    }
}

#[test]
fn ceiling_limits_gain_on_silence() {
    let mut agc = FastAgc::with_decay_attack_ceiling(0.01, 0.1, 1.0, 16.0);
    for _ in 0..10_000 {
        assert_eq!(agc.process(0.0), 0.0);
        assert!(agc.gain() <= 16.0);
    }
    assert_eq!(agc.gain(), 16.0);
}

#[test]
fn feedforward_agc_normalises_integer_stream() {
    let mut agc = DelayedBlockGainController::<i32, DELAY, BLOCK>::new(1 << 14);

    let input: Vec<i32> = (0..64 * BLOCK)
        .map(|n| {
            let amplitude = if n < 32 * BLOCK { 200.0 } else { 3000.0 };
            (amplitude * (n as f64 * std::f64::consts::TAU / 10.0).sin()) as i32
        })
        .collect();

    let mut output = Vec::with_capacity(input.len());
    for chunk in input.chunks_exact(BLOCK) {
        let block: &[i32; BLOCK] = chunk.try_into().unwrap();
        output.extend_from_slice(agc.process(block));
    }

    // every sample comes out exactly DELAY positions late, scaled by a power of two
    for (k, &x) in input[..input.len() - DELAY].iter().enumerate() {
        let y = output[k + DELAY];
        if x == 0 {
            assert_eq!(y, 0);
        } else {
            assert_eq!(y % x, 0, "sample {k}: {y} is not a multiple of {x}");
            let gain = y / x;
            assert!(gain >= 1 && (gain as u32).is_power_of_two());
        }
    }

    // loud and quiet halves land in the same octave band
    let quiet_peak = output[8 * BLOCK..30 * BLOCK].iter().map(|y| y.abs()).max().unwrap();
    let loud_peak = output[40 * BLOCK..].iter().map(|y| y.abs()).max().unwrap();
    assert!(quiet_peak >= 1 << 13 && quiet_peak < 1 << 15, "quiet peak {quiet_peak}");
    assert!(loud_peak >= 1 << 13 && loud_peak < 1 << 15, "loud peak {loud_peak}");
}

#[test]
fn lookahead_lowers_gain_before_burst_leaves_delay_line() {
    let mut agc = DelayedBlockGainController::<i16, DELAY, BLOCK>::new(1 << 12);

    // prime with a quiet level
    for _ in 0..8 {
        agc.process(&[10; BLOCK]);
    }
    assert_eq!(agc.gain(), (1 << 12) >> 3);

    // burst goes in while quiet samples come out; the gain drops before any
    // burst sample leaves the delay line
    let out = *agc.process(&[2000; BLOCK]);
    assert!(out.iter().all(|&y| y == 10 * ((1 << 12) >> 3)));
    assert_eq!(agc.gain(), (1 << 12) >> 10);

    agc.process(&[2000; BLOCK]);
    let out = agc.process(&[2000; BLOCK]);
    assert!(out.iter().all(|&y| y == 2000 * 4));
}
