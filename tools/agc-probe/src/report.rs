use serde::Serialize;

#[derive(Default, Serialize, Clone, Debug)]
pub struct SegmentReport {
    pub amplitude: f64,
    pub input_peak: f64,
    /// Peak over the second half of the segment's output.
    pub settled_output_peak: f64,
    pub final_gain: f64,
}

#[derive(Default, Serialize, Clone, Debug)]
pub struct ProbeReport {
    pub controller: String,
    pub samples: usize,
    pub segments: Vec<SegmentReport>,
}

pub fn peak(samples: &[f64]) -> f64 {
    samples.iter().fold(0.0, |m, x| m.max(x.abs()))
}

/// Peak of the latter half of `samples`, once the controller had time to react.
pub fn settled_peak(samples: &[f64]) -> f64 {
    peak(&samples[samples.len() / 2..])
}
