use anyhow::{anyhow, Result};

pub fn positive(v: f64, name: &'static str) -> Result<f64> {
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(anyhow!("{name} must be finite and > 0, got {v}"))
    }
}

pub fn non_negative(v: f64, name: &'static str) -> Result<f64> {
    if v.is_finite() && v >= 0.0 {
        Ok(v)
    } else {
        Err(anyhow!("{name} must be finite and >= 0, got {v}"))
    }
}

pub fn amplitudes(values: &[f64]) -> Result<&[f64]> {
    if values.is_empty() {
        return Err(anyhow!("at least one --amplitude is required"));
    }
    for &v in values {
        non_negative(v, "amplitude")?;
    }
    Ok(values)
}
