// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Errors
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error(
        "Sightline search: no hardware point aligns with alpha={alpha_deg}°, beta={beta_deg}° \
         ({searched} points searched)"
    )]
    AlignmentNotFound {
        alpha_deg: f64,
        beta_deg: f64,
        searched: usize,
    },

    #[error("Pixel calibration unavailable: {0}")]
    CalibrationUnavailable(String),

    #[error("Field-line tracer failed for seed {seed}: {message}")]
    TracerFailure { seed: String, message: String },

    #[error("Field line {label} has only {in_frame} in-frame points")]
    EmptyFrame { label: String, in_frame: usize },

    #[error("Degenerate vector: {0}")]
    DegenerateVector(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("NPZ archive error: {0}")]
    Npz(String),
}

impl ViewError {
    /// True for per-seed conditions that are skipped rather than aborting a run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ViewError::TracerFailure { .. }
                | ViewError::EmptyFrame { .. }
                | ViewError::DegenerateVector(_)
        )
    }
}

pub type ViewResult<T> = Result<T, ViewError>;
