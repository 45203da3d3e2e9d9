// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Field-Line View Diagnostics
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Synthetic field-line diagnostics.
//!
//! Stage 3: field-line pixel mapping, rasterisation, image set artifact
//! Stage 4: frame correlation and emissivity reconstruction

pub mod artifact;
pub mod correlation;
pub mod fieldlines;
pub mod raster;
pub mod tomography;
