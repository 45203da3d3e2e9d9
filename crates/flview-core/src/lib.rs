// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Field-Line View Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Pinhole camera geometry.
//!
//! Stage 1: hardware sources, sightline locator
//! Stage 2: culling, image plane, projection, view build

pub mod aperture;
pub mod culling;
pub mod hardware;
pub mod image_plane;
pub mod projection;
pub mod view;
