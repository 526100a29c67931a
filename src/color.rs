//! Deterministic swatch derivation: (tone, hue) -> renderable HSL.

use crate::domain::{ColorEntry, Hue, Tone};

/// Yellow/orange band, exclusive bounds in degrees. Hues inside it read
/// lighter than the rest of the wheel at equal saturation/lightness.
const YELLOW_BAND_DEG: (u16, u16) = (30, 60);

/// Lightness added to dark tones inside the yellow band so they stay
/// distinguishable from their neighbors.
const YELLOW_BAND_BOOST: u8 = 5;

/// Tones below this base lightness count as dark for the correction.
const DARK_TONE_LIGHTNESS: u8 = 50;

/// Derive the swatch for one (tone, hue) pair.
///
/// Total over catalog members, no side effects; the same pair always yields
/// the same entry. The tone record keeps its uncorrected lightness; only the
/// rendered value carries the yellow-band boost.
pub fn derive_color(tone: &Tone, hue: &Hue) -> ColorEntry {
  ColorEntry {
    id: format!("{}-{}", tone.id, hue.id),
    tone_id: tone.id,
    hue_id: hue.id,
    tone_name: tone.name,
    hue_name: hue.name,
    description: tone.description,

    hue_deg: hue.angle,
    saturation: tone.saturation,
    lightness: rendered_lightness(tone, hue),
  }
}

fn rendered_lightness(tone: &Tone, hue: &Hue) -> u8 {
  let in_band = hue.angle > YELLOW_BAND_DEG.0 && hue.angle < YELLOW_BAND_DEG.1;
  if in_band && tone.lightness < DARK_TONE_LIGHTNESS {
    tone.lightness + YELLOW_BAND_BOOST
  } else {
    tone.lightness
  }
}
