//! Domain models used by the backend: tones, hues, and the derived swatches.

use serde::Serialize;

/// One of the twelve saturation/lightness presets of the taxonomy.
/// Tones live in a static catalog (`catalog::TONES`) and are never mutated.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct Tone {
  pub id: &'static str,
  pub name: &'static str,
  /// Saturation percentage, 0..=100.
  pub saturation: u8,
  /// Base lightness percentage, 0..=100. Rendering may adjust it; this value
  /// stays untouched (see `color::derive_color`).
  pub lightness: u8,
  pub description: &'static str,
}

/// One of the twelve hue presets. Angle in degrees, [0, 360).
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct Hue {
  pub id: u8,
  pub name: &'static str,
  pub angle: u16,
}

/// A rendered swatch: one tone crossed with one hue.
/// Derived only (`color::derive_color`), never stored independently.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ColorEntry {
  /// Composite identifier, `{toneId}-{hueId}`.
  pub id: String,
  pub tone_id: &'static str,
  pub hue_id: u8,
  pub tone_name: &'static str,
  pub hue_name: &'static str,
  pub description: &'static str,

  pub hue_deg: u16,
  pub saturation: u8,
  /// Rendered lightness, possibly yellow-band corrected.
  pub lightness: u8,
}

impl ColorEntry {
  /// CSS rendering of the swatch.
  pub fn css(&self) -> String {
    format!("hsl({}, {}%, {}%)", self.hue_deg, self.saturation, self.lightness)
  }
}

/// The full ordered (or shuffled) set of 144 swatches driving a session.
pub type Deck = Vec<ColorEntry>;
