//! The static tone and hue catalogs.
//!
//! Twelve tones crossed with twelve hues give the 144 swatches the trainer
//! drills. Both tables are fixed at compile time; consumers read them but
//! never mutate them.

use crate::domain::{Hue, Tone};

/// The twelve tones, in catalog order. Ids are the short codes users learn.
pub static TONES: [Tone; 12] = [
  Tone {
    id: "v",
    name: "Vivid",
    saturation: 100,
    lightness: 50,
    description: "Pure and intense, the strongest expression of each hue.",
  },
  Tone {
    id: "b",
    name: "Bright",
    saturation: 85,
    lightness: 60,
    description: "Clear and cheerful, vivid lifted toward white.",
  },
  Tone {
    id: "s",
    name: "Strong",
    saturation: 80,
    lightness: 45,
    description: "Rich and assertive without the full punch of vivid.",
  },
  Tone {
    id: "dp",
    name: "Deep",
    saturation: 75,
    lightness: 30,
    description: "Dark and saturated, the hue sinking toward black.",
  },
  Tone {
    id: "lt",
    name: "Light",
    saturation: 60,
    lightness: 75,
    description: "Airy and gentle, plenty of white with the hue still present.",
  },
  Tone {
    id: "sf",
    name: "Soft",
    saturation: 45,
    lightness: 65,
    description: "Muted and calm, between light and dull.",
  },
  Tone {
    id: "d",
    name: "Dull",
    saturation: 40,
    lightness: 45,
    description: "Grayed mid-lightness, the workhorse of subdued palettes.",
  },
  Tone {
    id: "dk",
    name: "Dark",
    saturation: 45,
    lightness: 22,
    description: "Heavy and shadowed, hue barely lifting out of black.",
  },
  Tone {
    id: "p",
    name: "Pale",
    saturation: 30,
    lightness: 87,
    description: "Whisper-faint, mostly white with a trace of hue.",
  },
  Tone {
    id: "ltg",
    name: "Light Grayish",
    saturation: 15,
    lightness: 75,
    description: "Hazy and quiet, a light gray tinted by the hue.",
  },
  Tone {
    id: "g",
    name: "Grayish",
    saturation: 12,
    lightness: 45,
    description: "A mid gray with a faint cast of the hue.",
  },
  Tone {
    id: "dkg",
    name: "Dark Grayish",
    saturation: 10,
    lightness: 25,
    description: "Near-charcoal, the hue only a suggestion.",
  },
];

/// The twelve hues, in wheel order. Angles are perceptually tuned rather
/// than evenly spaced; HSL hue distance is not uniform to the eye.
pub static HUES: [Hue; 12] = [
  Hue { id: 1, name: "Red", angle: 0 },
  Hue { id: 2, name: "Orange", angle: 35 },
  Hue { id: 3, name: "Yellow", angle: 52 },
  Hue { id: 4, name: "Yellow-Green", angle: 80 },
  Hue { id: 5, name: "Green", angle: 120 },
  Hue { id: 6, name: "Blue-Green", angle: 165 },
  Hue { id: 7, name: "Cyan", angle: 190 },
  Hue { id: 8, name: "Blue", angle: 225 },
  Hue { id: 9, name: "Blue-Violet", angle: 255 },
  Hue { id: 10, name: "Violet", angle: 280 },
  Hue { id: 11, name: "Magenta", angle: 310 },
  Hue { id: 12, name: "Red-Violet", angle: 340 },
];

/// Look up a tone by its short code.
pub fn tone_by_id(id: &str) -> Option<&'static Tone> {
  TONES.iter().find(|t| t.id == id)
}

/// Look up a hue by its numeric id.
#[allow(dead_code)]
pub fn hue_by_id(id: u8) -> Option<&'static Hue> {
  HUES.iter().find(|h| h.id == id)
}
