//! Deck construction and shuffling.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::{HUES, TONES};
use crate::color::derive_color;
use crate::domain::{ColorEntry, Deck};

/// Enumerate the full tone x hue product in catalog order.
///
/// Outer loop tones, inner loop hues: 144 entries, exactly one per pair.
/// Duplicates and omissions are impossible by construction.
pub fn build_deck() -> Deck {
  let mut deck = Vec::with_capacity(TONES.len() * HUES.len());
  for tone in TONES.iter() {
    for hue in HUES.iter() {
      deck.push(derive_color(tone, hue));
    }
  }
  deck
}

/// Uniform in-place permutation (Fisher-Yates, via `SliceRandom`).
/// The randomness source is injected so callers can seed it.
pub fn shuffle(deck: &mut [ColorEntry], rng: &mut impl Rng) {
  deck.shuffle(rng);
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::rngs::StdRng;
  use rand::SeedableRng;
  use std::collections::HashSet;

  #[test]
  fn deck_is_complete_and_duplicate_free() {
    let deck = build_deck();
    assert_eq!(deck.len(), 144);
    let ids: HashSet<&str> = deck.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids.len(), 144);
    let pairs: HashSet<(&str, u8)> = deck.iter().map(|e| (e.tone_id, e.hue_id)).collect();
    assert_eq!(pairs.len(), 144);
  }

  #[test]
  fn canonical_order_is_tone_major() {
    let deck = build_deck();
    // First twelve entries share the first tone, walking the hue wheel.
    assert!(deck[..12].iter().all(|e| e.tone_id == TONES[0].id));
    assert_eq!(deck[0].hue_id, HUES[0].id);
    assert_eq!(deck[11].hue_id, HUES[11].id);
    assert_eq!(deck[12].tone_id, TONES[1].id);
  }

  #[test]
  fn shuffle_is_a_permutation() {
    let canonical = build_deck();
    let mut deck = canonical.clone();
    let mut rng = StdRng::seed_from_u64(7);
    shuffle(&mut deck, &mut rng);

    assert_ne!(deck, canonical, "a 144-entry shuffle staying in place is effectively impossible");

    let mut a: Vec<&str> = deck.iter().map(|e| e.id.as_str()).collect();
    let mut b: Vec<&str> = canonical.iter().map(|e| e.id.as_str()).collect();
    a.sort_unstable();
    b.sort_unstable();
    assert_eq!(a, b);
  }

  #[test]
  fn shuffle_is_deterministic_under_a_fixed_seed() {
    let mut first = build_deck();
    let mut second = build_deck();
    shuffle(&mut first, &mut StdRng::seed_from_u64(42));
    shuffle(&mut second, &mut StdRng::seed_from_u64(42));
    assert_eq!(first, second);
  }
}
