//! Quiz session state machine.
//!
//! A session walks one shuffled deck as a cyclic practice loop. It alternates
//! between two phases: `AwaitingAnswer` (card shown, no guess yet) and
//! `ShowingResult` (verdict shown, advance gate open). Submitting in the
//! wrong phase is a caller error and leaves the session untouched.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::catalog::TONES;
use crate::domain::{ColorEntry, Deck, Tone};

/// Points awarded per correct answer.
pub const POINTS_PER_CORRECT: u32 = 10;
/// Size of each multiple-choice option set.
pub const OPTION_COUNT: usize = 4;
/// How many recent outcomes the sliding history window retains.
pub const HISTORY_WINDOW: usize = 5;

/// Caller errors. These are defects in the driving code, not runtime
/// conditions; the session rejects them without corrupting its state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("a session needs a non-empty deck")]
    InvalidDeck,
    #[error("operation is not valid in the current phase")]
    InvalidTransition,
}

/// Where the session stands for the current card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Card shown, no guess submitted yet.
    AwaitingAnswer,
    /// Guess submitted; verdict visible until the caller advances.
    ShowingResult { correct: bool },
}

pub struct QuizSession {
    deck: Deck,
    index: usize,
    phase: Phase,
    score: u32,
    streak: u32,
    best_streak: u32,
    history: VecDeque<bool>,
    rng: StdRng,
}

impl QuizSession {
    /// Begin a fresh session over `deck`. Everything resets: index 0, score 0,
    /// streaks 0, empty history, phase `AwaitingAnswer`.
    pub fn start(deck: Deck, rng: StdRng) -> Result<Self, SessionError> {
        if deck.is_empty() {
            return Err(SessionError::InvalidDeck);
        }
        Ok(Self {
            deck,
            index: 0,
            phase: Phase::AwaitingAnswer,
            score: 0,
            streak: 0,
            best_streak: 0,
            history: VecDeque::with_capacity(HISTORY_WINDOW),
            rng,
        })
    }

    pub fn current_card(&self) -> &ColorEntry {
        &self.deck[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    /// Recent outcomes, oldest first. At most `HISTORY_WINDOW` entries.
    pub fn history(&self) -> Vec<bool> {
        self.history.iter().copied().collect()
    }

    /// Four distinct answer candidates for the current card: its tone plus
    /// three drawn without replacement from the remaining eleven, in random
    /// order. Recomputed on every call; each card gets its own set.
    pub fn options(&mut self) -> Vec<Tone> {
        let correct_id = self.deck[self.index].tone_id;
        let (correct, others): (Vec<Tone>, Vec<Tone>) =
            TONES.iter().copied().partition(|t| t.id == correct_id);

        let mut options: Vec<Tone> = others
            .choose_multiple(&mut self.rng, OPTION_COUNT - 1)
            .copied()
            .collect();
        options.extend(correct);
        options.shuffle(&mut self.rng);
        options
    }

    /// Grade a guess against the current card.
    ///
    /// Only valid in `AwaitingAnswer`. Correct: score +10, streak +1, best
    /// streak tracks the maximum. Incorrect: streak resets. Either way the
    /// outcome lands in the history window and the phase flips to
    /// `ShowingResult`.
    pub fn submit_answer(&mut self, tone_id: &str) -> Result<bool, SessionError> {
        if !matches!(self.phase, Phase::AwaitingAnswer) {
            return Err(SessionError::InvalidTransition);
        }

        let correct = self.deck[self.index].tone_id == tone_id;
        if correct {
            self.score += POINTS_PER_CORRECT;
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
        } else {
            self.streak = 0;
        }

        self.history.push_back(correct);
        if self.history.len() > HISTORY_WINDOW {
            self.history.pop_front();
        }

        self.phase = Phase::ShowingResult { correct };
        Ok(correct)
    }

    /// Move to the next card. Only valid in `ShowingResult`. The deck is a
    /// cyclic loop: the last index wraps to 0, there is no terminal state.
    pub fn advance(&mut self) -> Result<usize, SessionError> {
        if !matches!(self.phase, Phase::ShowingResult { .. }) {
            return Err(SessionError::InvalidTransition);
        }
        self.index = (self.index + 1) % self.deck.len();
        self.phase = Phase::AwaitingAnswer;
        Ok(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::build_deck;
    use rand::SeedableRng;

    fn fresh() -> QuizSession {
        QuizSession::start(build_deck(), StdRng::seed_from_u64(1)).unwrap()
    }

    /// The tone id of the session's current card.
    fn answer_of(s: &QuizSession) -> String {
        s.current_card().tone_id.to_string()
    }

    /// Any tone id that is wrong for the current card.
    fn wrong_for(s: &QuizSession) -> String {
        let right = s.current_card().tone_id;
        TONES.iter().find(|t| t.id != right).unwrap().id.to_string()
    }

    #[test]
    fn empty_deck_is_rejected() {
        let err = QuizSession::start(Vec::new(), StdRng::seed_from_u64(1)).err();
        assert_eq!(err, Some(SessionError::InvalidDeck));
    }

    #[test]
    fn fresh_session_state() {
        let s = fresh();
        assert_eq!(s.index(), 0);
        assert_eq!(s.score(), 0);
        assert_eq!(s.streak(), 0);
        assert_eq!(s.best_streak(), 0);
        assert!(s.history().is_empty());
        assert_eq!(s.phase(), Phase::AwaitingAnswer);
    }

    #[test]
    fn options_contain_the_answer_exactly_once() {
        let mut s = fresh();
        for _ in 0..50 {
            let right = answer_of(&s);
            let options = s.options();
            assert_eq!(options.len(), OPTION_COUNT);

            let distinct: std::collections::HashSet<&str> =
                options.iter().map(|t| t.id).collect();
            assert_eq!(distinct.len(), OPTION_COUNT);
            assert_eq!(options.iter().filter(|t| t.id == right).count(), 1);

            s.submit_answer(&right).unwrap();
            s.advance().unwrap();
        }
    }

    #[test]
    fn end_to_end_scoring_scenario() {
        let mut s = fresh();

        let correct = s.submit_answer(&answer_of(&s)).unwrap();
        assert!(correct);
        assert_eq!(s.score(), 10);
        assert_eq!(s.streak(), 1);
        assert_eq!(s.best_streak(), 1);
        assert_eq!(s.phase(), Phase::ShowingResult { correct: true });

        assert_eq!(s.advance().unwrap(), 1);
        assert_eq!(s.phase(), Phase::AwaitingAnswer);

        let correct = s.submit_answer(&wrong_for(&s)).unwrap();
        assert!(!correct);
        assert_eq!(s.score(), 10);
        assert_eq!(s.streak(), 0);
        assert_eq!(s.best_streak(), 1);
        assert_eq!(s.history(), vec![true, false]);
    }

    #[test]
    fn scoring_replays_identically_from_a_fresh_session() {
        for _ in 0..3 {
            let mut s = fresh();
            s.submit_answer(&answer_of(&s)).unwrap();
            assert_eq!(s.score(), 10);
            assert_eq!(s.streak(), 1);

            let mut s = fresh();
            s.submit_answer(&wrong_for(&s)).unwrap();
            assert_eq!(s.score(), 0);
            assert_eq!(s.streak(), 0);
        }
    }

    #[test]
    fn best_streak_is_monotone_and_bounds_streak() {
        let mut s = fresh();
        let mut prev_best = 0;
        // Miss every third answer.
        for i in 0..30 {
            let guess = if i % 3 == 2 { wrong_for(&s) } else { answer_of(&s) };
            s.submit_answer(&guess).unwrap();
            assert!(s.best_streak() >= prev_best);
            assert!(s.best_streak() >= s.streak());
            prev_best = s.best_streak();
            s.advance().unwrap();
        }
        assert_eq!(s.best_streak(), 2);
    }

    #[test]
    fn history_is_a_five_slot_sliding_window() {
        let mut s = fresh();
        let outcomes = [true, true, false, true, false, false, true];
        for &want_correct in &outcomes {
            let guess = if want_correct { answer_of(&s) } else { wrong_for(&s) };
            s.submit_answer(&guess).unwrap();
            s.advance().unwrap();
        }
        assert_eq!(s.history(), outcomes[outcomes.len() - HISTORY_WINDOW..].to_vec());
    }

    #[test]
    fn wrap_around_after_the_last_card() {
        let mut s = fresh();
        assert_eq!(s.deck_len(), 144);
        for _ in 0..143 {
            s.submit_answer(&answer_of(&s)).unwrap();
            s.advance().unwrap();
        }
        assert_eq!(s.index(), 143);
        s.submit_answer(&answer_of(&s)).unwrap();
        assert_eq!(s.advance().unwrap(), 0);
        assert_eq!(s.phase(), Phase::AwaitingAnswer);
    }

    #[test]
    fn misordered_calls_are_rejected_without_corrupting_state() {
        let mut s = fresh();
        assert_eq!(s.advance(), Err(SessionError::InvalidTransition));

        s.submit_answer(&answer_of(&s)).unwrap();
        let score = s.score();
        assert_eq!(s.submit_answer(&answer_of(&s)), Err(SessionError::InvalidTransition));
        assert_eq!(s.score(), score);
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.phase(), Phase::ShowingResult { correct: true });
    }
}
