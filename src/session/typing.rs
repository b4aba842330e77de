//! Character-by-character reveal of a finished response.
//!
//! The renderer owns the state machine only; scheduling belongs to the
//! caller. `begin` hands back either `Reveal::Instant` (nothing to schedule)
//! or a `Reveal::Timed` with the interval and a ticket. Each timer fire calls
//! `tick` with that ticket; a ticket from a superseded reveal is rejected, so
//! starting a new reveal implicitly cancels the old timer's effect.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum RevealState {
    #[default]
    Idle,
    Revealing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    /// Whole text revealed in one step; no ticks will follow.
    Instant,
    /// Schedule `tick(ticket)` every `interval` until it reports done.
    Timed { interval: Duration, ticket: u64 },
}

#[derive(Debug, Default)]
pub struct Typewriter {
    text: Vec<char>,
    revealed: usize,
    ticket: u64,
    state: RevealState,
}

impl Typewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start revealing `text` at `speed_ms` milliseconds per character.
    ///
    /// Supersedes any reveal in progress. Speed 0 (and empty text) reveal
    /// everything immediately.
    pub fn begin(&mut self, text: &str, speed_ms: u64) -> Reveal {
        self.ticket = self.ticket.wrapping_add(1);
        self.text = text.chars().collect();

        if speed_ms == 0 || self.text.is_empty() {
            self.revealed = self.text.len();
            self.state = RevealState::Idle;
            return Reveal::Instant;
        }

        self.revealed = 0;
        self.state = RevealState::Revealing;
        Reveal::Timed {
            interval: Duration::from_millis(speed_ms),
            ticket: self.ticket,
        }
    }

    /// Reveal one more character.
    ///
    /// Returns `Some(true)` while characters remain, `Some(false)` on the
    /// tick that completes the text, and `None` for a stale ticket (the
    /// caller should cancel that timer).
    pub fn tick(&mut self, ticket: u64) -> Option<bool> {
        if ticket != self.ticket || self.state != RevealState::Revealing {
            return None;
        }

        if self.revealed < self.text.len() {
            self.revealed += 1;
        }

        if self.revealed == self.text.len() {
            self.state = RevealState::Idle;
            Some(false)
        } else {
            Some(true)
        }
    }

    /// Currently revealed prefix.
    pub fn visible(&self) -> String {
        self.text[..self.revealed].iter().collect()
    }

    pub fn full_text(&self) -> String {
        self.text.iter().collect()
    }

    pub fn is_revealing(&self) -> bool {
        self.state == RevealState::Revealing
    }
}
