pub mod resolver;

use serde::Serialize;

/// Metadata produced by one resolution attempt, projected onto a card and
/// then dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub favicon: Option<String>,
    pub avatar: Option<String>,
}

/// Index of a card in the page-level arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CardId(pub usize);

/// Per-card resolution state machine.
///
/// ```text
/// Idle -> Fetching(0) -> Fetching(1) -> ... -> Parsing -> Extracting
///      -> AwaitingFavicon -> Rendered
/// Fetching(n) -> FallbackRendered
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResolutionState {
    Idle,
    Fetching { attempt: usize },
    Parsing,
    Extracting,
    AwaitingFavicon,
    Rendered,
    FallbackRendered,
}

impl ResolutionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ResolutionState::Rendered | ResolutionState::FallbackRendered
        )
    }

    pub fn can_advance_to(self, next: ResolutionState) -> bool {
        use ResolutionState::*;
        match (self, next) {
            (Idle, Fetching { attempt: 0 }) => true,
            (Fetching { attempt: a }, Fetching { attempt: b }) => b == a + 1,
            (Fetching { .. }, Parsing) | (Fetching { .. }, FallbackRendered) => true,
            (Parsing, Extracting) => true,
            (Extracting, AwaitingFavicon) => true,
            (AwaitingFavicon, Rendered) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub card: CardId,
    pub from: ResolutionState,
    pub to: ResolutionState,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "card {}: illegal transition {:?} -> {:?}",
            self.card.0, self.from, self.to
        )
    }
}

impl std::error::Error for TransitionError {}

/// State record for one card, owned by that card's worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardResolution {
    pub id: CardId,
    state: ResolutionState,
    /// Proxy requests actually issued.
    attempts: usize,
}

impl CardResolution {
    pub fn new(id: CardId) -> Self {
        Self {
            id,
            state: ResolutionState::Idle,
            attempts: 0,
        }
    }

    pub fn state(&self) -> ResolutionState {
        self.state
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn advance(&mut self, next: ResolutionState) -> Result<(), TransitionError> {
        if !self.state.can_advance_to(next) {
            return Err(TransitionError {
                card: self.id,
                from: self.state,
                to: next,
            });
        }
        log::debug!("card {}: {:?} -> {:?}", self.id.0, self.state, next);
        self.state = next;
        Ok(())
    }

    /// Count one proxy request about to be issued.
    pub fn record_attempt(&mut self) {
        self.attempts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ResolutionState::*;

    #[test]
    fn happy_path_is_legal() {
        let mut res = CardResolution::new(CardId(0));
        for next in [
            Fetching { attempt: 0 },
            Fetching { attempt: 1 },
            Parsing,
            Extracting,
            AwaitingFavicon,
            Rendered,
        ] {
            res.advance(next).unwrap();
        }
        assert!(res.state().is_terminal());
        assert_eq!(res.attempts(), 0);
    }

    #[test]
    fn fallback_only_from_fetching() {
        assert!(Fetching { attempt: 2 }.can_advance_to(FallbackRendered));
        assert!(!Idle.can_advance_to(FallbackRendered));
        assert!(!Extracting.can_advance_to(FallbackRendered));
    }

    #[test]
    fn attempts_cannot_skip() {
        let mut res = CardResolution::new(CardId(3));
        res.advance(Fetching { attempt: 0 }).unwrap();
        let err = res.advance(Fetching { attempt: 2 }).unwrap_err();
        assert_eq!(err.card, CardId(3));
        assert_eq!(res.state(), Fetching { attempt: 0 });
    }

    #[test]
    fn terminal_states_do_not_move() {
        assert!(!Rendered.can_advance_to(Fetching { attempt: 0 }));
        assert!(!FallbackRendered.can_advance_to(Rendered));
    }
}
