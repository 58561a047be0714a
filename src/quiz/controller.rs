//! Round state machine.
//!
//! `advance` and `retreat` are pure functions of the current [`QuizState`] and
//! the set of question coordinates that exist. They never look at question
//! content; when movement is blocked they return the state unchanged.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Phase, QuizState};

/// Which (round, question) coordinates exist in the question bank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionLayout {
    rounds: BTreeMap<i64, BTreeSet<i64>>,
}

impl QuestionLayout {
    pub fn from_coordinates(coordinates: impl IntoIterator<Item = (i64, i64)>) -> Self {
        let mut rounds: BTreeMap<i64, BTreeSet<i64>> = BTreeMap::new();
        for (round, question) in coordinates {
            rounds.entry(round).or_default().insert(question);
        }
        Self { rounds }
    }

    pub fn contains(&self, round: i64, question: i64) -> bool {
        self.rounds
            .get(&round)
            .is_some_and(|questions| questions.contains(&question))
    }

    /// Highest question number in `round`.
    pub fn last_question(&self, round: i64) -> Option<i64> {
        self.rounds
            .get(&round)
            .and_then(|questions| questions.last().copied())
    }
}

/// Result of advancing the quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: QuizState,
    /// Responses up to the current coordinate must be unhidden and totals recomputed
    pub reveal: bool,
}

impl Transition {
    fn moved(next: QuizState) -> Self {
        Self {
            next,
            reveal: false,
        }
    }
}

/// Move the quiz one step forward.
pub fn advance(current: QuizState, layout: &QuestionLayout) -> Transition {
    let QuizState {
        round,
        question,
        phase,
    } = current;

    if phase == Phase::Armed && question > 0 {
        return Transition {
            next: QuizState::new(round, question, Phase::Revealed),
            reveal: true,
        };
    }

    if layout.contains(round, question + 1) {
        // Stepping off a revealed answer arms the next one
        let phase = if phase == Phase::Revealed {
            Phase::Armed
        } else {
            phase
        };
        return Transition::moved(QuizState::new(round, question + 1, phase));
    }

    if phase == Phase::Active && round > 0 {
        return Transition::moved(QuizState::new(round, 0, Phase::Armed));
    }

    if layout.contains(round + 1, 1) {
        return Transition::moved(QuizState::new(round + 1, 0, Phase::Active));
    }

    Transition::moved(current)
}

/// Move the quiz one step back.
pub fn retreat(current: QuizState, layout: &QuestionLayout) -> QuizState {
    let QuizState {
        round,
        question,
        phase,
    } = current;

    if phase == Phase::Revealed {
        return QuizState::new(round, question, Phase::Armed);
    }

    if layout.contains(round, question - 1) || question == 1 {
        let question = question - 1;
        let phase = match phase {
            // Earlier answers in the walk were already revealed
            Phase::Armed if question != 0 => Phase::Revealed,
            other => other,
        };
        return QuizState::new(round, question, phase);
    }

    if phase == Phase::Armed {
        return match layout.last_question(round) {
            Some(last) => QuizState::new(round, last, Phase::Active),
            None => current,
        };
    }

    if round <= 1 {
        return QuizState::initial();
    }

    match layout.last_question(round - 1) {
        Some(last) => QuizState::new(round - 1, last, Phase::Revealed),
        None => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> QuestionLayout {
        // Round 1 has three questions, round 2 has two.
        QuestionLayout::from_coordinates([(1, 1), (1, 2), (1, 3), (2, 1), (2, 2)])
    }

    fn state(round: i64, question: i64, phase: Phase) -> QuizState {
        QuizState::new(round, question, phase)
    }

    #[test]
    fn test_layout_lookup() {
        let layout = layout();
        assert!(layout.contains(1, 3));
        assert!(!layout.contains(1, 4));
        assert!(!layout.contains(3, 1));
        assert_eq!(layout.last_question(1), Some(3));
        assert_eq!(layout.last_question(2), Some(2));
        assert_eq!(layout.last_question(3), None);
    }

    #[test]
    fn test_advance_without_questions_is_noop() {
        let empty = QuestionLayout::default();
        let t = advance(QuizState::initial(), &empty);
        assert_eq!(t.next, QuizState::initial());
        assert!(!t.reveal);
    }

    #[test]
    fn test_advance_opens_first_round_on_title_screen() {
        let t = advance(QuizState::initial(), &layout());
        assert_eq!(t.next, state(1, 0, Phase::Active));
        assert!(!t.reveal);
    }

    #[test]
    fn test_advance_walks_questions_then_closes_round() {
        let layout = layout();
        let mut current = state(1, 0, Phase::Active);
        for expected in 1..=3 {
            current = advance(current, &layout).next;
            assert_eq!(current, state(1, expected, Phase::Active));
        }
        current = advance(current, &layout).next;
        assert_eq!(current, state(1, 0, Phase::Armed));
    }

    #[test]
    fn test_advance_review_alternates_arm_and_reveal() {
        let layout = layout();

        let t = advance(state(1, 0, Phase::Armed), &layout);
        assert_eq!(t.next, state(1, 1, Phase::Armed));
        assert!(!t.reveal);

        let t = advance(t.next, &layout);
        assert_eq!(t.next, state(1, 1, Phase::Revealed));
        assert!(t.reveal);

        let t = advance(t.next, &layout);
        assert_eq!(t.next, state(1, 2, Phase::Armed));
        assert!(!t.reveal);
    }

    #[test]
    fn test_advance_after_last_reveal_opens_next_round() {
        let t = advance(state(1, 3, Phase::Revealed), &layout());
        assert_eq!(t.next, state(2, 0, Phase::Active));
        assert!(!t.reveal);
    }

    #[test]
    fn test_advance_at_end_of_content_is_noop() {
        let layout = layout();
        let end = state(2, 2, Phase::Revealed);
        assert_eq!(advance(end, &layout).next, end);
        // Still a no-op on retransmission
        assert_eq!(advance(advance(end, &layout).next, &layout).next, end);
    }

    #[test]
    fn test_advance_reveals_last_question_of_final_round() {
        let t = advance(state(2, 2, Phase::Armed), &layout());
        assert_eq!(t.next, state(2, 2, Phase::Revealed));
        assert!(t.reveal);
    }

    #[test]
    fn test_retreat_from_lobby_is_noop() {
        assert_eq!(retreat(QuizState::initial(), &layout()), QuizState::initial());
        assert_eq!(
            retreat(QuizState::initial(), &QuestionLayout::default()),
            QuizState::initial()
        );
    }

    #[test]
    fn test_retreat_collapses_reveal() {
        assert_eq!(
            retreat(state(1, 2, Phase::Revealed), &layout()),
            state(1, 2, Phase::Armed)
        );
    }

    #[test]
    fn test_retreat_in_open_round_steps_back() {
        let layout = layout();
        assert_eq!(
            retreat(state(1, 3, Phase::Active), &layout),
            state(1, 2, Phase::Active)
        );
        assert_eq!(
            retreat(state(1, 1, Phase::Active), &layout),
            state(1, 0, Phase::Active)
        );
    }

    #[test]
    fn test_retreat_in_review_lands_on_revealed_answers() {
        let layout = layout();
        assert_eq!(
            retreat(state(1, 3, Phase::Armed), &layout),
            state(1, 2, Phase::Revealed)
        );
        assert_eq!(
            retreat(state(1, 1, Phase::Armed), &layout),
            state(1, 0, Phase::Armed)
        );
    }

    #[test]
    fn test_retreat_from_review_start_reopens_round() {
        assert_eq!(
            retreat(state(1, 0, Phase::Armed), &layout()),
            state(1, 3, Phase::Active)
        );
    }

    #[test]
    fn test_retreat_from_round_title_goes_to_previous_review() {
        let layout = layout();
        assert_eq!(
            retreat(state(2, 0, Phase::Active), &layout),
            state(1, 3, Phase::Revealed)
        );
        assert_eq!(
            retreat(state(1, 0, Phase::Active), &layout),
            QuizState::initial()
        );
    }

    #[test]
    fn test_retreat_undoes_advance_through_round_boundary() {
        let layout = layout();
        let before = state(1, 3, Phase::Revealed);
        let after = advance(before, &layout).next;
        assert_eq!(after, state(2, 0, Phase::Active));
        assert_eq!(retreat(after, &layout), before);
    }

    #[test]
    fn test_retreat_with_missing_round_content_is_noop() {
        // Review of a round whose questions were removed from the bank
        let orphan = state(5, 0, Phase::Armed);
        assert_eq!(retreat(orphan, &layout()), orphan);
    }
}
