//! Random-play game logic, kept separate from the HTTP layer.
//!
//! The session store only loads and saves [`RandomPlay`] values; every
//! transition happens in the pure functions below so the whole flow is
//! checkable without a server.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::db::Quiz;

/// An in-progress random-play round: the quizzes not yet asked and the
/// number of consecutive correct answers so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomPlay {
    pub pool: Vec<Quiz>,
    pub score: u32,
}

impl RandomPlay {
    pub fn new(pool: Vec<Quiz>) -> Self {
        Self { pool, score: 0 }
    }
}

#[derive(Debug, PartialEq)]
pub enum DrawOutcome {
    /// One quiz removed from the pool; `state` holds the shrunk pool.
    Question { quiz: Quiz, state: RandomPlay },
    /// Pool already empty, the round is over.
    Exhausted { final_score: u32 },
}

#[derive(Debug, PartialEq)]
pub enum CheckOutcome {
    /// Correct answer, quizzes left to ask.
    Continue(RandomPlay),
    /// Correct answer and the pool is empty.
    Completed { final_score: u32 },
    /// Wrong answer; score reported as it was before the check.
    Failed { final_score: u32 },
}

/// Remove a uniformly random quiz from the pool. Draws are without
/// replacement: the drawn quiz never returns to the pool.
pub fn draw<R: Rng>(mut state: RandomPlay, rng: &mut R) -> DrawOutcome {
    if state.pool.is_empty() {
        return DrawOutcome::Exhausted {
            final_score: state.score,
        };
    }
    let i = rng.gen_range(0..state.pool.len());
    let quiz = state.pool.remove(i);
    DrawOutcome::Question { quiz, state }
}

/// Score a submitted answer against the drawn quiz. The pool was already
/// shrunk by [`draw`], so an empty pool after a correct answer means the
/// round is complete.
pub fn check(state: RandomPlay, expected: &str, submitted: &str) -> CheckOutcome {
    if !answers_match(submitted, expected) {
        return CheckOutcome::Failed {
            final_score: state.score,
        };
    }
    let score = state.score + 1;
    if state.pool.is_empty() {
        CheckOutcome::Completed { final_score: score }
    } else {
        CheckOutcome::Continue(RandomPlay { score, ..state })
    }
}

/// Case-insensitive, surrounding-whitespace-insensitive answer comparison.
pub fn answers_match(submitted: &str, expected: &str) -> bool {
    submitted.trim().to_lowercase() == expected.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quiz(id: i64, answer: &str) -> Quiz {
        Quiz {
            id,
            question: format!("question {id}"),
            answer: answer.to_owned(),
            author_id: 0,
        }
    }

    #[test]
    fn answers_match_ignores_case_and_surrounding_whitespace() {
        assert!(answers_match("  Madrid ", "madrid"));
        assert!(answers_match("MADRID", " Madrid"));
        assert!(!answers_match("Barcelona", "Madrid"));
        assert!(!answers_match("", "Madrid"));
    }

    #[test]
    fn draw_on_empty_pool_is_exhausted() {
        let mut rng = StdRng::seed_from_u64(1);
        let state = RandomPlay {
            pool: vec![],
            score: 7,
        };
        assert_eq!(
            draw(state, &mut rng),
            DrawOutcome::Exhausted { final_score: 7 }
        );
    }

    #[test]
    fn draws_are_without_replacement() {
        let mut rng = StdRng::seed_from_u64(42);
        let pool: Vec<Quiz> = (1..=10).map(|id| quiz(id, "a")).collect();
        let mut state = RandomPlay::new(pool);
        let mut seen = Vec::new();
        for remaining in (0..10).rev() {
            match draw(state, &mut rng) {
                DrawOutcome::Question { quiz, state: next } => {
                    assert_eq!(next.pool.len(), remaining);
                    assert!(!seen.contains(&quiz.id), "quiz {} drawn twice", quiz.id);
                    seen.push(quiz.id);
                    state = next;
                }
                DrawOutcome::Exhausted { .. } => panic!("pool exhausted too early"),
            }
        }
        assert_eq!(seen.len(), 10);
        assert_eq!(
            draw(state, &mut rng),
            DrawOutcome::Exhausted { final_score: 0 }
        );
    }

    #[test]
    fn correct_check_increments_score_by_one() {
        let state = RandomPlay {
            pool: vec![quiz(2, "b")],
            score: 3,
        };
        match check(state, "Madrid", " madrid ") {
            CheckOutcome::Continue(next) => {
                assert_eq!(next.score, 4);
                assert_eq!(next.pool.len(), 1);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn correct_check_on_empty_pool_completes_the_round() {
        let state = RandomPlay {
            pool: vec![],
            score: 1,
        };
        assert_eq!(
            check(state, "Madrid", "madrid"),
            CheckOutcome::Completed { final_score: 2 }
        );
    }

    #[test]
    fn failed_check_reports_score_before_the_check() {
        let state = RandomPlay {
            pool: vec![quiz(2, "b"), quiz(3, "c")],
            score: 5,
        };
        assert_eq!(
            check(state, "Madrid", "Paris"),
            CheckOutcome::Failed { final_score: 5 }
        );
    }

    #[test]
    fn full_round_over_two_quizzes() {
        let mut rng = StdRng::seed_from_u64(7);
        let state = RandomPlay::new(vec![quiz(1, "uno"), quiz(2, "dos")]);

        let (first, state) = match draw(state, &mut rng) {
            DrawOutcome::Question { quiz, state } => (quiz, state),
            other => panic!("unexpected outcome {other:?}"),
        };
        assert_eq!(state.pool.len(), 1);

        let state = match check(state, &first.answer, &first.answer) {
            CheckOutcome::Continue(state) => state,
            other => panic!("unexpected outcome {other:?}"),
        };
        assert_eq!(state.score, 1);

        let (second, state) = match draw(state, &mut rng) {
            DrawOutcome::Question { quiz, state } => (quiz, state),
            other => panic!("unexpected outcome {other:?}"),
        };
        assert_ne!(second.id, first.id);
        assert!(state.pool.is_empty());

        assert_eq!(
            check(state, &second.answer, &second.answer),
            CheckOutcome::Completed { final_score: 2 }
        );
    }

    #[test]
    fn wrong_answer_ends_the_round_with_pool_left() {
        let mut rng = StdRng::seed_from_u64(7);
        let state = RandomPlay::new(vec![quiz(1, "uno"), quiz(2, "dos")]);
        let (drawn, state) = match draw(state, &mut rng) {
            DrawOutcome::Question { quiz, state } => (quiz, state),
            other => panic!("unexpected outcome {other:?}"),
        };
        assert_eq!(state.pool.len(), 1);
        assert_eq!(
            check(state, &drawn.answer, "not even close"),
            CheckOutcome::Failed { final_score: 0 }
        );
    }
}
