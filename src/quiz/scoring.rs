/// Consecutive correct answers needed before the streak bonus kicks in.
pub const STREAK_START: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    pub name: String,
    pub score: u32,
    pub streak: u32,
}

impl PlayerState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 0,
            streak: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct { answer: char, streak: u32 },
    Incorrect { correct_answer: char, prior_streak: u32 },
}

impl Outcome {
    pub fn message(&self) -> String {
        match *self {
            Outcome::Correct { answer, streak } if streak >= STREAK_START => format!(
                "✅ Correct! The answer is {}\n🔥 You're on fire! Streak: {}! 🔥",
                answer, streak
            ),
            Outcome::Correct { answer, .. } => format!("✅ Correct! The answer is {}", answer),
            Outcome::Incorrect {
                correct_answer,
                prior_streak,
            } if prior_streak >= STREAK_START => format!(
                "❌ Wrong! The correct answer was {}\n🥶 You lost your streak of {}! 🥶",
                correct_answer, prior_streak
            ),
            Outcome::Incorrect { correct_answer, .. } => {
                format!("❌ Wrong! The correct answer was {}", correct_answer)
            }
        }
    }
}

/// Scores one answer. A correct answer is worth 1 point, plus the current streak once the streak
/// has reached [`STREAK_START`]; a wrong answer resets the streak and leaves the score alone.
pub fn apply(current: &PlayerState, submitted: char, correct: char) -> (PlayerState, Outcome) {
    let mut next = current.clone();
    if submitted == correct {
        next.score += 1;
        next.streak += 1;
        if next.streak >= STREAK_START {
            next.score += next.streak;
        }
        let streak = next.streak;
        (
            next,
            Outcome::Correct {
                answer: correct,
                streak,
            },
        )
    } else {
        let prior_streak = next.streak;
        next.streak = 0;
        (
            next,
            Outcome::Incorrect {
                correct_answer: correct,
                prior_streak,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer_all(player: PlayerState, answers: &[(char, char)]) -> PlayerState {
        answers
            .iter()
            .fold(player, |state, (submitted, correct)| apply(&state, *submitted, *correct).0)
    }

    #[test]
    fn first_correct_answer_scores_one() {
        let (next, outcome) = apply(&PlayerState::new("Player"), 'a', 'a');
        assert_eq!(next.score, 1);
        assert_eq!(next.streak, 1);
        assert_eq!(outcome, Outcome::Correct { answer: 'a', streak: 1 });
    }

    #[test]
    fn streak_bonus_starts_on_third_correct_answer() {
        let player = answer_all(PlayerState::new("Player"), &[('a', 'a'), ('b', 'b'), ('c', 'c')]);
        assert_eq!(player.score, 6);
        assert_eq!(player.streak, 3);

        let (player, outcome) = apply(&player, 'd', 'd');
        assert_eq!(player.score, 11);
        assert_eq!(outcome, Outcome::Correct { answer: 'd', streak: 4 });
    }

    #[test]
    fn wrong_answer_resets_streak_and_keeps_score() {
        let player = answer_all(
            PlayerState::new("Player"),
            &[('a', 'a'), ('a', 'a'), ('a', 'a'), ('a', 'a')],
        );
        let (next, outcome) = apply(&player, 'b', 'c');
        assert_eq!(next.streak, 0);
        assert_eq!(next.score, player.score);
        assert_eq!(
            outcome,
            Outcome::Incorrect {
                correct_answer: 'c',
                prior_streak: 4
            }
        );
    }

    #[test]
    fn reset_holds_from_any_prior_streak() {
        for prior in 0..8 {
            let player = PlayerState {
                name: "Player".to_string(),
                score: 42,
                streak: prior,
            };
            let (next, _) = apply(&player, 'a', 'b');
            assert_eq!(next.streak, 0);
            assert_eq!(next.score, 42);
        }
    }

    #[test]
    fn streak_rebuilds_from_scratch_after_a_miss() {
        let player = answer_all(
            PlayerState::new("Player"),
            &[('a', 'a'), ('a', 'a'), ('a', 'a'), ('b', 'a'), ('a', 'a'), ('a', 'a')],
        );
        // 6 for the first run, nothing for the miss, then 1 + 1
        assert_eq!(player.score, 8);
        assert_eq!(player.streak, 2);
    }

    #[test]
    fn messages_mention_streaks_only_past_the_threshold() {
        let warm = Outcome::Correct { answer: 'a', streak: 2 }.message();
        assert!(warm.contains("The answer is a"));
        assert!(!warm.contains("fire"));
        assert!(Outcome::Correct { answer: 'c', streak: 3 }.message().contains("Streak: 3"));
        let lost = Outcome::Incorrect {
            correct_answer: 'b',
            prior_streak: 5,
        };
        let message = lost.message();
        assert!(message.contains("correct answer was b"));
        assert!(message.contains("lost your streak of 5"));
    }
}
