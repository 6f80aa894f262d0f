use std::time::Duration;

use log::{error, info};

use crate::config::Config;
use crate::console::{ask_until, with_spinner, Console};
use crate::error::{GenerationError, InputError, SessionError};
use crate::leaderboard::{Initials, Leaderboard};
use crate::quiz::ai_helper::{Completion, QuestionGenerator};
use crate::quiz::scoring::{self, PlayerState};
use crate::quiz::{Question, QuestionSet};
use crate::wikipedia::TopicSource;

pub const PLAYER_ONE_NAME: &str = "Player 1 🔴";
pub const PLAYER_TWO_NAME: &str = "Player 2 🔵";
pub const SINGLE_PLAYER_NAME: &str = "Player 🟡";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Single,
    Duo,
}

/// How a session handed control back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// Played at least one game and declined the replay.
    Finished,
    /// No topic or no questions; nothing was played.
    Aborted(String),
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub question_count: usize,
    pub category_choices: usize,
    pub generation_timeout: Duration,
    pub max_prompt_attempts: Option<usize>,
    pub pause_between_questions: bool,
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            question_count: config.question_count,
            category_choices: config.category_choices,
            generation_timeout: config.generation_timeout,
            max_prompt_attempts: config.max_prompt_attempts,
            pause_between_questions: config.pause_between_questions,
        }
    }
}

pub struct GameSession<'a, T, C, P> {
    topics: &'a T,
    generator: &'a QuestionGenerator<C>,
    console: &'a mut P,
    leaderboard: &'a mut Leaderboard,
    settings: SessionSettings,
}

impl<'a, T, C, P> GameSession<'a, T, C, P>
where
    T: TopicSource,
    C: Completion,
    P: Console,
{
    pub fn new(
        topics: &'a T,
        generator: &'a QuestionGenerator<C>,
        console: &'a mut P,
        leaderboard: &'a mut Leaderboard,
        settings: SessionSettings,
    ) -> Self {
        Self {
            topics,
            generator,
            console,
            leaderboard,
            settings,
        }
    }

    /// Select mode, generate, play, score, and repeat for as long as the players want a replay.
    pub async fn run(&mut self) -> Result<SessionEnd, SessionError> {
        loop {
            let mode = self.select_mode()?;
            info!("Starting a {:?} game", mode);

            let questions = match self.prepare_questions().await? {
                Ok(questions) => questions,
                Err(reason) => {
                    error!("Session aborted: {}", reason);
                    return Ok(SessionEnd::Aborted(reason));
                }
            };

            let players = self.play(&questions, mode)?;
            self.finish(&players, mode)?;

            if !self.ask_replay()? {
                self.console.say("Thanks for playing!");
                info!("Session finished");
                return Ok(SessionEnd::Finished);
            }
        }
    }

    fn select_mode(&mut self) -> Result<Mode, InputError> {
        self.console
            .say("\n🎮 Select Mode 🎮\n  👤 One Player (a)\n  👥 Two Players (b)");
        ask_until(
            self.console,
            "👉 Select (a/b): ",
            "❗ Please select one of the options (a/b).",
            self.settings.max_prompt_attempts,
            |line| match line.trim().to_lowercase().as_str() {
                "a" => Some(Mode::Single),
                "b" => Some(Mode::Duo),
                _ => None,
            },
        )
    }

    /// The outer error ends the session outright; the inner one is a reported abort.
    async fn prepare_questions(&mut self) -> Result<Result<QuestionSet, String>, SessionError> {
        let summary = match self.choose_topic().await? {
            Ok(summary) => summary,
            Err(reason) => {
                self.console.say(&format!("❗ {}", reason));
                return Ok(Err(reason));
            }
        };

        let timeout = self.settings.generation_timeout;
        let generation = with_spinner(
            "Generating Questions 🤓...",
            tokio::time::timeout(
                timeout,
                self.generator.generate(&summary, self.settings.question_count),
            ),
        )
        .await
        .unwrap_or(Err(GenerationError::TimedOut(timeout)));

        match generation {
            Ok(questions) if !questions.is_empty() => Ok(Ok(questions)),
            Ok(_) => {
                self.console.say("❗ No questions available.");
                Ok(Err("no questions available".to_string()))
            }
            Err(err) => {
                let reason = format!("failed to generate questions: {}", err);
                self.console.say(&format!("❗ {}", reason));
                Ok(Err(reason))
            }
        }
    }

    async fn choose_topic(&mut self) -> Result<Result<String, String>, SessionError> {
        let categories = match self.topics.sample(self.settings.category_choices).await {
            Ok(categories) => categories,
            Err(err) => return Ok(Err(format!("No articles available: {}", err))),
        };

        let mut menu = String::from("\n🎮 Choose Your Category 🎮\n");
        for (i, category) in categories.iter().enumerate() {
            menu.push_str(&format!("\n  {:>2}  {}", i + 1, category));
        }
        self.console.say(&menu);

        let count = categories.len();
        let choice = ask_until(
            self.console,
            "\nEnter the number of your choice: ",
            "❗ Invalid choice. Try again",
            self.settings.max_prompt_attempts,
            |line| {
                line.trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|n| (1..=count).contains(n))
            },
        )?;
        let category = &categories[choice - 1];

        match self.topics.summarize(category).await {
            Ok(Some(summary)) if !summary.text.trim().is_empty() => {
                info!("Playing on {:?}", summary.title);
                Ok(Ok(summary.text))
            }
            Ok(_) => Ok(Err("No articles available.".to_string())),
            Err(err) => Ok(Err(format!("Failed to summarize article: {}", err))),
        }
    }

    fn play(&mut self, questions: &QuestionSet, mode: Mode) -> Result<Vec<PlayerState>, InputError> {
        let mut players = match mode {
            Mode::Single => vec![PlayerState::new(SINGLE_PLAYER_NAME)],
            Mode::Duo => vec![
                PlayerState::new(PLAYER_ONE_NAME),
                PlayerState::new(PLAYER_TWO_NAME),
            ],
        };

        for (number, question) in questions.iter().enumerate() {
            self.show_question(number + 1, questions.len(), question);

            // Everyone answers before anyone sees an outcome
            let mut answers = Vec::with_capacity(players.len());
            for player in &players {
                answers.push(self.ask_answer(&player.name, question)?);
            }

            for (player, answer) in players.iter_mut().zip(answers) {
                let (next, outcome) = scoring::apply(player, answer, question.correct_answer());
                self.console.say(&format!("{}:", player.name));
                self.console.say(&outcome.message());
                *player = next;
            }

            if self.settings.pause_between_questions {
                self.console
                    .ask("Press Enter to continue...")
                    .ok_or(InputError::Closed)?;
            }
        }

        Ok(players)
    }

    fn show_question(&mut self, number: usize, total: usize, question: &Question) {
        let mut text = format!(
            "\nQuestion {}/{} ({}, {})\n\n{}\n",
            number,
            total,
            question.difficulty(),
            question.format(),
            question.text()
        );
        for (key, option) in question.options() {
            text.push_str(&format!("\n  {} - {}", key, option));
        }
        text.push('\n');
        self.console.say(&text);
    }

    fn ask_answer(&mut self, name: &str, question: &Question) -> Result<char, InputError> {
        ask_until(
            self.console,
            &format!("{}: Please enter answer: ", name),
            "❗ Please enter one of the letters",
            self.settings.max_prompt_attempts,
            |line| {
                let line = line.trim().to_lowercase();
                let mut chars = line.chars();
                match (chars.next(), chars.next()) {
                    (Some(key), None) if question.options().contains_key(&key) => Some(key),
                    _ => None,
                }
            },
        )
    }

    fn finish(&mut self, players: &[PlayerState], mode: Mode) -> Result<(), InputError> {
        for player in players {
            self.console
                .say(&format!("{} score: {}", player.name, player.score));
        }

        let contenders: Vec<&PlayerState> = match (mode, players) {
            (Mode::Duo, [one, two]) if one.score > two.score => {
                self.console.say(&format!("{} Wins!", one.name));
                vec![one]
            }
            (Mode::Duo, [one, two]) if two.score > one.score => {
                self.console.say(&format!("{} Wins!", two.name));
                vec![two]
            }
            (Mode::Duo, _) => {
                self.console.say("Both players had the same score!");
                players.iter().collect()
            }
            (Mode::Single, _) => players.iter().collect(),
        };

        for player in contenders {
            self.offer_highscore(player)?;
        }
        Ok(())
    }

    fn offer_highscore(&mut self, player: &PlayerState) -> Result<(), InputError> {
        if !self.leaderboard.admits(player.score) {
            return Ok(());
        }

        self.console
            .say(&format!("{}, save your high score!", player.name));
        self.console.say("✨✨ You've got a high score! ✨✨");
        let initials = ask_until(
            self.console,
            "📝 Enter your 3 initials (e.g. JHN or ANN): ",
            "❗ Error! Please enter three letters! ❗",
            self.settings.max_prompt_attempts,
            Initials::parse,
        )?;

        match self.leaderboard.record(&initials, player.score) {
            Ok(()) => {
                info!("Recorded {} with {} points", initials, player.score);
                self.console.say(&self.leaderboard.render());
            }
            Err(err) => {
                error!(
                    "Failed to save leaderboard to {}: {}",
                    self.leaderboard.path().display(),
                    err
                );
                self.console
                    .say(&format!("❗ Could not save your high score: {}", err));
            }
        }
        Ok(())
    }

    fn ask_replay(&mut self) -> Result<bool, InputError> {
        ask_until(
            self.console,
            "Would you like to replay the game? (y/n) ",
            "❗ Invalid input. Please try again.",
            self.settings.max_prompt_attempts,
            |line| match line.trim().to_lowercase().as_str() {
                "y" => Some(true),
                "n" => Some(false),
                _ => None,
            },
        )
    }
}
