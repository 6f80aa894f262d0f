use log::{info, warn};

use crate::console::Console;
use crate::error::{InputError, SessionError};
use crate::leaderboard::Leaderboard;
use crate::quiz::ai_helper::{Completion, QuestionGenerator};
use crate::quiz::session::{GameSession, SessionEnd, SessionSettings};
use crate::wikipedia::TopicSource;

const BANNER: &str = r#"
 __        ___ _    _   _____     _       _
 \ \      / (_) | _(_) |_   _| __(_)_   _(_) __ _
  \ \ /\ / /| | |/ / |   | || '__| \ \ / / |/ _` |
   \ V  V / | |   <| |   | || |  | |\ V /| | (_| |
    \_/\_/  |_|_|\_\_|   |_||_|  |_| \_/ |_|\__,_|
"#;

const GAME_INTRO: &str = "Answer questions about a random Wikipedia topic! Score points, \
build streaks, and if you're among the most clever, join the LEADERBOARD!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Leaderboard,
    Quit,
}

/// Command words the main menu understands, in display order.
pub const COMMANDS: [(&str, Command); 3] = [
    ("start", Command::Start),
    ("leaderboard", Command::Leaderboard),
    ("quit", Command::Quit),
];

impl Command {
    pub fn lookup(input: &str) -> Option<Self> {
        let input = input.trim().to_lowercase();
        COMMANDS
            .iter()
            .find(|(word, _)| *word == input)
            .map(|(_, command)| *command)
    }
}

pub fn show_banner<P: Console>(console: &mut P) {
    console.say(BANNER);
    console.say(GAME_INTRO);
}

fn render_commands() -> String {
    let mut out = String::from("Main Menu:");
    for (word, _) in COMMANDS {
        out.push_str(&format!("\n\t→ {}", word));
    }
    out.push('\n');
    out
}

/// Main menu loop. Returns when the player quits or the console runs dry.
pub async fn run<T, C, P>(
    topics: &T,
    generator: &QuestionGenerator<C>,
    console: &mut P,
    leaderboard: &mut Leaderboard,
    settings: SessionSettings,
) -> Result<(), InputError>
where
    T: TopicSource,
    C: Completion,
    P: Console,
{
    console.say(&render_commands());
    loop {
        let Some(line) = console.ask("Choose a command: ") else {
            info!("Input closed, leaving the menu");
            return Ok(());
        };

        match Command::lookup(&line) {
            None => console.say("❗ Error - invalid command ❗"),
            Some(Command::Start) => {
                let mut session =
                    GameSession::new(topics, generator, console, leaderboard, settings.clone());
                match session.run().await {
                    Ok(SessionEnd::Finished) => {}
                    Ok(SessionEnd::Aborted(reason)) => info!("Back at the menu after abort: {}", reason),
                    Err(SessionError::Input(InputError::Closed)) => {
                        info!("Input closed during a game, leaving the menu");
                        return Ok(());
                    }
                    Err(err) => {
                        warn!("Session ended early: {}", err);
                        console.say(&format!("❗ {}", err));
                    }
                }
                console.say(&render_commands());
            }
            Some(Command::Leaderboard) => console.say(&leaderboard.render()),
            Some(Command::Quit) => {
                console.say("Thanks for playing, goodbye!");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::testing::ScriptedConsole;
    use crate::leaderboard::Initials;
    use crate::quiz::ai_helper::testing::CannedCompletion;
    use crate::wikipedia::testing::FakeTopics;
    use std::time::Duration;
    use tempfile::TempDir;

    fn settings() -> SessionSettings {
        SessionSettings {
            question_count: 1,
            category_choices: 1,
            generation_timeout: Duration::from_secs(5),
            max_prompt_attempts: Some(3),
            pause_between_questions: false,
        }
    }

    fn one_question() -> String {
        serde_json::json!([{
            "question": "Paris is the capital of France.",
            "options": {"a": "True", "b": "False"},
            "answer": "a",
            "difficulty": "easy",
            "question_format": "true_false"
        }])
        .to_string()
    }

    async fn run_menu(lines: &[&str], leaderboard: &mut Leaderboard) -> ScriptedConsole {
        let topics = FakeTopics::new(&["Geography"], Some(("Paris", "Paris is the capital of France.")));
        let generator = QuestionGenerator::new(CannedCompletion::new(one_question()));
        let mut console = ScriptedConsole::new(lines);
        run(&topics, &generator, &mut console, leaderboard, settings())
            .await
            .unwrap();
        console
    }

    #[test]
    fn commands_are_case_insensitive() {
        assert_eq!(Command::lookup("START"), Some(Command::Start));
        assert_eq!(Command::lookup(" leaderboard "), Some(Command::Leaderboard));
        assert_eq!(Command::lookup("quit"), Some(Command::Quit));
        assert_eq!(Command::lookup("play"), None);
    }

    #[tokio::test]
    async fn unknown_command_then_quit() {
        let dir = TempDir::new().unwrap();
        let mut board = Leaderboard::empty(dir.path().join("highscores.json"));
        let console = run_menu(&["dance", "quit"], &mut board).await;

        let transcript = console.transcript();
        assert!(transcript.contains("invalid command"));
        assert!(transcript.contains("goodbye"));
    }

    #[tokio::test]
    async fn leaderboard_command_prints_the_board() {
        let dir = TempDir::new().unwrap();
        let mut board = Leaderboard::empty(dir.path().join("highscores.json"));
        board.record(&Initials::parse("ace").unwrap(), 17).unwrap();

        let console = run_menu(&["leaderboard", "quit"], &mut board).await;

        assert!(console.transcript().contains("ACE - 17"));
    }

    #[tokio::test]
    async fn start_plays_a_game_and_returns_to_the_menu() {
        let dir = TempDir::new().unwrap();
        let mut board = Leaderboard::empty(dir.path().join("highscores.json"));

        let console = run_menu(&["start", "a", "1", "a", "abc", "n", "quit"], &mut board).await;

        assert_eq!(board.entries().len(), 1);
        assert_eq!(board.entries()[0].score, 1);
        assert!(console.transcript().contains("goodbye"));
    }

    #[tokio::test]
    async fn exhausted_session_is_reported_and_the_menu_continues() {
        let dir = TempDir::new().unwrap();
        let mut board = Leaderboard::empty(dir.path().join("highscores.json"));

        let console = run_menu(&["start", "x", "x", "x", "quit"], &mut board).await;

        let transcript = console.transcript();
        assert!(transcript.contains("no valid answer after 3 attempts"));
        assert!(transcript.contains("goodbye"));
    }

    #[tokio::test]
    async fn closed_input_leaves_quietly() {
        let dir = TempDir::new().unwrap();
        let mut board = Leaderboard::empty(dir.path().join("highscores.json"));

        let console = run_menu(&["start", "a"], &mut board).await;

        assert!(!console.transcript().contains("goodbye"));
    }
}
