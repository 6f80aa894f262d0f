mod config;
mod console;
mod error;
mod leaderboard;
mod menu;
mod quiz;
mod wikipedia;

use chatgpt::{client::ChatGPT, config::ChatGPTEngine};
use config::Config;
use console::StdConsole;
use dotenv::dotenv;
use leaderboard::Leaderboard;
use log::{debug, info};
use quiz::{ai_helper::QuestionGenerator, session::SessionSettings};
use wikipedia::WikipediaClient;

type AppResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> AppResult {
    // A missing .env is fine, the variables may come from the real environment
    let dotenv_result = dotenv();

    pretty_env_logger::init();
    if let Err(err) = dotenv_result {
        debug!("No .env loaded: {}", err);
    }
    info!("Starting wiki trivia...");

    let config = Config::from_env()?;

    let gpt = {
        let mut gpt = ChatGPT::new(config.chatgpt_api_key.clone())?;

        gpt.config.engine = ChatGPTEngine::Gpt35Turbo;
        gpt.config.timeout = config.generation_timeout;

        gpt
    };
    let generator = QuestionGenerator::new(gpt);

    let topics = WikipediaClient::new(config.wikipedia_api_url.clone(), config.summary_sentences)?;

    let mut leaderboard = Leaderboard::load(&config.highscores_path)?;

    let mut console = StdConsole::new();
    menu::show_banner(&mut console);
    menu::run(
        &topics,
        &generator,
        &mut console,
        &mut leaderboard,
        SessionSettings::from(&config),
    )
    .await?;

    info!("Bye");
    Ok(())
}
