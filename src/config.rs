use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";

#[derive(Debug, Clone)]
pub struct Config {
    pub chatgpt_api_key: String,
    pub question_count: usize,
    pub category_choices: usize,
    pub highscores_path: PathBuf,
    pub generation_timeout: Duration,
    /// `None` keeps asking forever.
    pub max_prompt_attempts: Option<usize>,
    pub summary_sentences: usize,
    pub pause_between_questions: bool,
    pub wikipedia_api_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, so tests don't have to touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let chatgpt_api_key = lookup("CHATGPT_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing("CHATGPT_API_KEY"))?;

        let question_count = parse_positive(&lookup, "TRIVIA_QUESTION_COUNT", 10)?;
        let category_choices = parse_positive(&lookup, "TRIVIA_CATEGORY_CHOICES", 5)?;
        let summary_sentences = parse_positive(&lookup, "TRIVIA_SUMMARY_SENTENCES", 1)?;
        let timeout_secs = parse_positive(&lookup, "TRIVIA_GENERATION_TIMEOUT_SECS", 60)?;

        let max_prompt_attempts = match lookup("TRIVIA_MAX_PROMPT_ATTEMPTS") {
            Some(value) => Some(parse_value::<usize>("TRIVIA_MAX_PROMPT_ATTEMPTS", &value)?)
                .filter(|attempts| *attempts > 0),
            None => None,
        };

        let pause_between_questions = match lookup("TRIVIA_PAUSE_BETWEEN_QUESTIONS") {
            Some(value) => parse_value::<bool>("TRIVIA_PAUSE_BETWEEN_QUESTIONS", &value)?,
            None => true,
        };

        let highscores_path = lookup("TRIVIA_HIGHSCORES_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("highscores.json"));

        let wikipedia_api_url = lookup("WIKIPEDIA_API_URL")
            .unwrap_or_else(|| DEFAULT_WIKIPEDIA_API_URL.to_string());

        Ok(Self {
            chatgpt_api_key,
            question_count,
            category_choices,
            highscores_path,
            generation_timeout: Duration::from_secs(timeout_secs as u64),
            max_prompt_attempts,
            summary_sentences,
            pause_between_questions,
            wikipedia_api_url,
        })
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

fn parse_positive<F>(lookup: &F, key: &'static str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => {
            let parsed: usize = parse_value(key, &value)?;
            if parsed == 0 {
                return Err(ConfigError::Invalid { key, value });
            }
            Ok(parsed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_key_is_set() {
        let config = Config::from_lookup(lookup_from(&[("CHATGPT_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.chatgpt_api_key, "sk-test");
        assert_eq!(config.question_count, 10);
        assert_eq!(config.category_choices, 5);
        assert_eq!(config.summary_sentences, 1);
        assert_eq!(config.generation_timeout, Duration::from_secs(60));
        assert_eq!(config.max_prompt_attempts, None);
        assert!(config.pause_between_questions);
        assert_eq!(config.highscores_path, PathBuf::from("highscores.json"));
        assert_eq!(config.wikipedia_api_url, DEFAULT_WIKIPEDIA_API_URL);
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("CHATGPT_API_KEY")));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("CHATGPT_API_KEY", "sk-test"),
            ("TRIVIA_QUESTION_COUNT", "6"),
            ("TRIVIA_MAX_PROMPT_ATTEMPTS", "3"),
            ("TRIVIA_PAUSE_BETWEEN_QUESTIONS", "false"),
            ("TRIVIA_HIGHSCORES_PATH", "/tmp/scores.json"),
        ]))
        .unwrap();
        assert_eq!(config.question_count, 6);
        assert_eq!(config.max_prompt_attempts, Some(3));
        assert!(!config.pause_between_questions);
        assert_eq!(config.highscores_path, PathBuf::from("/tmp/scores.json"));
    }

    #[test]
    fn zero_question_count_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("CHATGPT_API_KEY", "sk-test"),
            ("TRIVIA_QUESTION_COUNT", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "TRIVIA_QUESTION_COUNT",
                ..
            }
        ));
    }

    #[test]
    fn garbage_number_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("CHATGPT_API_KEY", "sk-test"),
            ("TRIVIA_CATEGORY_CHOICES", "five"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
