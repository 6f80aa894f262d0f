pub mod ai_helper;
pub mod scoring;
pub mod session;

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 4;
pub const OPTION_KEYS: [char; MAX_OPTIONS] = ['a', 'b', 'c', 'd'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == value)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionFormat {
    Multiple,
    FillBlank,
    TrueFalse,
    Riddle,
    Scenario,
    ComboMultiple,
}

impl QuestionFormat {
    pub const ALL: [QuestionFormat; 6] = [
        QuestionFormat::Multiple,
        QuestionFormat::FillBlank,
        QuestionFormat::TrueFalse,
        QuestionFormat::Riddle,
        QuestionFormat::Scenario,
        QuestionFormat::ComboMultiple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionFormat::Multiple => "multiple",
            QuestionFormat::FillBlank => "fill_blank",
            QuestionFormat::TrueFalse => "true_false",
            QuestionFormat::Riddle => "riddle",
            QuestionFormat::Scenario => "scenario",
            QuestionFormat::ComboMultiple => "combo_multiple",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == value)
    }
}

impl fmt::Display for QuestionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated quiz question. Construct through [`Question::from_value`] or [`Question::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    text: String,
    options: BTreeMap<char, String>,
    correct_answer: char,
    difficulty: Difficulty,
    format: QuestionFormat,
}

impl Question {
    pub fn new(
        text: impl Into<String>,
        options: BTreeMap<char, String>,
        correct_answer: char,
        difficulty: Difficulty,
        format: QuestionFormat,
    ) -> Result<Self, String> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err("question text is empty".to_string());
        }
        if options.len() < MIN_OPTIONS || options.len() > MAX_OPTIONS {
            return Err(format!(
                "expected {}..={} options, got {}",
                MIN_OPTIONS,
                MAX_OPTIONS,
                options.len()
            ));
        }
        if let Some(key) = options.keys().find(|k| !OPTION_KEYS.contains(k)) {
            return Err(format!("option key {:?} is not one of a-d", key));
        }
        if options.values().any(|text| text.trim().is_empty()) {
            return Err("an option text is empty".to_string());
        }
        if !options.contains_key(&correct_answer) {
            return Err(format!(
                "answer {:?} is not one of the option keys",
                correct_answer
            ));
        }

        Ok(Self {
            text,
            options,
            correct_answer,
            difficulty,
            format,
        })
    }

    /// Validates one element of the generator's JSON array.
    ///
    /// Expected shape:
    /// `{"question": str, "options": {"a": str, ...}, "answer": "a", "difficulty": str, "question_format": str}`
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let object = value
            .as_object()
            .ok_or_else(|| "question is not a JSON object".to_string())?;

        let text = required_str(object, "question")?;

        let raw_options = object
            .get("options")
            .and_then(Value::as_object)
            .ok_or_else(|| "\"options\" is missing or not an object".to_string())?;
        let mut options = BTreeMap::new();
        for (key, option) in raw_options {
            let key = single_key(key).ok_or_else(|| format!("option key {:?} is not a single letter", key))?;
            let option = option
                .as_str()
                .ok_or_else(|| format!("option {:?} is not a string", key))?;
            if options.insert(key, option.trim().to_string()).is_some() {
                return Err(format!("option key {:?} appears twice", key));
            }
        }

        let answer = required_str(object, "answer")?;
        let correct_answer =
            single_key(answer).ok_or_else(|| format!("answer {:?} is not a single letter", answer))?;

        let difficulty = required_str(object, "difficulty")?;
        let difficulty = Difficulty::parse(difficulty.trim().to_lowercase().as_str())
            .ok_or_else(|| format!("unknown difficulty {:?}", difficulty))?;

        let format = required_str(object, "question_format")?;
        let format = QuestionFormat::parse(format.trim().to_lowercase().as_str())
            .ok_or_else(|| format!("unknown question_format {:?}", format))?;

        Self::new(text.trim(), options, correct_answer, difficulty, format)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &BTreeMap<char, String> {
        &self.options
    }

    pub fn correct_answer(&self) -> char {
        self.correct_answer
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn format(&self) -> QuestionFormat {
        self.format
    }
}

fn required_str<'a>(object: &'a serde_json::Map<String, Value>, key: &str) -> Result<&'a str, String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("{:?} is missing or not a string", key))
}

fn single_key(raw: &str) -> Option<char> {
    let mut chars = raw.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_lowercase()),
        _ => None,
    }
}

/// Questions in play order: all easy, then medium, then hard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionSet {
    pub questions: Vec<Question>,
}

impl QuestionSet {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    pub fn count_of(&self, difficulty: Difficulty) -> usize {
        self.questions
            .iter()
            .filter(|q| q.difficulty() == difficulty)
            .count()
    }

    pub fn is_grouped_by_difficulty(&self) -> bool {
        self.questions
            .windows(2)
            .all(|pair| pair[0].difficulty() <= pair[1].difficulty())
    }
}
