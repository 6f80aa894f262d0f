use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::LeaderboardError;

pub const MAX_HIGHSCORES: usize = 10;
pub const INITIALS_LEN: usize = 3;

/// Three letters, uppercased. The only way to get a name onto the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Initials(String);

impl Initials {
    pub fn parse(raw: &str) -> Option<Self> {
        // Uppercasing can change the length ("ß" becomes "SS"), so check afterwards
        let upper = raw.trim().to_uppercase();
        if upper.chars().count() == INITIALS_LEN && upper.chars().all(char::is_alphabetic) {
            Some(Self(upper))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Initials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub initials: String,
    pub score: u32,
}

/// Top scores, best first, backed by a JSON file shaped like `[{"ABC": 9, "XYZ": 4}]`.
#[derive(Debug)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
    path: PathBuf,
}

impl Leaderboard {
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            entries: Vec::new(),
            path: path.into(),
        }
    }

    /// Reads the board from `path`. A file that doesn't exist yet is an empty board.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, LeaderboardError> {
        let path = path.into();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("No leaderboard at {}, starting empty", path.display());
                return Ok(Self::empty(path));
            }
            Err(err) => return Err(err.into()),
        };

        let entries = parse_entries(&contents)?;
        info!(
            "Loaded {} leaderboard entries from {}",
            entries.len(),
            path.display()
        );

        let mut board = Self { entries, path };
        board.rank();
        Ok(board)
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A score makes the board while there is room, or when it strictly beats the lowest entry.
    pub fn admits(&self, score: u32) -> bool {
        if self.entries.len() < MAX_HIGHSCORES {
            return true;
        }
        match self.entries.iter().map(|e| e.score).min() {
            Some(lowest) => score > lowest,
            None => true,
        }
    }

    /// Merges the score in (an existing name is overwritten in place), re-ranks, truncates and
    /// writes the whole board back to disk.
    pub fn record(&mut self, initials: &Initials, score: u32) -> Result<(), LeaderboardError> {
        match self
            .entries
            .iter_mut()
            .find(|e| e.initials == initials.as_str())
        {
            Some(existing) => existing.score = score,
            None => self.entries.push(LeaderboardEntry {
                initials: initials.to_string(),
                score,
            }),
        }
        self.rank();
        self.save()
    }

    /// Writes to a sibling temp file, then renames it over the real one.
    pub fn save(&self) -> Result<(), LeaderboardError> {
        let mut scores = Map::new();
        for entry in &self.entries {
            scores.insert(entry.initials.clone(), Value::from(entry.score));
        }
        let document = vec![Value::Object(scores)];

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        document.serialize(&mut serializer)?;

        let mut tmp_path = self.path.as_os_str().to_owned();
        tmp_path.push(".tmp");
        let tmp_path = PathBuf::from(tmp_path);

        fs::write(&tmp_path, &buf)?;
        fs::rename(&tmp_path, &self.path)?;

        debug!(
            "Saved {} leaderboard entries to {}",
            self.entries.len(),
            self.path.display()
        );
        Ok(())
    }

    pub fn render(&self) -> String {
        if self.entries().is_empty() {
            return "🥇 Highscores:\n\tNo highscores yet - be the first!".to_string();
        }
        let mut out = String::from("🥇 Highscores:");
        for (rank, entry) in self.entries().iter().enumerate() {
            out.push_str(&format!(
                "\n\t{:>2}. {} - {}",
                rank + 1,
                entry.initials,
                entry.score
            ));
        }
        out
    }

    // Stable, so equal scores keep their merge order
    fn rank(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGHSCORES);
    }
}

fn parse_entries(contents: &str) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
    let document: Value = serde_json::from_str(contents)?;
    let outer = document
        .as_array()
        .ok_or_else(|| LeaderboardError::Format("top level is not an array".to_string()))?;

    let scores = match outer.first() {
        None => return Ok(Vec::new()),
        Some(Value::Object(scores)) => scores,
        Some(_) => {
            return Err(LeaderboardError::Format(
                "first element is not an object".to_string(),
            ))
        }
    };

    scores
        .iter()
        .map(|(initials, score)| {
            let score = score
                .as_u64()
                .and_then(|s| u32::try_from(s).ok())
                .ok_or_else(|| {
                    LeaderboardError::Format(format!("score for {} is not a whole number", initials))
                })?;
            Ok(LeaderboardEntry {
                initials: initials.clone(),
                score,
            })
        })
        .collect()
}
