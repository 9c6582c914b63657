//! High score leaderboard
//!
//! Stored server-side as a JSON array, highest score first. Clients only ever
//! show the top [`LEADERBOARD_SIZE`](crate::consts::LEADERBOARD_SIZE).

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::HighScoreError;

/// Maximum number of high scores the store keeps
pub const MAX_STORED_SCORES: usize = 100;

/// Longest accepted player name (characters)
pub const MAX_NAME_LEN: usize = 32;

pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub score: u32,
}

fn default_name() -> String {
    DEFAULT_PLAYER_NAME.to_string()
}

impl HighScoreEntry {
    /// Entry with a cleaned-up name: trimmed, defaulted when empty, and
    /// cut to [`MAX_NAME_LEN`] characters
    pub fn new(name: &str, score: u32) -> Self {
        Self {
            name: clean_name(name),
            score,
        }
    }
}

/// Trim, default and truncate a submitted player name
pub fn clean_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        return default_name();
    }
    name.chars().take(MAX_NAME_LEN).collect()
}

/// The first `n` entries of an already ordered list
pub fn top_entries(entries: &[HighScoreEntry], n: usize) -> &[HighScoreEntry] {
    &entries[..n.min(entries.len())]
}

/// Body of a score submission. Missing fields take defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: Option<i64>,
}

/// Accept a score as an integer, a float (truncated) or a numeric string
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("score out of range: {}", n))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("score is not an integer: {:?}", s))),
        Some(other) => Err(D::Error::custom(format!("invalid score: {}", other))),
    }
}

impl SubmitRequest {
    pub fn into_entry(self) -> HighScoreEntry {
        let score = self.score.unwrap_or(0).clamp(0, u32::MAX as i64) as u32;
        HighScoreEntry::new(self.name.as_deref().unwrap_or(DEFAULT_PLAYER_NAME), score)
    }
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an entry and keep the board sorted and bounded.
    /// Returns the rank achieved (1-indexed) or None if it fell off the end.
    pub fn add(&mut self, entry: HighScoreEntry) -> Option<usize> {
        // Ties keep submission order: the new entry goes after equal scores
        let pos = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_STORED_SCORES);
        (pos < MAX_STORED_SCORES).then_some(pos + 1)
    }

    /// Add an entry and persist the result to `path`
    ///
    /// The board only changes once the write succeeded.
    pub fn add_and_save(
        &mut self,
        entry: HighScoreEntry,
        path: Option<&Path>,
    ) -> Result<Option<usize>, HighScoreError> {
        let mut updated = self.clone();
        let rank = updated.add(entry);
        if let Some(path) = path {
            updated.save(path)?;
        }
        *self = updated;
        Ok(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Sort descending by score (stable)
    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_STORED_SCORES);
    }

    /// Parse a JSON array of entries, in any order
    pub fn from_json(json: &str) -> Result<Self, HighScoreError> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        scores.normalize();
        Ok(scores)
    }

    /// Load from disk. A missing or unreadable file is an empty board.
    pub fn load(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(_) => {
                log::info!("No high scores at {}, starting fresh", path.display());
                return Self::new();
            }
        };
        match Self::from_json(&json) {
            Ok(scores) => {
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Err(e) => {
                log::warn!("Ignoring corrupt high score file {}: {}", path.display(), e);
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), HighScoreError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(scores: &[u32]) -> HighScores {
        let mut board = HighScores::new();
        for (i, score) in scores.iter().enumerate() {
            board.add(HighScoreEntry::new(&format!("p{}", i), *score));
        }
        board
    }

    #[test]
    fn test_add_keeps_descending_order() {
        let board = board(&[50, 200, 120, 10]);
        let scores: Vec<u32> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![200, 120, 50, 10]);
        assert_eq!(board.top_score(), Some(200));
    }

    #[test]
    fn test_ties_keep_submission_order() {
        let board = board(&[100, 100]);
        assert_eq!(board.entries[0].name, "p0");
        assert_eq!(board.entries[1].name, "p1");
    }

    #[test]
    fn test_rank() {
        let mut board = board(&[300, 100]);
        assert_eq!(board.add(HighScoreEntry::new("x", 200)), Some(2));
        assert_eq!(board.add(HighScoreEntry::new("y", 400)), Some(1));
        assert_eq!(board.add(HighScoreEntry::new("z", 0)), Some(5));
    }

    #[test]
    fn test_board_is_bounded() {
        let scores: Vec<u32> = (0..150).collect();
        let mut board = board(&scores);
        assert_eq!(board.entries.len(), MAX_STORED_SCORES);
        assert_eq!(board.top_score(), Some(149));
        assert_eq!(board.entries.last().map(|e| e.score), Some(50));
        assert_eq!(board.add(HighScoreEntry::new("low", 1)), None);
    }

    #[test]
    fn test_top_n() {
        let board = board(&[1, 2, 3]);
        assert_eq!(top_entries(&board.entries, 10).len(), 3);
        assert_eq!(top_entries(&board.entries, 2)[0].score, 3);
        assert!(top_entries(&[], 5).is_empty());
    }

    #[test]
    fn test_failed_save_leaves_board_unchanged() {
        let mut board = board(&[40]);
        let before = board.clone();
        // A directory cannot be written as a file
        let dir = std::env::temp_dir();
        let result = board.add_and_save(HighScoreEntry::new("Ana", 90), Some(&dir));
        assert!(matches!(result, Err(HighScoreError::Io(_))));
        assert_eq!(board, before);

        assert_eq!(board.add_and_save(HighScoreEntry::new("Bo", 90), None).unwrap(), Some(1));
        assert_eq!(board.top_score(), Some(90));
    }

    #[test]
    fn test_lenient_score_formats() {
        let parse = |json: &str| serde_json::from_str::<SubmitRequest>(json).map(|r| r.into_entry().score);
        assert_eq!(parse(r#"{"score":"42"}"#).unwrap(), 42);
        assert_eq!(parse(r#"{"score":" 7 "}"#).unwrap(), 7);
        assert_eq!(parse(r#"{"score":42.9}"#).unwrap(), 42);
        assert_eq!(parse(r#"{"score":null}"#).unwrap(), 0);
        assert!(parse(r#"{"score":"lots"}"#).is_err());
        assert!(parse(r#"{"score":true}"#).is_err());
    }

    #[test]
    fn test_name_cleanup() {
        assert_eq!(clean_name("  devil  "), "devil");
        assert_eq!(clean_name("   "), "Player");
        let long = "x".repeat(40);
        assert_eq!(clean_name(&long).chars().count(), MAX_NAME_LEN);
    }

    #[test]
    fn test_submit_request_defaults() {
        let req: SubmitRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.into_entry(), HighScoreEntry::new("Player", 0));

        let req: SubmitRequest = serde_json::from_str(r#"{"name":"Ana","score":-5}"#).unwrap();
        assert_eq!(req.into_entry(), HighScoreEntry::new("Ana", 0));
    }

    #[test]
    fn test_from_json_sorts() {
        let scores = HighScores::from_json(
            r#"[{"name":"a","score":10},{"name":"b","score":30},{"score":20}]"#,
        )
        .unwrap();
        assert_eq!(scores.entries[0].name, "b");
        assert_eq!(scores.entries[1].name, "Player");
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!(
            "devil_levels_scores_{}.json",
            std::process::id()
        ));
        let board = board(&[5, 15]);
        board.save(&path).unwrap();
        assert_eq!(HighScores::load(&path), board);
        std::fs::remove_file(&path).unwrap();

        // Missing file reads as empty
        assert!(HighScores::load(&path).is_empty());
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let path = std::env::temp_dir().join(format!(
            "devil_levels_corrupt_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "not json").unwrap();
        assert!(HighScores::load(&path).is_empty());
        std::fs::remove_file(&path).unwrap();
    }
}
