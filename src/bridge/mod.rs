//! Presentation bridge
//!
//! The simulation never touches the page. It emits [`GameEvent`]s that the
//! driver hands to a [`Presenter`], and high scores go through a
//! [`HighScoreService`] whose calls complete through callbacks so the frame
//! loop never waits on them.

use std::cell::RefCell;
use std::path::PathBuf;

use crate::error::HighScoreError;
use crate::highscores::{HighScoreEntry, HighScores};
use crate::sim::GameEvent;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
pub use web::HttpHighScoreService;

/// Receives state changes and highscore results
pub trait Presenter {
    /// Score, level, lives, level-cleared or game-over notification
    fn notify(&mut self, event: &GameEvent);

    /// Leaderboard entries, best first (already cut to the display size)
    fn leaderboard_loaded(&mut self, entries: &[HighScoreEntry]);

    /// A submitted score was accepted
    fn score_submitted(&mut self) {}

    /// Something the player should be told about
    fn show_error(&mut self, message: &str);
}

pub type SubmitCallback = Box<dyn FnOnce(Result<(), HighScoreError>)>;
pub type LeaderboardCallback = Box<dyn FnOnce(Result<Vec<HighScoreEntry>, HighScoreError>)>;

/// External highscore store
///
/// Implementations may complete immediately or later, but must never block
/// the caller waiting for a remote answer.
pub trait HighScoreService {
    fn submit_score(&self, entry: HighScoreEntry, on_done: SubmitCallback);

    /// Entries ordered highest score first
    fn fetch_leaderboard(&self, on_done: LeaderboardCallback);
}

/// In-process highscore store, optionally backed by a JSON file
#[derive(Debug, Default)]
pub struct LocalHighScoreService {
    scores: RefCell<HighScores>,
    path: Option<PathBuf>,
}

impl LocalHighScoreService {
    /// Memory-only store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store persisted at `path`, loading whatever is already there
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            scores: RefCell::new(HighScores::load(&path)),
            path: Some(path),
        }
    }

    pub fn scores(&self) -> HighScores {
        self.scores.borrow().clone()
    }
}

impl HighScoreService for LocalHighScoreService {
    fn submit_score(&self, entry: HighScoreEntry, on_done: SubmitCallback) {
        let result = self
            .scores
            .borrow_mut()
            .add_and_save(entry, self.path.as_deref())
            .map(|_| ());
        on_done(result);
    }

    fn fetch_leaderboard(&self, on_done: LeaderboardCallback) {
        let entries = self.scores.borrow().entries.clone();
        on_done(Ok(entries));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_local_service_roundtrip() {
        let service = LocalHighScoreService::new();
        let submitted = Rc::new(RefCell::new(false));

        let flag = submitted.clone();
        service.submit_score(
            HighScoreEntry::new("Ana", 120),
            Box::new(move |r| *flag.borrow_mut() = r.is_ok()),
        );
        service.submit_score(HighScoreEntry::new("Bo", 300), Box::new(|_| {}));
        assert!(*submitted.borrow());

        let fetched = Rc::new(RefCell::new(Vec::new()));
        let out = fetched.clone();
        service.fetch_leaderboard(Box::new(move |r| {
            *out.borrow_mut() = r.unwrap();
        }));
        let names: Vec<String> = fetched.borrow().iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, vec!["Bo", "Ana"]);
    }

    #[test]
    fn test_file_backed_service_persists() {
        let path = std::env::temp_dir().join(format!(
            "devil_levels_service_{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let service = LocalHighScoreService::with_file(&path);
        service.submit_score(HighScoreEntry::new("Cy", 50), Box::new(|r| assert!(r.is_ok())));

        let reopened = LocalHighScoreService::with_file(&path);
        assert_eq!(reopened.scores().top_score(), Some(50));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_failed_write_is_not_listed() {
        let service = LocalHighScoreService::with_file(std::env::temp_dir());
        let failed = Rc::new(RefCell::new(false));

        let flag = failed.clone();
        service.submit_score(
            HighScoreEntry::new("Ana", 500),
            Box::new(move |r| *flag.borrow_mut() = r.is_err()),
        );
        assert!(*failed.borrow());
        assert!(service.scores().is_empty());
    }
}
