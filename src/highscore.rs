use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_HIGH_SCORE_FILE: &str = "highscore.txt";

#[derive(Debug, thiserror::Error)]
pub enum HighScoreError {
    #[error("failed to access high score file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("high score file {path} does not contain a score: {contents:?}")]
    Parse { path: PathBuf, contents: String },
}

/// Plain-text high score file: a single non-negative integer.
#[derive(Clone, Debug)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<u32, HighScoreError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| HighScoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        contents
            .trim()
            .parse()
            .map_err(|_| HighScoreError::Parse {
                path: self.path.clone(),
                contents,
            })
    }

    /// A missing file means no score has been recorded yet.
    pub fn load_or_default(&self) -> Result<u32, HighScoreError> {
        match self.load() {
            Err(HighScoreError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Ok(0)
            }
            other => other,
        }
    }

    pub fn save(&self, score: u32) -> Result<(), HighScoreError> {
        fs::write(&self.path, score.to_string()).map_err(|source| HighScoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl Default for HighScoreStore {
    fn default() -> Self {
        Self::new(DEFAULT_HIGH_SCORE_FILE)
    }
}
