use std::fs;
use std::num::IntErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CheckpointError;

/// Best score reported when the save directory holds no checkpoints.
pub const NO_PRIOR_SCORE: f64 = -999.0;

/// Separates the truncated mean reward from the truncated std in file names.
pub const SCORE_DELIMITER: char = '_';

/// How the scanner treats entries whose name has no integer score prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Any malformed name aborts the scan.
    #[default]
    Strict,
    /// Malformed names are logged and skipped.
    Lenient,
}

/// File name for a checkpoint scored `mean_reward` ± `std_reward`.
///
/// Both values are truncated toward zero, so `-1.9` becomes `-1`.
pub fn checkpoint_file_name(mean_reward: f64, std_reward: f64, extension: &str) -> String {
    format!(
        "{}{}{}.{}",
        mean_reward as i64, SCORE_DELIMITER, std_reward as i64, extension
    )
}

/// Parse the integer score before the first delimiter of `name`.
///
/// Integers too large for `i64` are still accepted and read as the nearest
/// `f64`.
pub fn parse_score_prefix(name: &str) -> Option<f64> {
    let prefix = name.split(SCORE_DELIMITER).next()?;
    match prefix.parse::<i64>() {
        Ok(score) => Some(score as f64),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            prefix.parse().ok()
        }
        Err(_) => None,
    }
}

/// Recovers the best previously saved score from checkpoint file names.
///
/// Only names are inspected; file contents are never read.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreScanner {
    mode: ScanMode,
}

impl ScoreScanner {
    pub fn new(mode: ScanMode) -> Self {
        ScoreScanner { mode }
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Every entry directly under `dir` paired with its score prefix.
    ///
    /// Entries are returned sorted by path so results do not depend on the
    /// order the filesystem lists them in.
    pub fn entries(&self, dir: &Path) -> Result<Vec<(PathBuf, f64)>, CheckpointError> {
        let mut scored = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let score = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(parse_score_prefix);
            match (score, self.mode) {
                (Some(score), _) => scored.push((path, score)),
                (None, ScanMode::Strict) => {
                    return Err(CheckpointError::MalformedName { path });
                }
                (None, ScanMode::Lenient) => {
                    tracing::warn!(path = %path.display(), "skipping entry without a score prefix");
                }
            }
        }
        scored.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(scored)
    }

    /// Highest score prefix under `dir`, or [`NO_PRIOR_SCORE`] if there is none.
    pub fn scan(&self, dir: &Path) -> Result<f64, CheckpointError> {
        let best = self
            .entries(dir)?
            .into_iter()
            .map(|(_, score)| score)
            .fold(NO_PRIOR_SCORE, f64::max);
        Ok(best)
    }
}
