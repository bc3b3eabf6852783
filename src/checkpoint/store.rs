use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CheckpointError;
use crate::policy::PolicyParameters;

use super::scanner::{checkpoint_file_name, ScanMode, ScoreScanner};

/// A directory of score-named parameter blobs.
///
/// Files are never modified or deleted once written; a write whose name
/// already exists replaces it.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
    extension: String,
}

impl CheckpointStore {
    /// Open `dir`, creating it and any missing parents.
    pub fn open(
        dir: impl Into<PathBuf>,
        extension: impl Into<String>,
    ) -> Result<Self, CheckpointError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| CheckpointError::CreateDir {
            path: dir.clone(),
            source: e,
        })?;
        Ok(CheckpointStore {
            dir,
            extension: extension.into(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Where a checkpoint with the given scores is written.
    pub fn path_for(&self, mean_reward: f64, std_reward: f64) -> PathBuf {
        self.dir
            .join(checkpoint_file_name(mean_reward, std_reward, &self.extension))
    }

    /// Serialize `parameters` and write them under a score-derived name.
    pub fn write(
        &self,
        mean_reward: f64,
        std_reward: f64,
        parameters: &PolicyParameters,
    ) -> Result<PathBuf, CheckpointError> {
        let bytes = bincode::serialize(parameters).map_err(CheckpointError::Serialize)?;
        let path = self.path_for(mean_reward, std_reward);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Read parameters back from a checkpoint file.
    pub fn read(&self, path: &Path) -> Result<PolicyParameters, CheckpointError> {
        let bytes = fs::read(path)?;
        bincode::deserialize(&bytes).map_err(|e| CheckpointError::Deserialize {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Path of the highest-scoring checkpoint, if any.
    pub fn best_checkpoint(&self, mode: ScanMode) -> Result<Option<PathBuf>, CheckpointError> {
        let best = ScoreScanner::new(mode)
            .entries(&self.dir)?
            .into_iter()
            .filter(|(path, _)| path.is_file())
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(path, _)| path);
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_parameters() -> PolicyParameters {
        let mut params = PolicyParameters::new();
        params.insert("q_table", vec![0.5, -1.25, 3.0, 0.0]);
        params
    }

    #[test]
    fn test_open_creates_nested_dir() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("data").join("models");
        let store = CheckpointStore::open(&dir, "bin").unwrap();
        assert!(dir.is_dir());
        assert_eq!(store.dir(), dir.as_path());

        // idempotent
        CheckpointStore::open(&dir, "bin").unwrap();
    }

    #[test]
    fn test_open_fails_when_path_is_a_file() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("models");
        fs::write(&blocker, b"not a dir").unwrap();

        let err = CheckpointStore::open(blocker.join("inner"), "bin").unwrap_err();
        assert!(matches!(err, CheckpointError::CreateDir { .. }));
    }

    #[test]
    fn test_write_and_read_back() {
        let root = tempfile::tempdir().unwrap();
        let store = CheckpointStore::open(root.path(), "bin").unwrap();

        let path = store.write(12.8, 1.1, &sample_parameters()).unwrap();
        assert_eq!(path, root.path().join("12_1.bin"));

        let restored = store.read(&path).unwrap();
        assert_eq!(restored, sample_parameters());
    }

    #[test]
    fn test_same_scores_overwrite() {
        let root = tempfile::tempdir().unwrap();
        let store = CheckpointStore::open(root.path(), "bin").unwrap();

        store.write(5.2, 0.4, &PolicyParameters::new()).unwrap();
        let path = store.write(5.9, 0.1, &sample_parameters()).unwrap();

        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 1);
        assert_eq!(store.read(&path).unwrap(), sample_parameters());
    }

    #[test]
    fn test_read_garbage_is_deserialize_error() {
        let root = tempfile::tempdir().unwrap();
        let store = CheckpointStore::open(root.path(), "bin").unwrap();
        let path = root.path().join("3_0.bin");
        fs::write(&path, [0xff, 0xff, 0xff]).unwrap();

        let err = store.read(&path).unwrap_err();
        assert!(matches!(err, CheckpointError::Deserialize { .. }));
    }

    #[test]
    fn test_best_checkpoint_picks_highest_prefix() {
        let root = tempfile::tempdir().unwrap();
        let store = CheckpointStore::open(root.path(), "bin").unwrap();
        assert!(store.best_checkpoint(ScanMode::Strict).unwrap().is_none());

        store.write(3.0, 0.0, &sample_parameters()).unwrap();
        store.write(-8.0, 2.0, &sample_parameters()).unwrap();
        store.write(17.5, 1.0, &sample_parameters()).unwrap();

        let best = store.best_checkpoint(ScanMode::Strict).unwrap().unwrap();
        assert_eq!(best, root.path().join("17_1.bin"));
    }
}
