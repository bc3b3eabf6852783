mod scanner;
mod store;

pub use scanner::{
    checkpoint_file_name, parse_score_prefix, ScanMode, ScoreScanner, NO_PRIOR_SCORE,
    SCORE_DELIMITER,
};
pub use store::CheckpointStore;
