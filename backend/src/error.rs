use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[cfg(feature = "opencv")]
    #[error(transparent)]
    OpenCV(#[from] opencv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{}:{line}: bad replay frame: {source}", .path.display())]
    Replay {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
    #[error("servo angle {0} is outside [-90, 90]")]
    AngleOutOfRange(f64),
    #[error("invalid value {value:?} for {key}")]
    InvalidConfig { key: &'static str, value: String },
}
