use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Backend(#[from] backend::error::Error),
    #[error("TURRET_CAMERA_INDEX is set but TURRET_MODEL is not")]
    MissingModel,
}
