pub mod app;
pub mod error;

pub use crate::app::{App, Args, Mode, Report};
pub use crate::error::{Error, Result};
