use thiserror::Error;

use crate::{generator::GeneratorError, queue::TaskError};

#[derive(Debug, Error)]
pub enum TagsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Queue(#[from] TaskError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

pub type Result<T, E = TagsError> = std::result::Result<T, E>;
