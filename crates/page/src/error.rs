use dom::DomError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("host document has no {0}")]
    MissingElement(&'static str),
    #[error(transparent)]
    Dom(#[from] DomError),
}
