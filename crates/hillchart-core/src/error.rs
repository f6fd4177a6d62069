use crate::codec::DecodeError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("invalid location URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
