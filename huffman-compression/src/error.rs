use std::{error::Error, io};

use derive_more::Display;

#[derive(Debug, Display)]
pub enum CodecError {
    #[display(fmt = "I/O error: {}", _0)]
    Io(io::Error),

    #[display(fmt = "malformed header: {}", _0)]
    MalformedHeader(String),

    #[display(fmt = "truncated payload: {}", _0)]
    TruncatedPayload(String),

    #[display(fmt = "symbol {:?} has no code in the table", _0)]
    UnknownSymbol(char),
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CodecError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(err: io::Error) -> Self {
        CodecError::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
