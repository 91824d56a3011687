use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    io,
};

/// JSON site loader with `serde_json` crate.
#[cfg(feature = "json")]
pub mod json;

#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
    #[cfg(feature = "json")]
    Json(serde_json::Error),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(error) => write!(f, "Failed to read site: {}", error),
            #[cfg(feature = "json")]
            LoadError::Json(error) => write!(f, "Bad site description: {}", error),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoadError::Io(error) => Some(error),
            #[cfg(feature = "json")]
            LoadError::Json(error) => Some(error),
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for LoadError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
