use std::fmt::Display;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("unable to create archive '{name}': {reason}")]
    Archive { name: String, reason: String },
}

impl Error {
    pub fn configuration<S: Display>(message: S) -> Error {
        Error::Configuration(message.to_string())
    }

    pub fn archive<N: Into<String>, R: Display>(name: N, reason: R) -> Error {
        Error::Archive {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
