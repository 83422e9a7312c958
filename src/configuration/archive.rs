use std::path::PathBuf;

use crate::configuration::Compression;

#[derive(Clone, Debug, PartialEq)]
pub struct Archive {
    pub name: String,
    pub input: PathBuf,
    pub output: PathBuf,
    /// Overrides the run's compression for this archive only.
    pub compression: Option<Compression>,
}

impl Archive {
    pub fn new<S: Into<String>, P: Into<PathBuf>, Q: Into<PathBuf>>(
        name: S,
        input: P,
        output: Q,
    ) -> Archive {
        Archive {
            name: name.into(),
            input: input.into(),
            output: output.into(),
            compression: None,
        }
    }

    pub fn compression_or(&self, default: Compression) -> Compression {
        self.compression.unwrap_or(default)
    }
}
