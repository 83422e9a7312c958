use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

pub mod archive;
pub mod compression;

pub use archive::Archive;
pub use compression::Compression;

use crate::error::{Error, Result};
use crate::helper;

/// One `[name]` table of the config file. Keys other than these are ignored.
#[derive(Debug, Deserialize)]
struct Section {
    input: String,
    output: String,
    compression: Option<String>,
}

#[derive(Debug, Default)]
pub struct Configuration {
    pub archives: Vec<Archive>,
}

impl Configuration {
    pub const CONFIG_FILE: &'static str = "config.toml";

    /// `<config dir>/arkaive/config.toml`, e.g. `~/.config/arkaive/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(crate::APP_NAME).join(Self::CONFIG_FILE))
    }

    pub fn load<P: AsRef<Path>>(filename: P) -> Result<Configuration> {
        let filename = filename.as_ref();
        let content = fs::read_to_string(filename).map_err(|err| {
            Error::configuration(format!("unable to read '{}': {}", filename.display(), err))
        })?;

        Configuration::parse(&content).map_err(|err| match err {
            Error::Configuration(message) => {
                Error::configuration(format!("{}: {}", filename.display(), message))
            }
            other => other,
        })
    }

    /// Validates every section before returning, so one bad section fails
    /// the whole file and no archive is produced from it.
    pub fn parse(content: &str) -> Result<Configuration> {
        let table: toml::Table = toml::from_str(content)
            .map_err(|err| Error::configuration(format!("invalid toml: {}", err)))?;

        let mut configuration = Configuration::default();
        for (name, value) in table {
            let section: Section = match value {
                toml::Value::Table(_) => value.try_into().map_err(|err| {
                    Error::configuration(format!("archive '{}': {}", name, err))
                })?,
                other => {
                    return Err(Error::configuration(format!(
                        "'{}' must be a table with 'input' and 'output', found {}",
                        name,
                        other.type_str()
                    )));
                }
            };

            let compression = match section.compression {
                Some(compression) => match compression.parse::<Compression>() {
                    Ok(compression) => Some(compression),
                    Err(Error::Configuration(message)) => {
                        return Err(Error::configuration(format!(
                            "archive '{}': {}",
                            name, message
                        )));
                    }
                    Err(err) => return Err(err),
                },
                None => None,
            };

            configuration.archives.push(Archive {
                compression,
                ..Archive::new(
                    name,
                    helper::expand_home(&section.input),
                    helper::expand_home(&section.output),
                )
            });
        }

        Ok(configuration)
    }

    pub fn len(&self) -> usize {
        self.archives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }
}

impl IntoIterator for Configuration {
    type Item = Archive;
    type IntoIter = std::vec::IntoIter<Archive>;

    fn into_iter(self) -> Self::IntoIter {
        self.archives.into_iter()
    }
}
