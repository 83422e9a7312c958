use std::{fmt, io::Write, str::FromStr};

use bzip2::write::BzEncoder;
use flate2::write::GzEncoder;
use xz2::write::XzEncoder;

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Compression {
    TarGz,
    TarBZ2,
    TarXz,
}

impl Compression {
    const XZ_PRESET: u32 = 6;

    pub fn to_extension_string(&self) -> String {
        match self {
            Self::TarGz => String::from(".tar.gz"),
            Self::TarBZ2 => String::from(".tar.bz2"),
            Self::TarXz => String::from(".tar.xz"),
        }
    }

    /// Wraps `inner` in the encoder for this format, hands the encoder to
    /// `write` and finishes the compressed stream afterwards.
    pub fn encode<W, F>(&self, inner: W, write: F) -> std::io::Result<W>
    where
        W: Write,
        F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
    {
        match self {
            Self::TarGz => {
                let mut gz = GzEncoder::new(inner, flate2::Compression::default());
                write(&mut gz)?;
                gz.finish()
            }
            Self::TarBZ2 => {
                let mut bz2 = BzEncoder::new(inner, bzip2::Compression::best());
                write(&mut bz2)?;
                bz2.finish()
            }
            Self::TarXz => {
                let mut xz = XzEncoder::new(inner, Self::XZ_PRESET);
                write(&mut xz)?;
                xz.finish()
            }
        }
    }
}

impl Default for Compression {
    fn default() -> Self {
        Self::TarGz
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TarGz => write!(f, "gzip"),
            Self::TarBZ2 => write!(f, "bzip2"),
            Self::TarXz => write!(f, "xz"),
        }
    }
}

impl FromStr for Compression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gzip" | "gz" | "gztar" | "tar.gz" | "tgz" => Ok(Self::TarGz),
            "bzip2" | "bz2" | "bztar" | "tar.bz2" => Ok(Self::TarBZ2),
            "xz" | "lzma" | "xztar" | "tar.xz" => Ok(Self::TarXz),
            other => Err(Error::configuration(format!(
                "invalid compression value '{}'.",
                other
            ))),
        }
    }
}
