use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Utc};
use log::{error, info};
use regex::Regex;
use tar::Builder;
use walkdir::WalkDir;

use crate::configuration::{Archive, Compression, Configuration};
use crate::error::{Error, Result};
use crate::formatter::Formatter;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Report {
    pub succeeded: usize,
    pub failed: usize,
}

pub struct Backup {}

impl Backup {
    fn build_real_archive_name(name: &str, now: DateTime<Utc>) -> String {
        lazy_static! {
            static ref REGEX_DATE_YEAR: Regex = Regex::new(r"\{date:year\}").unwrap();
            static ref REGEX_DATE_MONTH: Regex = Regex::new(r"\{date:month\}").unwrap();
            static ref REGEX_DATE_DAY: Regex = Regex::new(r"\{date:day\}").unwrap();
            static ref REGEX_DATE_WEEKDAY: Regex = Regex::new(r"\{date:weekday\}").unwrap();
        }
        let name = REGEX_DATE_YEAR.replace_all(name, format!("{:04}", now.year()).as_str());
        let name = REGEX_DATE_MONTH.replace_all(&name, format!("{:02}", now.month()).as_str());
        let name = REGEX_DATE_DAY.replace_all(&name, format!("{:02}", now.day()).as_str());
        let name = REGEX_DATE_WEEKDAY.replace_all(&name, format!("{:?}", now.weekday()).as_str());

        name.into_owned()
    }

    /// Archives every job of `configuration`. A failing archive is logged and
    /// the remaining ones still run.
    pub fn start(configuration: Configuration, compression: Compression) -> Report {
        let mut report = Report::default();
        info!("starting backup of {} archive(s)", configuration.len());

        for archive in configuration {
            let archive_compression = archive.compression_or(compression);
            info!("creating archive: {} ({})", archive.name, archive_compression);
            match Backup::create_archive(&archive, archive_compression) {
                Ok(path) => {
                    let size = fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0);
                    info!(
                        "created {} ({})",
                        path.display(),
                        Formatter::format_size(size, 2)
                    );
                    report.succeeded += 1;
                }
                Err(err) => {
                    error!("{}", err);
                    report.failed += 1;
                }
            }
        }

        info!(
            "backup finished: {} succeeded, {} failed",
            report.succeeded, report.failed
        );
        report
    }

    /// Writes `<output>/<name><extension>` holding the contents of `input`.
    /// Nothing is left behind at the target path when this fails.
    pub fn create_archive(archive: &Archive, compression: Compression) -> Result<PathBuf> {
        let real_archive_name = Backup::build_real_archive_name(&archive.name, Utc::now());
        let map_error = |err: std::io::Error| Error::archive(real_archive_name.as_str(), err);

        match fs::metadata(&archive.input) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(Error::archive(
                    real_archive_name.as_str(),
                    format!("'{}' is not a directory", archive.input.display()),
                ));
            }
            Err(err) => {
                return Err(Error::archive(
                    real_archive_name.as_str(),
                    format!("unable to read '{}': {}", archive.input.display(), err),
                ));
            }
        }

        fs::create_dir_all(&archive.output).map_err(|err| {
            Error::archive(
                real_archive_name.as_str(),
                format!(
                    "unable to create output directory '{}': {}",
                    archive.output.display(),
                    err
                ),
            )
        })?;

        let archive_path = archive.output.join(format!(
            "{}{}",
            real_archive_name,
            compression.to_extension_string()
        ));
        let file = File::create(&archive_path).map_err(map_error)?;

        // Resolved after creation so symlinked or relative outputs still match
        // the walked entries.
        let written = fs::canonicalize(&archive_path)
            .and_then(|skip| {
                compression.encode(BufWriter::new(file), |encoder| {
                    Backup::tar_directory(encoder, &archive.input, &skip)
                })
            })
            .and_then(|mut writer| writer.flush());

        if let Err(err) = written {
            if let Err(remove_err) = fs::remove_file(&archive_path) {
                error!(
                    "error removing incomplete archive: {} => {:?}",
                    archive_path.display(),
                    remove_err
                );
            }
            return Err(map_error(err));
        }

        Ok(archive_path)
    }

    /// Appends the contents of `directory` to a tar stream, with member
    /// paths relative to `directory`. `skip` is the canonical path of the
    /// archive being written, which sits inside `directory` when the output
    /// resolves to a place in the input.
    fn tar_directory(writer: &mut dyn Write, directory: &Path, skip: &Path) -> std::io::Result<()> {
        let mut tar = Builder::new(writer);
        tar.follow_symlinks(false);

        for entry in WalkDir::new(directory).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file()
                && Some(entry.file_name()) == skip.file_name()
                && fs::canonicalize(entry.path())? == skip
            {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(directory)
                .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
            tar.append_path_with_name(entry.path(), relative)?;
        }

        tar.finish()
    }
}
