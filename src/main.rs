#[macro_use]
extern crate clap;
#[macro_use]
extern crate lazy_static;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use clap::{Arg, Command};
use log::{error, info, warn, LevelFilter};
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};

mod backup;
mod configuration;
mod error;
mod formatter;
mod helper;

use backup::{Backup, Report};
use configuration::{Compression, Configuration};

pub const APP_NAME: &str = "arkaive";

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} - {m}{n}";

struct Arguments {
    config_file: Option<PathBuf>,
    compression: Compression,
}

fn start_main(arguments: Arguments) {
    info!("{} {} started", APP_NAME, crate_version!());

    let config_file = match arguments.config_file.or_else(Configuration::default_path) {
        Some(config_file) => config_file,
        None => {
            error!("unable to determine the configuration directory.");
            return;
        }
    };

    if let Err(err) = run_archives(&config_file, arguments.compression) {
        error!("{}", err);
        return;
    }
    info!("{} finished", APP_NAME);
}

/// Loads `config_file` and archives every job in it. A configuration error
/// stops the run before any archive is touched; archive errors only count
/// as failures in the report.
fn run_archives(config_file: &Path, compression: Compression) -> error::Result<Report> {
    info!("reading configuration from {}", config_file.display());
    let configuration = Configuration::load(config_file)?;

    if configuration.is_empty() {
        warn!("no archives configured in {}", config_file.display());
    }

    Ok(Backup::start(configuration, compression))
}

fn main() {
    let arguments = get_arguments();
    init_logging();
    start_main(arguments);
}

/// The user log directory: `~/Library/Logs/arkaive` on macOS,
/// `<local app data>/arkaive/Logs` on Windows and
/// `<state dir>/arkaive/log` elsewhere.
#[cfg(target_os = "macos")]
fn log_directory() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("Library").join("Logs").join(APP_NAME))
}

#[cfg(windows)]
fn log_directory() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(APP_NAME).join("Logs"))
}

#[cfg(not(any(target_os = "macos", windows)))]
fn log_directory() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|dir| dir.join(APP_NAME).join("log"))
}

fn log_file_name(now: DateTime<Local>) -> String {
    format!("{}_{}.log", APP_NAME, now.format("%Y-%m-%d_%H-%M-%S"))
}

fn init_logging() {
    let level = LevelFilter::Info;
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();

    let mut builder = Config::builder().appender(
        Appender::builder()
            .filter(Box::new(ThresholdFilter::new(level)))
            .build("stderr", Box::new(stderr)),
    );
    let mut root = Root::builder().appender("stderr");

    let mut file_error = None;
    match log_directory() {
        Some(directory) => {
            let log_file = directory.join(log_file_name(Local::now()));
            let appender = fs::create_dir_all(&directory).and_then(|_| {
                FileAppender::builder()
                    .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
                    .build(&log_file)
            });
            match appender {
                Ok(appender) => {
                    builder = builder.appender(Appender::builder().build("file", Box::new(appender)));
                    root = root.appender("file");
                }
                Err(err) => {
                    file_error = Some(format!(
                        "unable to open log file '{}': {}",
                        log_file.display(),
                        err
                    ));
                }
            }
        }
        None => file_error = Some(String::from("unable to determine the log directory")),
    }

    let config = match builder.build(root.build(level)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid logging configuration: {}", err);
            return;
        }
    };
    if let Err(err) = log4rs::init_config(config) {
        eprintln!("unable to initialise logging: {}", err);
        return;
    }

    if let Some(message) = file_error {
        warn!("{}, logging to stderr only.", message);
    }
}

fn get_arguments() -> Arguments {
    let matches = Command::new(APP_NAME)
        .version(crate_version!())
        .author(crate_authors!())
        .about("A basic and configurable auto-archiver.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("The file to read the archive settings from (default: <config dir>/arkaive/config.toml)"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .default_value("gzip")
                .value_parser(|value: &str| value.parse::<Compression>())
                .help("gzip (default), bzip2 or xz; an archive's own 'compression' setting wins"),
        )
        .get_matches();

    Arguments {
        config_file: matches
            .get_one::<String>("config")
            .map(helper::expand_home),
        compression: matches
            .get_one::<Compression>("format")
            .copied()
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_log_file_name() {
        let now = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(log_file_name(now), "arkaive_2024-03-07_09-05-02.log");
    }

    #[cfg(not(any(target_os = "macos", windows)))]
    #[test]
    fn test_log_directory() {
        if let Some(directory) = log_directory() {
            assert!(directory.ends_with("arkaive/log"));
        }
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn test_log_directory() {
        if let Some(directory) = log_directory() {
            assert!(directory.ends_with("Library/Logs/arkaive"));
        }
    }

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let config_file = dir.join("config.toml");
        fs::write(&config_file, content).unwrap();
        config_file
    }

    #[test]
    fn test_run_archives_partial_failure() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        for name in ["one.txt", "two.txt", "three.txt"] {
            fs::write(docs.join(name), name).unwrap();
        }
        let output = dir.path().join("backups");
        let config_file = write_config(
            dir.path(),
            &format!(
                "[docs]\ninput = {:?}\noutput = {:?}\n\n[broken]\ninput = {:?}\noutput = {:?}\n",
                docs.to_string_lossy(),
                output.to_string_lossy(),
                dir.path().join("missing").to_string_lossy(),
                output.to_string_lossy(),
            ),
        );

        let report = run_archives(&config_file, Compression::TarGz).unwrap();
        assert_eq!(
            report,
            Report {
                succeeded: 1,
                failed: 1
            }
        );
        assert!(output.join("docs.tar.gz").is_file());
        assert!(!output.join("broken.tar.gz").exists());
    }

    #[test]
    fn test_run_archives_configuration_error_runs_nothing() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("one.txt"), "1").unwrap();
        let output = dir.path().join("backups");
        let config_file = write_config(
            dir.path(),
            &format!(
                "[docs]\ninput = {:?}\noutput = {:?}\n\n[incomplete]\ninput = {:?}\n",
                docs.to_string_lossy(),
                output.to_string_lossy(),
                docs.to_string_lossy(),
            ),
        );

        let result = run_archives(&config_file, Compression::TarGz);
        assert!(matches!(result, Err(error::Error::Configuration(_))));
        assert!(!output.exists());
    }

    #[test]
    fn test_run_archives_missing_config() {
        let dir = TempDir::new().unwrap();
        let result = run_archives(&dir.path().join("absent.toml"), Compression::TarGz);
        assert!(matches!(result, Err(error::Error::Configuration(_))));
    }

    #[test]
    fn test_run_archives_empty_config() {
        let dir = TempDir::new().unwrap();
        let config_file = write_config(dir.path(), "");
        let report = run_archives(&config_file, Compression::TarGz).unwrap();
        assert_eq!(report, Report::default());
    }
}
