use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: shapesort [SOURCE] [DESTINATION] [OPTIONS]

Moves PNG, JPEG and GIF images from SOURCE into
DESTINATION/<Landscape|Portrait>/<aspect ratio>/<n>.<ext>.
Folders not given on the command line are asked for interactively.

Options:
  --source=DIR        Folder containing the images to sort
  --destination=DIR   Root folder for the sorted images
  --log=FILE          Move log location (default: log.txt next to the executable)
  --report=FILE       Also write a JSON report of the run
  --extensions=LIST   Comma-separated extensions to sort (default: png,jpeg,jpg,gif)
  --strict            Stop at the first image that cannot be sorted
  --rescan            Recount destination folders before every move
  -h, --help          Print this help
  -V, --version       Print the version";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliConfig {
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub log: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub extensions: Option<Vec<String>>,
    pub strict: bool,
    pub rescan: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CliError {
    Help,
    Version,
    InvalidFlag(String),
    UnexpectedArgument(String),
}

impl CliConfig {
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_iter(env::args().skip(1))
    }

    pub fn from_iter<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();

        for arg in args {
            if arg == "-h" || arg == "--help" {
                return Err(CliError::Help);
            }
            if arg == "-V" || arg == "--version" {
                return Err(CliError::Version);
            }
            if arg.starts_with('-') {
                config.apply_flag(arg)?;
                continue;
            }

            if config.source.is_none() {
                config.source = Some(PathBuf::from(&arg));
                continue;
            }

            if config.destination.is_none() {
                config.destination = Some(PathBuf::from(&arg));
                continue;
            }

            return Err(CliError::UnexpectedArgument(arg));
        }

        Ok(config)
    }

    fn apply_flag(&mut self, arg: String) -> Result<(), CliError> {
        match arg.as_str() {
            "--strict" => self.strict = true,
            "--rescan" => self.rescan = true,
            _ => {
                let (flag, value) = arg
                    .split_once('=')
                    .filter(|(_, value)| !value.is_empty())
                    .ok_or_else(|| CliError::InvalidFlag(arg.clone()))?;
                match flag {
                    "--source" => self.source = Some(PathBuf::from(value)),
                    "--destination" => self.destination = Some(PathBuf::from(value)),
                    "--log" => self.log = Some(PathBuf::from(value)),
                    "--report" => self.report = Some(PathBuf::from(value)),
                    "--extensions" => self.extensions = Some(parse_extensions(value)),
                    _ => return Err(CliError::InvalidFlag(arg.clone())),
                }
            }
        }
        Ok(())
    }
}

fn parse_extensions(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|ext| !ext.is_empty())
        .map(String::from)
        .collect()
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Help => write!(f, "{}", USAGE),
            Self::Version => write!(f, "shapesort {}", env!("CARGO_PKG_VERSION")),
            Self::InvalidFlag(flag) => write!(f, "unrecognized argument: {}", flag),
            Self::UnexpectedArgument(arg) => write!(f, "unexpected extra argument: {}", arg),
        }
    }
}

impl Error for CliError {}
