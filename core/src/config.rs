//! Validated run configuration.

use dirs::data_local_dir;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Extensions moved by default, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpeg", "jpg", "gif"];

/// Log file name, created next to the executable.
pub const LOG_FILE_NAME: &str = "log.txt";

/// What the sorter does when a single file cannot be placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the file as failed and carry on with the next one.
    #[default]
    Continue,
    /// Stop the run at the first failure.
    Abort,
}

/// Parameters for one sorting run. Both directories are known to exist
/// when construction succeeds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortConfig {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub log_path: PathBuf,
    pub extensions: Vec<String>,
    pub failure_policy: FailurePolicy,
}

impl SortConfig {
    /// Validates `source` and `destination` and fills in defaults.
    pub fn new(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let source = validate_directory(source.into())?;
        let destination = validate_directory(destination.into())?;
        let log_path = default_log_path().ok_or(ConfigError::NoLogLocation)?;

        Ok(Self {
            source,
            destination,
            log_path,
            extensions: SUPPORTED_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            failure_policy: FailurePolicy::default(),
        })
    }

    pub fn with_log_path(mut self, path: PathBuf) -> Self {
        self.log_path = path;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Replaces the accepted extensions. Values are lower-cased and any
    /// leading dot is dropped.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Whether `path` carries one of the accepted extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let lower = ext.to_lowercase();
                self.extensions.iter().any(|candidate| candidate == &lower)
            })
            .unwrap_or(false)
    }
}

/// Accepts `path` only if it names an existing directory.
pub fn validate_directory(path: PathBuf) -> Result<PathBuf, ConfigError> {
    if path.is_dir() {
        Ok(path)
    } else {
        Err(ConfigError::InvalidDirectory(path))
    }
}

/// `log.txt` beside the running executable, or under the local data
/// directory when the executable path is unknown.
pub fn default_log_path() -> Option<PathBuf> {
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(LOG_FILE_NAME)));
    beside_exe.or_else(|| {
        let mut dir = data_local_dir()?;
        dir.push("ShapeSort");
        dir.push(LOG_FILE_NAME);
        Some(dir)
    })
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    InvalidDirectory(PathBuf),
    NoLogLocation,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDirectory(path) => {
                write!(f, "'{}' is not a valid directory", path.display())
            }
            Self::NoLogLocation => write!(f, "unable to determine a location for the move log"),
        }
    }
}

impl Error for ConfigError {}
