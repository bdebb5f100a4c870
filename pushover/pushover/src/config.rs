//! Profiles from the INI configuration file, `~/.pushoverrc` by default.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ini::Ini;
use log::debug;
use thiserror::Error;

/// Profile used when none is given.
pub const DEFAULT_PROFILE: &str = "Default";

/// Configuration file name under home directory.
pub const DEFAULT_CONFIG_FILE: &str = ".pushoverrc";

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but has no section with the given name.
    #[error("profile {profile:?} not found in {path:?}")]
    MissingProfile {
        /// Requested profile.
        profile: String,
        /// Configuration file looked up.
        path: PathBuf,
    },
    /// No API token from argument, default or profile.
    #[error("no API token given")]
    MissingToken,
    /// No user / group key from argument or profile.
    #[error("no user key given")]
    MissingUserKey,
    /// Home directory can not be determined for the default path.
    #[error("home directory not found")]
    NoHome,
    /// Error from [`ini`] crate.
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        /// Configuration file.
        path: PathBuf,
        /// Parser error.
        source: ini::ParseError,
    },
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings of one section in the configuration file e.g.
///
/// ```ini
/// [Default]
/// api_token=token
/// user_key=user
/// device=phone
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Profile {
    /// Application's API token.
    pub api_token: Option<String>,
    /// User / group key.
    pub user_key: Option<String>,
    /// Device name.
    pub device: Option<String>,
}

impl Profile {
    /// Merges field by field, values in `self` win over `fallback`.
    pub fn or(self, fallback: Profile) -> Profile {
        Profile {
            api_token: self.api_token.or(fallback.api_token),
            user_key: self.user_key.or(fallback.user_key),
            device: self.device.or(fallback.device),
        }
    }

    /// Reads `profile` from the configuration file at `path`.
    ///
    /// `~/.pushoverrc` is used if `path` is [`None`], [`DEFAULT_PROFILE`] if `profile` is [`None`].
    /// A missing file yields an empty [`Profile`].
    pub fn load(path: Option<&Path>, profile: Option<&str>) -> Result<Profile, ConfigError> {
        let path = match path {
            Some(p) => expand_path(p),
            None => default_config_path()?,
        };
        let profile = profile.unwrap_or(DEFAULT_PROFILE);
        debug!("load profile {profile} from {path:?}");

        let conf = match Ini::load_from_file(&path) {
            Ok(conf) => conf,
            Err(ini::Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
                debug!("{path:?} not found, skip");
                return Ok(Profile::default());
            }
            Err(ini::Error::Io(e)) => return Err(ConfigError::Io(e)),
            Err(ini::Error::Parse(source)) => return Err(ConfigError::Parse { path, source }),
        };
        Self::from_ini(&conf, profile).ok_or_else(|| ConfigError::MissingProfile {
            profile: profile.to_string(),
            path,
        })
    }

    fn from_ini(conf: &Ini, profile: &str) -> Option<Profile> {
        let section = conf.section(Some(profile))?;
        let get = |key: &str| section.get(key).map(String::from);
        Some(Profile {
            api_token: get("api_token"),
            user_key: get("user_key"),
            device: get("device"),
        })
    }
}

/// `~/.pushoverrc`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|h| h.join(DEFAULT_CONFIG_FILE))
        .ok_or(ConfigError::NoHome)
}

fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).as_ref()),
        None => path.to_path_buf(),
    }
}
