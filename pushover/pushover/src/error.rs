use thiserror::Error;

use crate::attachment::AttachmentError;
use crate::config::ConfigError;

/// Pushover error.
#[derive(Error, Debug)]
pub enum Error {
    /// No usable token or user key, or the configuration file could not be used.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    /// Message, glance or receipt fields rejected before any request is made.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    /// Pushover rejected the request. <https://pushover.net/api#response>
    #[error("request rejected with HTTP {status}: {}", .errors.join(", "))]
    Request {
        /// HTTP status code.
        status: u16,
        /// `errors` array from the response body.
        errors: Vec<String>,
    },
    /// Network level failure from [`ureq`] crate e.g. DNS, connection refused or timeout.
    #[error("transport error: {0}")]
    Transport(#[from] Box<ureq::Transport>),
    /// Error from [`serde_json`] crate.
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
    /// Wrapped [`crate::AttachmentError`].
    #[error("attachment error: {0}")]
    Attachment(#[from] AttachmentError),
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Field level validation error, raised before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Text field exceeds the documented limit. <https://pushover.net/api#limits>
    #[error("{field} is {actual} characters long, at most {max} allowed")]
    TooLong {
        /// Field name on the wire.
        field: &'static str,
        /// Documented limit.
        max: usize,
        /// Actual character count.
        actual: usize,
    },
    /// Not one of lowest, low, normal, high or emergency.
    #[error("unknown priority: {0}")]
    UnknownPriority(String),
    /// Not one of the sounds listed in <https://pushover.net/api#sounds>.
    #[error("unknown sound: {0}")]
    UnknownSound(String),
    /// HTML and monospace are mutually exclusive. <https://pushover.net/api#html>
    #[error("html and monospace are mutually exclusive")]
    HTMLMonospace,
    /// Emergency priority requires both retry and expire.
    #[error("emergency priority requires retry and expire")]
    MissingRetryExpire,
    /// Retry below 30 seconds.
    #[error("retry must be at least {min} seconds, got {actual}")]
    RetryTooShort {
        /// Lower bound in seconds.
        min: u32,
        /// Given value.
        actual: u32,
    },
    /// Expire above 10800 seconds.
    #[error("expire must be at most {max} seconds, got {actual}")]
    ExpireTooLong {
        /// Upper bound in seconds.
        max: u32,
        /// Given value.
        actual: u32,
    },
    /// Callback is not an absolute URL.
    #[error("invalid callback URL {0}")]
    InvalidCallback(String),
    /// TTL must be a positive number of seconds.
    #[error("ttl must be positive")]
    ZeroTTL,
    /// Glance percent above 100.
    #[error("percent must be between 0 and 100, got {0}")]
    PercentOutOfRange(u8),
    /// Glance without any field.
    #[error("glance must contain at least one field")]
    EmptyGlance,
    /// Receipt is empty or contains characters other than ASCII letters and digits.
    #[error("invalid receipt {0:?}")]
    InvalidReceipt(String),
}
