#![deny(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

//! Pushover is Pushover API wrapper with attachment, glance and receipt support in Rust 2021 edition.
//!
//! Every operation is one blocking HTTP request, without retry.
//!
//! ```rust,no_run
//! use pushover::{Client, Message, Priority, Profile};
//!
//! // token and user key from ~/.pushoverrc, [Default] section
//! let client = Client::builder().profile(Profile::load(None, None)?).build()?;
//!
//! let mut message = Message::new("disk almost full");
//! message.title = Some("backup");
//! message.priority = Some(Priority::High);
//! client.send_message(&message)?;
//! # Ok::<(), pushover::Error>(())
//! ```

pub use attachment::{Attachment, AttachmentError};
pub use client::{Client, ClientBuilder};
pub use config::{ConfigError, Profile, DEFAULT_PROFILE};
pub use error::{Error, ValidationError};
pub use glance::Glance;
pub use message::{Message, Params, Priority, Sound};
pub use response::{ReceiptStatus, Response};
pub use transport::{Reply, Transport, BASE_URL};

mod attachment;
mod client;
pub mod config;
mod error;
mod glance;
pub mod message;
mod response;
mod transport;

/// Shorthand function to send a message to a user or group.
/// ```no_run
/// use pushover::send_message;
/// send_message("token", "user", "message");
/// send_message("token", "group", "message");
/// ```
pub fn send_message(token: &str, user: &str, text: &str) -> Result<Response, Error> {
    Client::new(token, user).send_message(&Message::new(text))
}
