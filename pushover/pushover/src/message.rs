//! Message fields, validation and form parameters. <https://pushover.net/api#messages>

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::str::FromStr as _;
use std::time::{SystemTime, SystemTimeError, UNIX_EPOCH};

use log::debug;
use url::Url;

use crate::attachment::Attachment;
use crate::error::ValidationError;

/// Maximum characters of message. <https://pushover.net/api#limits>
pub const MAX_MESSAGE: usize = 1024;
/// Maximum characters of title.
pub const MAX_TITLE: usize = 100;
/// Maximum characters of supplementary URL.
pub const MAX_URL: usize = 512;
/// Maximum characters of URL title.
pub const MAX_URL_TITLE: usize = 100;
/// Minimum retry interval in seconds for emergency priority. <https://pushover.net/api#priority>
pub const MIN_RETRY: u32 = 30;
/// Maximum expire in seconds for emergency priority.
pub const MAX_EXPIRE: u32 = 10800;

/// Form parameters sent to Pushover, keyed by wire name.
pub type Params = BTreeMap<&'static str, String>;

/// Messages may be sent with a different priority
/// that affects how the message is presented to the user. <https://pushover.net/api#priority>
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumString)]
pub enum Priority {
    /// Normal (default)
    #[strum(to_string = "0", serialize = "normal")]
    Normal,
    /// Lowest
    #[strum(to_string = "-2", serialize = "lowest")]
    Lowest,
    /// Low
    #[strum(to_string = "-1", serialize = "low")]
    Low,
    /// High
    #[strum(to_string = "1", serialize = "high")]
    High,
    /// Emergency
    #[strum(to_string = "2", serialize = "emergency")]
    Emergency,
}

impl Priority {
    /// Parses name (e.g. `high`) or wire value (e.g. `1`).
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        Self::from_str(s).map_err(|_e| ValidationError::UnknownPriority(s.to_string()))
    }
}

/// Users can choose from a number of different default sounds
/// to play when receiving notifications. <https://pushover.net/api#sounds>
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Sound {
    /// pushover - Pushover (default)
    Pushover,
    /// bike - Bike
    Bike,
    /// bugle - Bugle
    Bugle,
    /// cashregister - Cash Register
    CashRegister,
    /// classical - Classical
    Classical,
    /// cosmic - Cosmic
    Cosmic,
    /// falling - Falling
    Falling,
    /// gamelan - Gamelan
    GameLan,
    /// incoming - Incoming
    Incoming,
    /// intermission - Intermission
    Intermission,
    /// magic - Magic
    Magic,
    /// mechanical - Mechanical
    Mechanical,
    /// pianobar - Piano Bar
    PianoBar,
    /// siren - Siren
    Siren,
    /// spacealarm - Space Alarm
    SpaceAlarm,
    /// tugboat - Tug Boat
    Tugboat,
    /// alien - Alien Alarm (long)
    Alien,
    /// climb - Climb (long)
    Climb,
    /// persistent - Persistent (long)
    Persistent,
    /// echo - Pushover Echo (long)
    Echo,
    /// updown - Up Down (long)
    UpDown,
    /// vibrate - Vibrate Only
    Vibrate,
    /// none - None (silent)
    None,
}

impl Sound {
    /// Parses sound name e.g. `cashregister`.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        Self::from_str(s).map_err(|_e| ValidationError::UnknownSound(s.to_string()))
    }
}

/// Pushover message parameters <https://pushover.net/api#messages> and attachment.
///
/// Token and user / group key are bound to [`crate::Client`].
#[derive(Default, Debug)]
pub struct Message<'a> {
    text: Cow<'a, str>,
    /// Overrides device of [`crate::Client`]. <https://pushover.net/api#identifiers>
    pub device: Option<&'a str>,
    /// Your message's title, otherwise your app's name is used. <https://pushover.net/api#messages>
    pub title: Option<&'a str>,
    /// A supplementary URL to show with your message. <https://pushover.net/api#urls>
    pub url: Option<&'a str>,
    /// A title for your supplementary URL,
    /// otherwise just the URL is shown. <https://pushover.net/api#urls>
    pub url_title: Option<&'a str>,
    /// Messages may be sent with a different priority that affects
    /// how the message is presented to the user. <https://pushover.net/api#priority>
    pub priority: Option<Priority>,
    /// Users can choose from a number of different default sounds
    /// to play when receiving notifications. <https://pushover.net/api#sounds>
    pub sound: Option<Sound>,
    /// A Unix timestamp of your message's date and time to display to the user. <https://pushover.net/api#timestamp>
    pub timestamp: Option<u64>,
    /// To enable HTML formatting. <https://pushover.net/api#html>
    pub html: bool,
    /// To enable monospace messages. <https://pushover.net/api#html>
    pub monospace: bool,
    /// Seconds before the message is deleted from devices. <https://pushover.net/api#ttl>
    pub ttl: Option<u32>,
    /// URL requested when an emergency message is acknowledged.
    pub callback: Option<&'a str>,
    /// How often in seconds an emergency message is retried.
    pub retry: Option<u32>,
    /// How many seconds an emergency message keeps being retried.
    pub expire: Option<u32>,
    /// Optional [`Attachment`].
    pub attachment: Option<&'a Attachment<'a>>,
}

pub(crate) fn check_length(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    if let Some(v) = value {
        let actual = v.chars().count();
        if actual > max {
            return Err(ValidationError::TooLong { field, max, actual });
        }
    }
    Ok(())
}

pub(crate) fn add_optional<T: ToString>(params: &mut Params, name: &'static str, value: Option<T>) {
    if let Some(v) = value {
        params.insert(name, v.to_string());
    }
}

impl<'a> Message<'a> {
    /// Creates a [`Message`].
    ///
    /// ```rust
    /// # use pushover::{Message, Priority};
    /// let mut message = Message::new("backup finished");
    /// message.title = Some("cron");
    /// message.priority = Some(Priority::Low);
    /// ```
    pub fn new<T>(text: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Sets [`Message::timestamp`] to the current Unix time.
    pub fn timestamp_now(&mut self) -> Result<&mut Self, SystemTimeError> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?;
        self.timestamp = Some(now.as_secs());
        Ok(self)
    }

    /// Message body.
    pub fn text(&self) -> &str {
        self.text.as_ref()
    }

    /// Validates fields and builds form parameters, token and user excluded.
    ///
    /// Retry, expire and callback are dropped unless priority is emergency.
    pub fn to_params(&self) -> Result<Params, ValidationError> {
        check_length("message", Some(self.text()), MAX_MESSAGE)?;
        check_length("title", self.title, MAX_TITLE)?;
        check_length("url", self.url, MAX_URL)?;
        check_length("url_title", self.url_title, MAX_URL_TITLE)?;

        // HTML and monospace are mutually exclusive <https://pushover.net/api#html>
        if self.html && self.monospace {
            return Err(ValidationError::HTMLMonospace);
        }
        if self.ttl == Some(0) {
            return Err(ValidationError::ZeroTTL);
        }

        let mut params = Params::new();
        params.insert("message", self.text.to_string());
        add_optional(&mut params, "device", self.device);
        add_optional(&mut params, "title", self.title);
        add_optional(&mut params, "url", self.url);
        add_optional(&mut params, "url_title", self.url_title);
        add_optional(&mut params, "priority", self.priority);
        add_optional(&mut params, "sound", self.sound);
        add_optional(&mut params, "timestamp", self.timestamp);
        add_optional(&mut params, "ttl", self.ttl);
        add_optional(&mut params, "html", self.html.then_some(1));
        add_optional(&mut params, "monospace", self.monospace.then_some(1));

        if self.priority == Some(Priority::Emergency) {
            let (retry, expire) = match (self.retry, self.expire) {
                (Some(r), Some(e)) => (r, e),
                _ => return Err(ValidationError::MissingRetryExpire),
            };
            if retry < MIN_RETRY {
                return Err(ValidationError::RetryTooShort {
                    min: MIN_RETRY,
                    actual: retry,
                });
            }
            if expire > MAX_EXPIRE {
                return Err(ValidationError::ExpireTooLong {
                    max: MAX_EXPIRE,
                    actual: expire,
                });
            }
            if let Some(c) = self.callback {
                Url::parse(c).map_err(|_e| ValidationError::InvalidCallback(c.to_string()))?;
            }
            params.insert("retry", retry.to_string());
            params.insert("expire", expire.to_string());
            add_optional(&mut params, "callback", self.callback);
        } else if self.retry.is_some() || self.expire.is_some() || self.callback.is_some() {
            debug!("retry, expire and callback are only sent with emergency priority, dropped");
        }

        Ok(params)
    }
}
