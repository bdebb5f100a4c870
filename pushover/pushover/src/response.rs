use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Pushover API response. <https://pushover.net/api#response>
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Response {
    /// If POST request to API was valid, we will receive an HTTP 200 (OK) status, with a JSON object containing a status code of `1`.
    pub status: u8,
    /// The `request` parameter returned from all API calls is a randomly-generated unique token that we have associated with your request.
    pub request: String,
    /// Returned for emergency priority, used to poll or cancel the retries. <https://pushover.net/api/receipts>
    #[serde(default)]
    pub receipt: Option<String>,
    /// ...and an `errors` array detailing which parameters were invalid.
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

/// User / group key validation response. <https://pushover.net/api/validate>
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub(crate) struct Validation {
    #[serde(default)]
    pub(crate) devices: Vec<String>,
}

/// Sounds response. <https://pushover.net/api#sounds>
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub(crate) struct Sounds {
    pub(crate) sounds: BTreeMap<String, String>,
}

/// Status of an emergency priority message. <https://pushover.net/api/receipts#receipt>
///
/// Flags are `1` once set, timestamps are Unix timestamps or `0`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReceiptStatus {
    /// Whether the user has acknowledged the notification.
    pub acknowledged: u8,
    /// When the user acknowledged the notification.
    pub acknowledged_at: i64,
    /// User key of the user that first acknowledged the notification.
    pub acknowledged_by: String,
    /// Device name of the user that first acknowledged the notification.
    pub acknowledged_by_device: String,
    /// When the notification was last retried.
    pub last_delivered_at: i64,
    /// Whether the expiration date has passed.
    pub expired: u8,
    /// When the notification stops being retried.
    pub expires_at: i64,
    /// Whether callback URL has been called.
    pub called_back: u8,
    /// When callback URL was called.
    pub called_back_at: i64,
}

impl ReceiptStatus {
    /// No more retries once acknowledged, expired or called back.
    pub fn is_done(&self) -> bool {
        self.acknowledged == 1 || self.expired == 1 || self.called_back == 1
    }
}
