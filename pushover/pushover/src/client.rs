use std::collections::BTreeMap;

use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{ConfigError, Profile};
use crate::error::{Error, ValidationError};
use crate::glance::Glance;
use crate::message::{Message, Params};
use crate::response::{ReceiptStatus, Response, Sounds, Validation};
use crate::transport::{Reply, Transport};

/// Pushover client bound to one user / group key, reused across requests.
///
/// ```rust,no_run
/// # use pushover::{Client, Message};
/// let client = Client::new("token", "user");
/// client.send_message(&Message::new("hello"))?;
/// # Ok::<(), pushover::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    token: String,
    user: String,
    device: Option<String>,
    transport: Transport,
}

/// Builds [`Client`] from explicit values, a default token and a configuration [`Profile`].
///
/// Token is taken from [`ClientBuilder::token`], then [`ClientBuilder::default_token`],
/// then the profile. User key and device from explicit values, then the profile.
#[derive(Debug, Default)]
pub struct ClientBuilder {
    explicit: Profile,
    default_token: Option<String>,
    profile: Profile,
    transport: Option<Transport>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl ClientBuilder {
    /// Application's API token. <https://pushover.net/api#identifiers>
    pub fn token<T: Into<String>>(mut self, token: T) -> Self {
        self.explicit.api_token = Some(token.into());
        self
    }

    /// User / group key. <https://pushover.net/api#identifiers>
    pub fn user<T: Into<String>>(mut self, user: T) -> Self {
        self.explicit.user_key = Some(user.into());
        self
    }

    /// Device name to send messages directly to that device.
    pub fn device<T: Into<String>>(mut self, device: T) -> Self {
        self.explicit.device = Some(device.into());
        self
    }

    /// Token shared by clients of one application, used when no token is given explicitly.
    pub fn default_token<T: Into<String>>(mut self, token: T) -> Self {
        self.default_token = Some(token.into());
        self
    }

    /// Values loaded from the configuration file, see [`Profile::load`].
    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    #[doc(hidden)]
    pub fn transport(mut self, transport: Transport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Creates [`Client`], fails if token or user key can not be resolved.
    pub fn build(self) -> Result<Client, Error> {
        let resolved = Profile {
            api_token: non_empty(self.explicit.api_token).or(non_empty(self.default_token)),
            user_key: non_empty(self.explicit.user_key),
            device: non_empty(self.explicit.device),
        }
        .or(Profile {
            api_token: non_empty(self.profile.api_token),
            user_key: non_empty(self.profile.user_key),
            device: non_empty(self.profile.device),
        });
        let token = resolved.api_token.ok_or(ConfigError::MissingToken)?;
        let user = resolved.user_key.ok_or(ConfigError::MissingUserKey)?;
        Ok(Client {
            token,
            user,
            device: resolved.device,
            transport: self.transport.unwrap_or_default(),
        })
    }
}

fn decode<T: DeserializeOwned>(reply: Reply) -> Result<T, Error> {
    Ok(serde_json::from_value(Value::Object(reply))?)
}

/// Receipts are alphanumeric and end up in the request path.
fn check_receipt(receipt: &str) -> Result<(), ValidationError> {
    if receipt.is_empty() || !receipt.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidReceipt(receipt.to_string()));
    }
    Ok(())
}

impl Client {
    /// Creates a [`Client`] with token and user / group key.
    ///
    /// Instead of a user key, a group key may be supplied. Group keys look identical to
    /// user keys and from your application's perspective, you do not need to distinguish between them.
    pub fn new<T: Into<String>>(token: T, user: T) -> Self {
        Self {
            token: token.into(),
            user: user.into(),
            device: None,
            transport: Transport::new(),
        }
    }

    /// See [`ClientBuilder`].
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// User / group key.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Device name, if bound to one.
    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    fn identified(&self, device: Option<&str>) -> Params {
        let mut params = Params::new();
        params.insert("token", self.token.clone());
        params.insert("user", self.user.clone());
        if let Some(d) = device.or(self.device.as_deref()) {
            params.insert("device", d.to_string());
        }
        params
    }

    fn authorized(&self) -> Params {
        let mut params = Params::new();
        params.insert("token", self.token.clone());
        params
    }

    /// Pushover replies HTTP 200 on success, but double check `status`.
    fn accepted(reply: Reply) -> Result<Reply, Error> {
        if reply.get("status").and_then(Value::as_i64) == Some(1) {
            return Ok(reply);
        }
        let errors = reply
            .get("errors")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        Err(Error::Request {
            status: 200,
            errors,
        })
    }

    /// Sends [`Message`] to the user / group. <https://pushover.net/api#messages>
    pub fn send_message(&self, message: &Message<'_>) -> Result<Response, Error> {
        let mut params = self.identified(None);
        params.extend(message.to_params()?);
        let reply = self
            .transport
            .post("messages.json", &params, message.attachment)?;
        decode(Self::accepted(reply)?)
    }

    /// Sends [`Glance`] to the user / group. <https://pushover.net/api/glances>
    pub fn send_glance(&self, glance: &Glance<'_>) -> Result<Response, Error> {
        let mut params = self.identified(None);
        params.extend(glance.to_params()?);
        let reply = self.transport.post("glances.json", &params, None)?;
        decode(Self::accepted(reply)?)
    }

    /// Active devices of the user, [`None`] if user / group key (or device) is invalid.
    /// <https://pushover.net/api/validate>
    pub fn devices(&self, device: Option<&str>) -> Result<Option<Vec<String>>, Error> {
        let params = self.identified(device);
        match self.transport.post("users/validate.json", &params, None) {
            Ok(reply) => {
                let validation: Validation = decode(Self::accepted(reply)?)?;
                Ok(Some(validation.devices))
            }
            Err(Error::Request { status, errors }) if (400..500).contains(&status) => {
                debug!("user is invalid: {errors:?}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Whether user / group key (and device) is valid.
    pub fn verify(&self, device: Option<&str>) -> Result<bool, Error> {
        Ok(self.devices(device)?.is_some())
    }

    /// Stops retries of an emergency priority message. <https://pushover.net/api/receipts#cancel>
    pub fn cancel_receipt(&self, receipt: &str) -> Result<Response, Error> {
        check_receipt(receipt)?;
        let path = format!("receipts/{receipt}/cancel.json");
        let reply = self.transport.post(&path, &self.authorized(), None)?;
        decode(Self::accepted(reply)?)
    }

    /// Polls status of an emergency priority message. <https://pushover.net/api/receipts#receipt>
    pub fn poll_receipt(&self, receipt: &str) -> Result<ReceiptStatus, Error> {
        check_receipt(receipt)?;
        let path = format!("receipts/{receipt}.json");
        let reply = self.transport.get(&path, &self.authorized())?;
        decode(Self::accepted(reply)?)
    }

    /// Sounds available to the application, name to description. <https://pushover.net/api#sounds>
    pub fn sounds(&self) -> Result<BTreeMap<String, String>, Error> {
        let reply = self.transport.get("sounds.json", &self.authorized())?;
        let sounds: Sounds = decode(Self::accepted(reply)?)?;
        Ok(sounds.sounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mockito::{Matcher, Server, ServerGuard};

    use crate::message::Priority;

    const OK: &str = r#"{"status":1,"request":"00000000-0000-0000-0000-000000000000"}"#;

    fn build_client(server: &ServerGuard) -> Client {
        Client::builder()
            .token("token")
            .user("user")
            .transport(Transport::with_base_url(format!("{}/1", server.url())))
            .build()
            .unwrap()
    }

    #[test]
    fn t_builder_precedence() -> Result<(), Error> {
        let profile = Profile {
            api_token: Some("file-token".to_string()),
            user_key: Some("file-user".to_string()),
            device: Some("file-device".to_string()),
        };

        let c = Client::builder().profile(profile.clone()).build()?;
        assert_eq!("file-token", c.token);
        assert_eq!("file-user", c.user());
        assert_eq!(Some("file-device"), c.device());

        let c = Client::builder()
            .default_token("default-token")
            .profile(profile.clone())
            .build()?;
        assert_eq!("default-token", c.token);

        let c = Client::builder()
            .token("token")
            .default_token("default-token")
            .user("user")
            .device("device")
            .profile(profile)
            .build()?;
        assert_eq!("token", c.token);
        assert_eq!("user", c.user());
        assert_eq!(Some("device"), c.device());
        Ok(())
    }

    #[test]
    fn t_builder_missing_token() {
        let err = Client::builder().user("user").build().unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigError::MissingToken)
        ));

        // empty values do not count
        let err = Client::builder().token("").user("user").build().unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigError::MissingToken)
        ));

        let err = Client::builder().token("token").build().unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigError::MissingUserKey)
        ));
    }

    #[test]
    fn t_send_message() -> Result<(), Error> {
        let mut server = Server::new();
        let m = server
            .mock("POST", "/1/messages.json")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("token".into(), "token".into()),
                Matcher::UrlEncoded("user".into(), "user".into()),
                Matcher::UrlEncoded("message".into(), "message".into()),
                Matcher::UrlEncoded("title".into(), "title".into()),
            ]))
            .with_status(200)
            .with_body(OK)
            .create();

        let mut message = Message::new("message");
        message.title = Some("title");
        let res = build_client(&server).send_message(&message)?;
        assert_eq!(1, res.status);
        assert_eq!("00000000-0000-0000-0000-000000000000", res.request);
        assert!(res.errors.is_none());
        m.assert();
        Ok(())
    }

    #[test]
    fn t_device() -> Result<(), Error> {
        let mut server = Server::new();
        let m = server
            .mock("POST", "/1/messages.json")
            .match_body(Matcher::UrlEncoded("device".into(), "phone".into()))
            .with_status(200)
            .with_body(OK)
            .create();

        let client = Client::builder()
            .token("token")
            .user("user")
            .device("laptop")
            .transport(Transport::with_base_url(format!("{}/1", server.url())))
            .build()?;
        let mut message = Message::new("message");
        message.device = Some("phone");
        client.send_message(&message)?;
        m.assert();
        Ok(())
    }

    #[test]
    fn t_emergency_receipt() -> Result<(), Error> {
        let mut server = Server::new();
        let _m = server
            .mock("POST", "/1/messages.json")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("priority".into(), "2".into()),
                Matcher::UrlEncoded("retry".into(), "30".into()),
                Matcher::UrlEncoded("expire".into(), "3600".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"status":1,"request":"r1","receipt":"rLqVuqTRh62UzxtmqiaLzQmVcPgiCy"}"#)
            .create();

        let mut message = Message::new("message");
        message.priority = Some(Priority::Emergency);
        message.retry = Some(30);
        message.expire = Some(3600);
        let res = build_client(&server).send_message(&message)?;
        assert_eq!(Some("rLqVuqTRh62UzxtmqiaLzQmVcPgiCy".to_string()), res.receipt);
        Ok(())
    }

    #[test]
    fn t_validation_before_request() {
        let mut server = Server::new();
        let m = server
            .mock("POST", "/1/messages.json")
            .expect(0)
            .create();

        let mut message = Message::new("message");
        message.html = true;
        message.monospace = true;
        let err = build_client(&server).send_message(&message).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::HTMLMonospace)
        ));
        m.assert();
    }

    #[test]
    fn t_rejected() {
        let mut server = Server::new();
        let _m = server
            .mock("POST", "/1/messages.json")
            .with_status(400)
            .with_body(r#"{"status":0,"user":"invalid","errors":["user identifier is invalid"],"request":"r1"}"#)
            .create();

        let err = build_client(&server)
            .send_message(&Message::new("message"))
            .unwrap_err();
        assert!(
            matches!(err, Error::Request { status: 400, ref errors } if errors == &["user identifier is invalid".to_string()])
        );
    }

    #[test]
    fn t_status_not_one() {
        let mut server = Server::new();
        let _m = server
            .mock("POST", "/1/messages.json")
            .with_status(200)
            .with_body(r#"{"status":0,"errors":["oops"],"request":"r1"}"#)
            .create();

        let err = build_client(&server)
            .send_message(&Message::new("message"))
            .unwrap_err();
        assert!(matches!(err, Error::Request { status: 200, .. }));
    }

    #[test]
    fn t_send_glance() -> Result<(), Error> {
        let mut server = Server::new();
        let m = server
            .mock("POST", "/1/glances.json")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("user".into(), "user".into()),
                Matcher::UrlEncoded("percent".into(), "42".into()),
            ]))
            .with_status(200)
            .with_body(OK)
            .create();

        let glance = Glance {
            percent: Some(42),
            ..Default::default()
        };
        let res = build_client(&server).send_glance(&glance)?;
        assert_eq!(1, res.status);
        m.assert();
        Ok(())
    }

    #[test]
    fn t_verify() -> Result<(), Error> {
        let mut server = Server::new();
        let _valid = server
            .mock("POST", "/1/users/validate.json")
            .match_body(Matcher::UrlEncoded("device".into(), "phone".into()))
            .with_status(200)
            .with_body(r#"{"status":1,"group":0,"devices":["phone","tablet"],"request":"r1"}"#)
            .create();
        let _invalid = server
            .mock("POST", "/1/users/validate.json")
            .match_body(Matcher::UrlEncoded("device".into(), "toaster".into()))
            .with_status(400)
            .with_body(r#"{"status":0,"device":"invalid for this user","errors":["device name is not valid for user"],"request":"r2"}"#)
            .create();

        let client = build_client(&server);
        assert!(client.verify(Some("phone"))?);
        assert_eq!(
            Some(vec!["phone".to_string(), "tablet".to_string()]),
            client.devices(Some("phone"))?
        );
        assert!(!client.verify(Some("toaster"))?);
        Ok(())
    }

    #[test]
    fn t_verify_server_error() {
        let mut server = Server::new();
        let _m = server
            .mock("POST", "/1/users/validate.json")
            .with_status(500)
            .with_body("internal error")
            .create();

        let err = build_client(&server).verify(None).unwrap_err();
        assert!(matches!(err, Error::Request { status: 500, .. }));
    }

    #[test]
    fn t_cancel_receipt() -> Result<(), Error> {
        let mut server = Server::new();
        let m = server
            .mock("POST", "/1/receipts/rcpt123/cancel.json")
            .match_body(Matcher::UrlEncoded("token".into(), "token".into()))
            .with_status(200)
            .with_body(OK)
            .create();

        let client = build_client(&server);
        client.cancel_receipt("rcpt123")?;
        m.assert();

        let err = client.cancel_receipt("../messages").unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidReceipt(_))
        ));
        Ok(())
    }

    #[test]
    fn t_poll_receipt() -> Result<(), Error> {
        let mut server = Server::new();
        let _m = server
            .mock("GET", "/1/receipts/rcpt123.json")
            .match_query(Matcher::UrlEncoded("token".into(), "token".into()))
            .with_status(200)
            .with_body(r#"{"status":1,"acknowledged":1,"acknowledged_at":1360843200,"acknowledged_by":"user","acknowledged_by_device":"phone","last_delivered_at":1360843180,"expired":0,"expires_at":1360846780,"called_back":0,"called_back_at":0,"request":"r1"}"#)
            .create();

        let status = build_client(&server).poll_receipt("rcpt123")?;
        assert!(status.is_done());
        assert_eq!("user", status.acknowledged_by);
        Ok(())
    }

    #[test]
    fn t_sounds() -> Result<(), Error> {
        let mut server = Server::new();
        let _m = server
            .mock("GET", "/1/sounds.json")
            .match_query(Matcher::UrlEncoded("token".into(), "token".into()))
            .with_status(200)
            .with_body(r#"{"sounds":{"bike":"Bike","pushover":"Pushover (default)"},"status":1,"request":"r1"}"#)
            .create();

        let sounds = build_client(&server).sounds()?;
        assert_eq!(2, sounds.len());
        assert_eq!(Some(&"Bike".to_string()), sounds.get("bike"));
        Ok(())
    }
}
