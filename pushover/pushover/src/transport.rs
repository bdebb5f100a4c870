use std::io::Cursor;
use std::time::Duration;

use log::debug;
use multipart::client::lazy::Multipart;
use serde_json::{Map, Value};

use crate::attachment::Attachment;
use crate::error::Error;
use crate::message::Params;

/// Pushover API base URL. <https://pushover.net/api>
pub const BASE_URL: &str = "https://api.pushover.net/1";

/// Timeout of every request, not configurable.
pub const TIMEOUT: Duration = Duration::from_secs(30);

/// Decoded JSON body of a Pushover response.
pub type Reply = Map<String, Value>;

/// Blocking HTTP transport, one request per call and no retry.
#[derive(Clone, Debug)]
pub struct Transport {
    agent: ureq::Agent,
    base_url: String,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport {
    /// Creates a [`Transport`] against [`BASE_URL`].
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    #[doc(hidden)]
    pub fn with_base_url<T: Into<String>>(base_url: T) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(TIMEOUT).build(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{0}/{path}", self.base_url)
    }

    /// POST form-encoded `params` to `path`, or multipart form if `attachment` is given.
    pub fn post(
        &self,
        path: &str,
        params: &Params,
        attachment: Option<&Attachment<'_>>,
    ) -> Result<Reply, Error> {
        let url = self.url(path);
        debug!("POST {url}");
        let request = self.agent.post(&url);
        let result = match attachment {
            None => {
                let form: Vec<(&str, &str)> =
                    params.iter().map(|(k, v)| (*k, v.as_str())).collect();
                request.send_form(&form)
            }
            Some(a) => {
                let mut form = Multipart::new();
                for (k, v) in params {
                    form.add_text(*k, v.as_str());
                }
                form.add_stream(
                    "attachment",
                    Cursor::new(&a.content),
                    Some(a.filename.as_ref()),
                    Some(a.mime.clone()),
                );
                let form = form.prepare().map_err(|e| e.error)?;
                let content_type = format!("multipart/form-data; boundary={}", form.boundary());
                request.set("Content-Type", &content_type).send(form)
            }
        };
        read_reply(result)
    }

    /// GET `path` with `query`.
    pub fn get(&self, path: &str, query: &Params) -> Result<Reply, Error> {
        let url = self.url(path);
        debug!("GET {url}");
        let request = query
            .iter()
            .fold(self.agent.get(&url), |r, (k, v)| r.query(k, v));
        read_reply(request.call())
    }
}

fn read_reply(result: Result<ureq::Response, ureq::Error>) -> Result<Reply, Error> {
    match result {
        Ok(response) => {
            let body = response.into_string()?;
            Ok(serde_json::from_str(&body)?)
        }
        Err(ureq::Error::Status(status, response)) => {
            let body = response.into_string()?;
            debug!("HTTP {status}: {body}");
            Err(Error::Request {
                status,
                errors: errors_of(&body),
            })
        }
        Err(ureq::Error::Transport(t)) => Err(Error::Transport(Box::new(t))),
    }
}

/// `errors` array of a JSON body, the raw body if it is not one.
fn errors_of(body: &str) -> Vec<String> {
    let parsed: Option<Vec<String>> = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("errors").cloned())
        .and_then(|v| serde_json::from_value(v).ok());
    match parsed {
        Some(errors) => errors,
        None if body.is_empty() => Vec::new(),
        None => vec![body.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::str::FromStr as _;

    use mime::Mime;
    use mockito::{Matcher, Server};

    fn transport(server: &Server) -> Transport {
        Transport::with_base_url(format!("{}/1", server.url()))
    }

    #[test]
    fn t_post_ok() -> Result<(), Error> {
        let mut server = Server::new();
        let m = server
            .mock("POST", "/1/messages.json")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("token".into(), "token".into()),
                Matcher::UrlEncoded("message".into(), "hello world".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"status":1,"request":"r1"}"#)
            .create();

        let mut params = Params::new();
        params.insert("token", "token".to_string());
        params.insert("message", "hello world".to_string());
        let reply = transport(&server).post("messages.json", &params, None)?;

        let expected: Reply = serde_json::from_str(r#"{"status":1,"request":"r1"}"#)?;
        assert_eq!(expected, reply);
        m.assert();
        Ok(())
    }

    #[test]
    fn t_post_rejected() {
        let mut server = Server::new();
        let _m = server
            .mock("POST", "/1/messages.json")
            .with_status(400)
            .with_body(r#"{"status":0,"errors":["invalid key"]}"#)
            .create();

        let err = transport(&server)
            .post("messages.json", &Params::new(), None)
            .unwrap_err();
        match err {
            Error::Request { status, errors } => {
                assert_eq!(400, status);
                assert_eq!(vec!["invalid key".to_string()], errors);
            }
            e => panic!("unexpected error {e:?}"),
        }
    }

    #[test]
    fn t_server_error_without_json() {
        let mut server = Server::new();
        let _m = server
            .mock("POST", "/1/messages.json")
            .with_status(502)
            .with_body("bad gateway")
            .create();

        let err = transport(&server)
            .post("messages.json", &Params::new(), None)
            .unwrap_err();
        assert!(
            matches!(err, Error::Request { status: 502, ref errors } if errors == &["bad gateway".to_string()])
        );
    }

    #[test]
    fn t_connection_refused() {
        // nothing listens on port 1
        let t = Transport::with_base_url("http://127.0.0.1:1/1");
        let err = t.post("messages.json", &Params::new(), None).unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[test]
    fn t_post_multipart() -> Result<(), Error> {
        let mut server = Server::new();
        let m = server
            .mock("POST", "/1/messages.json")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".to_string()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="attachment""#.to_string()),
                Matcher::Regex(r#"filename="note.txt""#.to_string()),
                Matcher::Regex("attached note".to_string()),
            ]))
            .with_status(200)
            .with_body(r#"{"status":1,"request":"r2"}"#)
            .create();

        let a = Attachment::new(
            "note.txt",
            Mime::from_str("text/plain").unwrap(),
            b"attached note",
        );
        let mut params = Params::new();
        params.insert("message", "message".to_string());
        let reply = transport(&server).post("messages.json", &params, Some(&a))?;
        assert_eq!(Some("r2"), reply.get("request").and_then(Value::as_str));
        m.assert();
        Ok(())
    }

    #[test]
    fn t_get() -> Result<(), Error> {
        let mut server = Server::new();
        let m = server
            .mock("GET", "/1/sounds.json")
            .match_query(Matcher::UrlEncoded("token".into(), "token".into()))
            .with_status(200)
            .with_body(r#"{"status":1,"request":"r3","sounds":{"bike":"Bike"}}"#)
            .create();

        let mut query = Params::new();
        query.insert("token", "token".to_string());
        let reply = transport(&server).get("sounds.json", &query)?;
        assert_eq!(Some(&Value::from(1)), reply.get("status"));
        m.assert();
        Ok(())
    }
}
