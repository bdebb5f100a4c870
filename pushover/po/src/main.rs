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

//! po is a command line application based on Pushover API.
//!
//! If Pushover API token / key is "token" and user key is "user",
//!
//! ```
//! $ po -t token -u user message
//! ```
//!
//! Or you can set environment variables instead,
//!
//! ```
//! $ export PUSHOVER_TOKEN=token
//! $ export PUSHOVER_USER=user
//! $ po message
//! ```
//!
//! Or put them in `~/.pushoverrc`, another profile is picked with `--profile`,
//!
//! ```ini
//! [Default]
//! api_token=token
//! user_key=user
//! device=phone
//! ```
//!
//! For more information,
//!
//! ```
//! $ po -h
//! ```

use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use log::{debug, Level};
use logging_timer::{finish, stimer};

use pushover::{Attachment, Client, Message, Priority, Profile, Sound, DEFAULT_PROFILE};

#[doc(hidden)]
#[derive(Debug, Parser)]
#[clap(about, author, version)]
struct Opts {
    /// Your application's API token. <https://pushover.net/api#identifiers>
    #[clap(short, long, env = "PUSHOVER_TOKEN")]
    token: Option<String>,
    /// The user / group key (not e-mail address) of your user (or you). <https://pushover.net/api#identifiers>
    #[clap(short, long, env = "PUSHOVER_USER")]
    user: Option<String>,
    /// Your user's device name to send the message directly to that device, rather than all of the user's devices. <https://pushover.net/api#identifiers>
    #[clap(short, long)]
    device: Option<String>,
    /// Section of the configuration file to read token, user key and device from.
    #[clap(short = 'P', long, default_value = DEFAULT_PROFILE)]
    profile: String,
    /// Configuration file, ~/.pushoverrc if not given.
    #[clap(short, long)]
    config: Option<PathBuf>,
    /// Verbose.
    #[clap(short, long)]
    verbose: bool,
    /// Your message. <https://pushover.net/api#messages>
    #[clap(required_unless_present_any = ["verify", "cancel"])]
    message: Option<String>,
    /// Your message's title, otherwise your app's name is used. <https://pushover.net/api#messages>
    #[clap(long)]
    title: Option<String>,
    /// A supplementary URL to show with your message. <https://pushover.net/api#urls>
    #[clap(long)]
    url: Option<String>,
    /// A title for your supplementary URL, otherwise just the URL is shown. <https://pushover.net/api#urls>
    #[clap(long)]
    url_title: Option<String>,
    /// Messages may be sent with a different priority that affects how the message is presented to the user
    /// e.g. -2, -1, 0, 1, 2, lowest, low, normal, high, emergency. <https://pushover.net/api#priority>
    #[clap(short, long, allow_hyphen_values = true)]
    priority: Option<String>,
    /// Users can choose from a number of different default sounds to play when receiving notifications. <https://pushover.net/api#sounds>
    #[clap(short, long)]
    sound: Option<String>,
    /// A Unix timestamp of your message's date and time to display to the user, rather than the time your message is received by our API.
    /// Current time if not given. <https://pushover.net/api#timestamp>
    #[clap(long)]
    timestamp: Option<u64>,
    /// To enable HTML formatting. monospace may not be used if html is used, and vice versa. <https://pushover.net/api#html>
    #[clap(long, conflicts_with = "monospace")]
    html: bool,
    /// To enable monospace messages. monospace may not be used if html is used, and vice versa. <https://pushover.net/api#html>
    #[clap(long)]
    monospace: bool,
    /// Seconds before the message is deleted from devices. <https://pushover.net/api#ttl>
    #[clap(long)]
    ttl: Option<u32>,
    /// How often in seconds an emergency message is retried, at least 30. <https://pushover.net/api#priority>
    #[clap(short, long)]
    retry: Option<u32>,
    /// How many seconds an emergency message keeps being retried, at most 10800. <https://pushover.net/api#priority>
    #[clap(short, long)]
    expire: Option<u32>,
    /// URL requested when an emergency message is acknowledged. <https://pushover.net/api#priority>
    #[clap(long)]
    callback: Option<String>,
    /// Attach file as notification attachment.
    #[clap(short, long)]
    file: Option<PathBuf>,
    /// Verify user / group key (and device) instead of sending a message. <https://pushover.net/api/validate>
    #[clap(long, conflicts_with = "cancel")]
    verify: bool,
    /// Cancel retries of an emergency message by its receipt. <https://pushover.net/api/receipts#cancel>
    #[clap(long)]
    cancel: Option<String>,
}

impl Opts {
    fn client(&self) -> anyhow::Result<Client> {
        let profile = Profile::load(self.config.as_deref(), Some(&self.profile))?;
        let mut builder = Client::builder().profile(profile);
        if let Some(ref token) = self.token {
            builder = builder.token(token);
        }
        if let Some(ref user) = self.user {
            builder = builder.user(user);
        }
        if let Some(ref device) = self.device {
            builder = builder.device(device);
        }
        Ok(builder.build()?)
    }
}

fn load_attachment(opts: &Opts) -> anyhow::Result<Option<Attachment<'static>>> {
    use std::io::Read as _;

    if let Some(ref p) = opts.file {
        debug!("load attachment from {p:?}");
        Ok(Some(Attachment::from_path(p)?))
    } else if atty::isnt(atty::Stream::Stdin) {
        debug!("load attachment from standard input");
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        if buf.is_empty() {
            return Ok(None);
        }
        Ok(Some(Attachment::try_from(buf)?))
    } else {
        Ok(None)
    }
}

#[doc(hidden)]
fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let opts: Opts = Opts::parse();
    let client = opts.client()?;

    if opts.verify {
        let tmr = stimer!(Level::Debug; "VERIFY");
        let valid = client.verify(None)?;
        finish!(tmr);
        if !valid {
            bail!("user key {} is invalid", client.user());
        }
        println!("user key {} is valid", client.user());
        return Ok(());
    }

    if let Some(ref receipt) = opts.cancel {
        let tmr = stimer!(Level::Debug; "CANCEL");
        let res = client.cancel_receipt(receipt)?;
        finish!(tmr);
        if opts.verbose {
            println!("{res:?}");
        }
        return Ok(());
    }

    let text = opts.message.as_deref().unwrap_or_default();
    let mut message = Message::new(text);
    message.title = opts.title.as_deref();
    message.url = opts.url.as_deref();
    message.url_title = opts.url_title.as_deref();
    message.priority = opts.priority.as_deref().map(Priority::parse).transpose()?;
    message.sound = opts.sound.as_deref().map(Sound::parse).transpose()?;
    match opts.timestamp {
        Some(t) => message.timestamp = Some(t),
        None => {
            message.timestamp_now()?;
        }
    }
    message.html = opts.html;
    message.monospace = opts.monospace;
    message.ttl = opts.ttl;
    message.retry = opts.retry;
    message.expire = opts.expire;
    message.callback = opts.callback.as_deref();

    let attachment = load_attachment(&opts)?;
    message.attachment = attachment.as_ref();

    let tmr = stimer!(Level::Debug; "NOTIFY");
    let res = client.send_message(&message)?;
    finish!(tmr);

    if opts.verbose {
        println!("{res:?}");
    }
    Ok(())
}
