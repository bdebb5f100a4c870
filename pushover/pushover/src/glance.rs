use crate::error::ValidationError;
use crate::message::{add_optional, check_length, Params};

/// Maximum characters of glance title, text and subtext. <https://pushover.net/api/glances#limits>
pub const MAX_GLANCE_TEXT: usize = 100;

/// Glance update pushed to a watch complication or widget. <https://pushover.net/api/glances>
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Glance<'a> {
    /// Overrides device of [`crate::Client`].
    pub device: Option<&'a str>,
    /// Description of the data being shown, such as "Widgets Sold".
    pub title: Option<&'a str>,
    /// Main line of data.
    pub text: Option<&'a str>,
    /// Second line of data.
    pub subtext: Option<&'a str>,
    /// Shown on smaller screens, may be negative.
    pub count: Option<i64>,
    /// Percentage in progress bars and circles, 0 to 100.
    pub percent: Option<u8>,
}

impl<'a> Glance<'a> {
    /// Validates fields and builds form parameters, token and user excluded.
    pub fn to_params(&self) -> Result<Params, ValidationError> {
        if self.title.is_none()
            && self.text.is_none()
            && self.subtext.is_none()
            && self.count.is_none()
            && self.percent.is_none()
        {
            return Err(ValidationError::EmptyGlance);
        }
        check_length("title", self.title, MAX_GLANCE_TEXT)?;
        check_length("text", self.text, MAX_GLANCE_TEXT)?;
        check_length("subtext", self.subtext, MAX_GLANCE_TEXT)?;
        if let Some(p) = self.percent.filter(|p| *p > 100) {
            return Err(ValidationError::PercentOutOfRange(p));
        }

        let mut params = Params::new();
        add_optional(&mut params, "device", self.device);
        add_optional(&mut params, "title", self.title);
        add_optional(&mut params, "text", self.text);
        add_optional(&mut params, "subtext", self.subtext);
        add_optional(&mut params, "count", self.count);
        add_optional(&mut params, "percent", self.percent);
        Ok(params)
    }
}
