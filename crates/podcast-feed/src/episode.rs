// crates/podcast-feed/src/episode.rs
//! A single podcast episode and its `<item>` rendering

use crate::date::{format_rfc2822, parse_date};
use crate::error::{FeedError, FeedResult};
use crate::value::{Fields, Resolver, Value};
use crate::xml::XmlElement;
use chrono::{DateTime, FixedOffset};

/// One published episode
///
/// All text fields except the descriptions are escaped at construction.
/// The plain and rich descriptions are kept verbatim and rendered as CDATA.
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    title: String,
    subtitle: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    content_encoded: Option<String>,
    link: Option<String>,
    pub_date: DateTime<FixedOffset>,
    url: String,
    mime_type: String,
    length: String,
    guid: String,
    is_perma_link: Option<String>,
    duration: String,
    explicit: bool,
    author: Option<String>,
    season: Option<u32>,
    episode: Option<u32>,
    image: Option<String>,
}

impl Episode {
    /// Builds an episode from its fields, falling back to `defaults`
    ///
    /// # Errors
    ///
    /// - [`FeedError::MissingField`] if a required field has no value
    /// - [`FeedError::InvalidDate`] if `publish_at` cannot be parsed
    pub fn from_fields(data: &Fields, defaults: &Fields) -> FeedResult<Self> {
        let r = Resolver::new(data, defaults);

        let pub_date = match r.value("publish_at") {
            Some(value) => publish_date(&value)?,
            None => return Err(FeedError::MissingField("publish_at".to_string())),
        };

        let duration = r.text("duration")?;
        if !is_itunes_duration(&duration) {
            log::warn!(
                "Episode duration '{}' is not in HH:MM:SS, MM:SS or seconds form",
                duration
            );
        }

        Ok(Self {
            title: r.text("title")?,
            subtitle: r.optional_text("subtitle")?,
            summary: r.optional_text("summary")?,
            description: r.raw_text("description")?,
            content_encoded: r.raw_text("content_encoded")?,
            link: r.optional_text("link")?,
            pub_date,
            url: r.text("url")?,
            mime_type: r.text("type")?,
            length: r.text("length")?,
            guid: r.text("guid")?,
            is_perma_link: r.optional_text("isPermaLink")?,
            duration,
            explicit: is_explicit(r.value("explicit").as_ref()),
            author: r.optional_text("author")?,
            season: positive_number(&r, "feed_season"),
            episode: positive_number(&r, "feed_episode"),
            image: r.optional_text("image")?,
        })
    }

    /// Escaped episode title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Escaped subtitle, if any
    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    /// Escaped summary, if any
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Publication date
    pub fn pub_date(&self) -> DateTime<FixedOffset> {
        self.pub_date
    }

    /// Escaped guid
    pub fn guid(&self) -> &str {
        &self.guid
    }

    /// Returns true if the episode renders `content:encoded`
    pub fn has_rich_description(&self) -> bool {
        self.content_encoded.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// Returns true if the episode is flagged explicit
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// Appends this episode's `<item>` to a channel element
    pub fn append_to_channel(&self, channel: &mut XmlElement) {
        channel.push(self.to_item());
    }

    /// Builds the `<item>` element
    pub fn to_item(&self) -> XmlElement {
        let mut item = XmlElement::new("item");

        item.push(XmlElement::new("title").with_text(self.title.as_str()));

        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            item.push(XmlElement::new("description").with_cdata(description));
        }

        if let Some(content) = self.content_encoded.as_deref().filter(|c| !c.is_empty()) {
            item.push(XmlElement::new("content:encoded").with_cdata(content));
        }

        item.push(XmlElement::new("pubDate").with_text(format_rfc2822(&self.pub_date)));

        item.push(
            XmlElement::new("enclosure")
                .with_attribute("url", self.url.as_str())
                .with_attribute("type", self.mime_type.as_str())
                .with_attribute("length", self.length.as_str()),
        );

        if let Some(author) = self.author.as_deref().filter(|a| !a.is_empty()) {
            item.push(XmlElement::new("author").with_text(author));
            item.push(XmlElement::new("itunes:author").with_text(author));
        }

        if let Some(link) = self.link.as_deref().filter(|l| !l.is_empty()) {
            item.push(XmlElement::new("link").with_text(link));
        }

        if let Some(season) = self.season {
            item.push(XmlElement::new("itunes:season").with_text(season.to_string()));
        }

        if let Some(episode) = self.episode {
            item.push(XmlElement::new("itunes:episode").with_text(episode.to_string()));
        }

        item.push(XmlElement::new("itunes:duration").with_text(self.duration.as_str()));

        let explicit = if self.explicit { "yes" } else { "clean" };
        item.push(XmlElement::new("itunes:explicit").with_text(explicit));

        let mut guid = XmlElement::new("guid").with_text(self.guid.as_str());
        if let Some(perma_link) = &self.is_perma_link {
            guid.set_attribute("isPermaLink", perma_link.as_str());
        }
        item.push(guid);

        if let Some(image) = self.image.as_deref().filter(|i| !i.is_empty()) {
            item.push(XmlElement::new("itunes:image").with_attribute("href", image));
        }

        item
    }
}

/// Text is parsed, integers are Unix timestamps in seconds
fn publish_date(value: &Value) -> FeedResult<DateTime<FixedOffset>> {
    match value {
        Value::Text(s) => parse_date(s),
        Value::Integer(secs) => DateTime::from_timestamp(*secs, 0)
            .map(|dt| dt.fixed_offset())
            .ok_or_else(|| FeedError::InvalidDate(secs.to_string())),
        other => Err(FeedError::InvalidDate(format!("{:?}", other))),
    }
}

/// Absent, `false`, empty and `"no"` are clean; anything else is explicit
fn is_explicit(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Text(s)) => !(s.is_empty() || s == "no"),
        Some(_) => true,
    }
}

fn positive_number(r: &Resolver<'_>, field: &str) -> Option<u32> {
    let value = r.value(field)?;
    let number = value.as_positive_integer();
    if number.is_none() {
        log::debug!("Omitting {} value {:?}", field, value);
    }
    number
}

/// `HH:MM:SS`, `H:MM:SS`, `MM:SS`, `M:SS` or plain seconds
fn is_itunes_duration(s: &str) -> bool {
    let parts: Vec<&str> = s.split(':').collect();
    if parts
        .iter()
        .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return false;
    }

    match parts.as_slice() {
        [_] => true,
        [m, s] => m.len() <= 2 && s.len() == 2,
        [h, m, s] => h.len() <= 2 && m.len() == 2 && s.len() == 2,
        _ => false,
    }
}
