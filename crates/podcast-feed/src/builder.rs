// crates/podcast-feed/src/builder.rs
//! Channel header and feed assembly

use crate::category::{CategoryNode, CategoryTree, MAX_CATEGORY_DEPTH};
use crate::config::PackageConfig;
use crate::date::{self, format_rfc2822};
use crate::episode::Episode;
use crate::error::{FeedError, FeedResult};
use crate::value::{Fields, Resolver};
use crate::xml::{XmlDocument, XmlElement};
use chrono::{DateTime, FixedOffset};
use std::borrow::Cow;

const ITUNES_NS: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";
const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";

/// Resolved channel-level fields
///
/// Text values are escaped; `description` is kept verbatim for CDATA.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    /// Podcast title
    pub title: String,
    /// Channel description, raw
    pub description: String,
    /// iTunes summary, may be empty
    pub summary: String,
    /// Website URL
    pub link: String,
    /// Artwork URL
    pub image: String,
    /// Author, also used as the owner name
    pub author: String,
    /// Category taxonomy, at most three levels deep
    pub categories: CategoryTree,
    /// URL of the feed itself
    pub atom_link: String,
    /// iTunes subtitle
    pub subtitle: Option<String>,
    /// Explicit flag, rendered verbatim
    pub explicit: Option<String>,
    /// Language code
    pub language: Option<String>,
    /// Owner email
    pub email: Option<String>,
    /// Copyright notice
    pub copyright: Option<String>,
}

impl FeedConfig {
    /// Resolves the channel header from `data`, falling back to `defaults`
    pub fn from_fields(data: &Fields, defaults: &Fields) -> FeedResult<Self> {
        let r = Resolver::new(data, defaults);

        Ok(Self {
            title: r.text("title")?,
            description: r
                .raw_text("description")?
                .ok_or_else(|| FeedError::MissingField("description".to_string()))?,
            summary: r.text("summary")?,
            link: r.text("link")?,
            image: r.text("image")?,
            author: r.text("author")?,
            categories: r.categories("categories")?.limited_to(MAX_CATEGORY_DEPTH),
            atom_link: r.text("atom_link")?,
            subtitle: r.optional_text("subtitle")?,
            explicit: r.optional_text("explicit")?,
            language: r.optional_text("language")?,
            email: r.optional_text("email")?,
            copyright: r.optional_text("copyright")?,
        })
    }
}

/// Assembles a podcast RSS document from a channel header and episodes
///
/// # Example
///
/// ```rust
/// use storystream_podcast_feed::{FeedBuilder, Fields, PackageConfig};
///
/// let defaults = Fields::new()
///     .with("description", "Stories before bedtime")
///     .with("summary", "")
///     .with("image", "https://example.com/art.png")
///     .with("author", "StoryStream")
///     .with("categories", "Fiction")
///     .with("atom_link", "https://example.com/feed.xml")
///     .with("duration", "30:00");
///
/// let mut builder = FeedBuilder::new(PackageConfig::with_defaults(defaults));
/// builder
///     .set_header(&Fields::new().with("title", "Night Tales").with("link", "https://example.com"))
///     .expect("valid header");
/// builder
///     .add_media(
///         &Fields::new()
///             .with("title", "The Lighthouse")
///             .with("publish_at", "2024-01-01T20:00:00Z")
///             .with("url", "https://example.com/1.mp3")
///             .with("type", "audio/mpeg")
///             .with("length", 12_345_678)
///             .with("guid", "night-tales-1"),
///     )
///     .expect("valid episode");
///
/// let xml = builder.to_xml().expect("renders");
/// assert!(xml.contains("<title>The Lighthouse</title>"));
/// ```
#[derive(Debug, Clone)]
pub struct FeedBuilder {
    config: PackageConfig,
    header: Option<FeedConfig>,
    pub_date: Option<DateTime<FixedOffset>>,
    episodes: Vec<Episode>,
}

impl FeedBuilder {
    /// Creates a builder whose header starts from the package defaults
    pub fn new(config: PackageConfig) -> Self {
        let mut builder = Self {
            config,
            header: None,
            pub_date: None,
            episodes: Vec::new(),
        };

        if let Err(e) = builder.set_header(&Fields::new()) {
            log::debug!("Defaults alone do not form a channel header: {}", e);
        }
        builder
    }

    /// The package configuration
    pub fn config(&self) -> &PackageConfig {
        &self.config
    }

    /// Replaces the channel header
    ///
    /// On error the previous header is kept.
    pub fn set_header(&mut self, data: &Fields) -> FeedResult<()> {
        let header = FeedConfig::from_fields(data, &self.config.defaults)?;
        log::debug!("Channel header set for '{}'", header.title);
        self.header = Some(header);
        Ok(())
    }

    /// The current channel header, if one resolved
    pub fn header(&self) -> Option<&FeedConfig> {
        self.header.as_ref()
    }

    /// Seeds the channel publication date
    ///
    /// Later episodes still move the rendered date forward.
    pub fn set_pub_date(&mut self, pub_date: DateTime<FixedOffset>) {
        self.pub_date = Some(pub_date);
    }

    /// Removes a seeded publication date
    pub fn clear_pub_date(&mut self) {
        self.pub_date = None;
    }

    /// Adds an episode built from `data` and the package defaults
    ///
    /// Nothing is added when the episode fails to build.
    pub fn add_media(&mut self, data: &Fields) -> FeedResult<()> {
        let episode = Episode::from_fields(data, &self.config.defaults)?;
        log::debug!(
            "Added episode '{}' published {}",
            episode.title(),
            format_rfc2822(&episode.pub_date())
        );
        self.episodes.push(episode);
        Ok(())
    }

    /// Episodes in insertion order
    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    /// Number of episodes added
    pub fn episode_count(&self) -> usize {
        self.episodes.len()
    }

    /// Latest of the seeded date and all episode dates
    pub fn last_published(&self) -> Option<DateTime<FixedOffset>> {
        self.episodes
            .iter()
            .map(Episode::pub_date)
            .chain(self.pub_date)
            .max()
    }

    /// Serializes the feed
    pub fn to_xml(&self) -> FeedResult<String> {
        self.to_dom()?.to_xml()
    }

    /// Builds the feed document
    pub fn to_dom(&self) -> FeedResult<XmlDocument> {
        let header = self.resolved_header()?;

        // Derived values first, so the tree can be emitted in document order
        let pub_date = self.last_published().unwrap_or_else(date::now);
        let uses_content = self.episodes.iter().any(Episode::has_rich_description);

        let mut rss = XmlElement::new("rss")
            .with_attribute("xmlns:itunes", ITUNES_NS)
            .with_attribute("version", "2.0")
            .with_attribute("xmlns:atom", ATOM_NS);
        if uses_content {
            rss.set_attribute("xmlns:content", CONTENT_NS);
        }

        let mut channel = XmlElement::new("channel");

        channel.push(
            XmlElement::new("atom:link")
                .with_attribute("href", header.atom_link.as_str())
                .with_attribute("rel", "self")
                .with_attribute("type", "application/rss+xml"),
        );

        let title = XmlElement::new("title").with_text(header.title.as_str());
        channel.push(title.clone());

        if let Some(subtitle) = non_empty(&header.subtitle) {
            channel.push(XmlElement::new("itunes:subtitle").with_text(subtitle));
        }

        let link = XmlElement::new("link").with_text(header.link.as_str());
        channel.push(link.clone());

        channel.push(XmlElement::new("description").with_cdata(header.description.as_str()));

        channel.push(XmlElement::new("itunes:summary").with_text(header.summary.as_str()));

        channel.push(
            XmlElement::new("image")
                .with_child(title)
                .with_child(link)
                .with_child(XmlElement::new("url").with_text(header.image.as_str())),
        );

        channel.push(XmlElement::new("itunes:image").with_attribute("href", header.image.as_str()));

        channel.push(XmlElement::new("itunes:author").with_text(header.author.as_str()));

        let mut owner = XmlElement::new("itunes:owner")
            .with_child(XmlElement::new("itunes:name").with_text(header.author.as_str()));
        if let Some(email) = non_empty(&header.email) {
            owner.push(XmlElement::new("itunes:email").with_text(email));
        }
        channel.push(owner);

        for category in header.categories.nodes() {
            channel.push(category_element(category));
        }

        if let Some(explicit) = non_empty(&header.explicit) {
            channel.push(XmlElement::new("itunes:explicit").with_text(explicit));
        }

        if let Some(language) = non_empty(&header.language) {
            channel.push(XmlElement::new("language").with_text(language));
        }

        if let Some(copyright) = non_empty(&header.copyright) {
            channel.push(XmlElement::new("copyright").with_text(copyright));
        }

        channel.push(XmlElement::new("pubDate").with_text(format_rfc2822(&pub_date)));

        for episode in &self.episodes {
            episode.append_to_channel(&mut channel);
        }

        rss.push(channel);

        log::debug!(
            "Rendered feed '{}' with {} episode(s)",
            header.title,
            self.episodes.len()
        );
        Ok(XmlDocument::new(rss))
    }

    /// Re-resolves from defaults when no header was set, to report the missing field
    fn resolved_header(&self) -> FeedResult<Cow<'_, FeedConfig>> {
        match &self.header {
            Some(header) => Ok(Cow::Borrowed(header)),
            None => FeedConfig::from_fields(&Fields::new(), &self.config.defaults).map(Cow::Owned),
        }
    }
}

fn category_element(node: &CategoryNode) -> XmlElement {
    let mut element = XmlElement::new("itunes:category").with_attribute("text", node.name.as_str());
    for child in &node.children {
        element.push(category_element(child));
    }
    element
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
