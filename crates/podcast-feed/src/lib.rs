// crates/podcast-feed/src/lib.rs
//! RSS 2.0 podcast feed generator with iTunes extensions
//!
//! This crate turns a channel description and an ordered list of episodes
//! into a podcast feed:
//! - Channel header and episode fields resolved against package defaults
//! - XML escaping at ingestion, CDATA for HTML descriptions
//! - Nested iTunes categories
//! - Channel `pubDate` taken from the latest episode
//!
//! # Example
//!
//! ```rust
//! use storystream_podcast_feed::{FeedBuilder, Fields, PackageConfig};
//!
//! let config = PackageConfig::from_toml_str(r#"
//! [defaults]
//! description = "Classic literature read aloud"
//! summary = "Public domain audiobooks"
//! image = "https://example.com/cover.png"
//! author = "StoryStream"
//! atom_link = "https://example.com/feed.xml"
//! duration = "45:00"
//!
//! [defaults.categories]
//! Arts = ["Books"]
//! "#).expect("valid config");
//!
//! let mut builder = FeedBuilder::new(config);
//! builder
//!     .set_header(
//!         &Fields::new()
//!             .with("title", "The Great Audiobook Podcast")
//!             .with("link", "https://example.com/podcast"),
//!     )
//!     .expect("valid header");
//! builder
//!     .add_media(
//!         &Fields::new()
//!             .with("title", "Pride and Prejudice - Chapter 1")
//!             .with("publish_at", "2024-01-01T12:00:00Z")
//!             .with("url", "https://example.com/pride1.mp3")
//!             .with("type", "audio/mpeg")
//!             .with("length", 10_000_000)
//!             .with("guid", "pride-1"),
//!     )
//!     .expect("valid episode");
//!
//! let xml = builder.to_xml().expect("feed renders");
//! assert!(xml.contains("<itunes:category text=\"Arts\">"));
//! println!("{}", xml);
//! ```

mod builder;
mod category;
mod config;
mod date;
mod episode;
mod error;
mod value;
mod xml;

pub use builder::{FeedBuilder, FeedConfig};
pub use category::{CategoryNode, CategoryTree, MAX_CATEGORY_DEPTH};
pub use config::PackageConfig;
pub use date::{format_rfc2822, parse_date};
pub use episode::Episode;
pub use error::{FeedError, FeedResult};
pub use value::{escape, resolve, Fields, Value};
pub use xml::{XmlDocument, XmlElement, XmlNode};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        // Verify all types are exported
        let _: Fields = Fields::new();
        let _: Value = Value::Null;
        let _: CategoryTree = CategoryTree::new();
        let _: CategoryNode = CategoryNode::leaf("Comedy");
        let _: PackageConfig = PackageConfig::new();
        let _: XmlElement = XmlElement::new("rss");
        let _: FeedBuilder = FeedBuilder::new(PackageConfig::new());
    }

    #[test]
    fn test_complete_workflow() {
        let defaults = Fields::new()
            .with("description", "Audiobooks for testing")
            .with("summary", "Testing")
            .with("link", "http://example.com")
            .with("image", "http://example.com/cover.png")
            .with("author", "Tester")
            .with("categories", CategoryTree::from_names(["Fiction"]))
            .with("atom_link", "http://example.com/feed.xml");

        let mut builder = FeedBuilder::new(PackageConfig::with_defaults(defaults));
        builder
            .set_header(&Fields::new().with("title", "Test Audiobook Feed"))
            .expect("Should set header");
        builder
            .add_media(
                &Fields::new()
                    .with("title", "Book 1 - Chapter 1")
                    .with("description", "First chapter")
                    .with("publish_at", "Mon, 01 Jan 2024 12:00:00 GMT")
                    .with("url", "http://example.com/book1_ch1.mp3")
                    .with("type", "audio/mpeg")
                    .with("length", 5_000_000)
                    .with("guid", "book1-ch1")
                    .with("duration", "1:02:03"),
            )
            .expect("Should add episode");

        let doc = builder.to_dom().expect("Should render");
        let channel = doc.root().find("channel").expect("Should have channel");
        assert_eq!(channel.children_named("item").count(), 1);

        let item = channel.find("item").expect("Should have item");
        assert_eq!(item.find("title").map(|t| t.text()).as_deref(), Some("Book 1 - Chapter 1"));
        assert_eq!(
            channel.find("pubDate").map(|p| p.text()),
            item.find("pubDate").map(|p| p.text())
        );
    }
}
