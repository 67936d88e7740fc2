//! Example of generating a podcast feed
//!
//! Run with: RUST_LOG=debug cargo run --example generate_feed -p storystream-podcast-feed

use storystream_podcast_feed::{FeedBuilder, FeedError, Fields, PackageConfig};

const CONFIG: &str = r#"
[defaults]
description = "<p>Public domain audiobooks, read by volunteers.</p>"
summary = "Public domain audiobooks"
image = "https://example.com/audiobooks/cover.png"
author = "StoryStream Volunteers"
atom_link = "https://example.com/audiobooks/feed.xml"
language = "en"
email = "hello@example.com"
type = "audio/mpeg"

[defaults.categories]
Arts = ["Books"]
Fiction = { "Classics & Drama" = {} }
"#;

fn main() {
    env_logger::init();

    println!("=== StoryStream Podcast Feed Demo ===\n");

    match build_feed() {
        Ok(xml) => println!("{}", xml),
        Err(e) => eprintln!("Failed to build feed: {}", e),
    }

    println!("\n");
    println!("Missing fields are reported instead of rendered:");
    println!("{}", "=".repeat(60));
    let mut builder = FeedBuilder::new(PackageConfig::new());
    if let Err(e) = builder.add_media(&Fields::new().with("title", "Orphan")) {
        println!("  {}", e);
    }
}

fn build_feed() -> Result<String, FeedError> {
    let config = PackageConfig::from_toml_str(CONFIG)?;
    let mut builder = FeedBuilder::new(config);

    builder.set_header(
        &Fields::new()
            .with("title", "Classic Audiobooks")
            .with("subtitle", "Chapter by chapter")
            .with("link", "https://example.com/audiobooks")
            .with("explicit", "no"),
    )?;

    let chapters = [
        ("Pride and Prejudice - Chapter 1", "2024-01-01T12:00:00Z", 15_000_000, "21:04"),
        ("Pride and Prejudice - Chapter 2", "2024-01-02T12:00:00Z", 14_500_000, "19:48"),
        ("Moby Dick - Chapter 1: Loomings", "2024-01-03T12:00:00Z", 18_000_000, "25:31"),
    ];

    for (number, (title, published, length, duration)) in chapters.iter().enumerate() {
        let number = number as i64 + 1;
        builder.add_media(
            &Fields::new()
                .with("title", *title)
                .with("publish_at", *published)
                .with("url", format!("https://example.com/audio/{}.mp3", number))
                .with("length", *length)
                .with("duration", *duration)
                .with("guid", format!("classic-audiobooks-{}", number))
                .with("isPermaLink", false)
                .with("feed_episode", number)
                .with("description", format!("<p>{}</p>", title)),
        )?;
    }

    println!("Feed contains {} episodes", builder.episode_count());
    builder.to_xml()
}
