//! The list of crawlable pages, and its XML rendering.

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesText, Event},
};

use crate::{href::encode_pairs, sanitize::View, site::Site};

/// Languages with a dedicated sitemap entry. The first ten also get one entry per view.
pub const LANGUAGES: [&str; 18] = [
    "TypeScript",
    "JavaScript",
    "Python",
    "Go",
    "Rust",
    "Java",
    "C++",
    "Ruby",
    "C#",
    "PHP",
    "Swift",
    "Kotlin",
    "Dart",
    "Scala",
    "Shell",
    "C",
    "Elixir",
    "Haskell",
];
const TOP_LANGUAGES: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeFrequency {
    Hourly,
    Daily,
}

impl ChangeFrequency {
    fn as_str(&self) -> &'static str {
        match self {
            ChangeFrequency::Hourly => "hourly",
            ChangeFrequency::Daily => "daily",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub url: String,
    pub last_modified: DateTime<Utc>,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

/// Every crawlable variant of the home page: the page itself, each view, each language,
/// and each view of the top languages.
pub fn entries(site: &Site, now: DateTime<Utc>) -> Vec<Entry> {
    let entry = |query: String, change_frequency, priority| Entry {
        url: if query.is_empty() {
            site.url.clone()
        } else {
            format!("{}?{query}", site.url)
        },
        last_modified: now,
        change_frequency,
        priority,
    };

    let mut entries = vec![entry(String::new(), ChangeFrequency::Hourly, 1.0)];
    entries.extend(View::ALL.iter().map(|view| {
        entry(
            encode_pairs([("view", view.as_str())]),
            ChangeFrequency::Hourly,
            0.9,
        )
    }));
    entries.extend(LANGUAGES.iter().map(|language| {
        entry(
            encode_pairs([("language", *language)]),
            ChangeFrequency::Hourly,
            0.8,
        )
    }));
    for language in &LANGUAGES[..TOP_LANGUAGES] {
        entries.extend(View::ALL.iter().map(|view| {
            entry(
                encode_pairs([("view", view.as_str()), ("language", *language)]),
                ChangeFrequency::Daily,
                0.7,
            )
        }));
    }
    entries
}

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Render entries as a sitemap document.
pub fn to_xml(entries: &[Entry]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer
        .create_element("urlset")
        .with_attribute(("xmlns", SITEMAP_NS))
        .write_inner_content(|w| {
            for entry in entries {
                w.create_element("url").write_inner_content(|w| {
                    let last_modified = entry
                        .last_modified
                        .to_rfc3339_opts(SecondsFormat::Millis, true);
                    let priority = format!("{:.1}", entry.priority);
                    for (name, text) in [
                        ("loc", entry.url.as_str()),
                        ("lastmod", last_modified.as_str()),
                        ("changefreq", entry.change_frequency.as_str()),
                        ("priority", priority.as_str()),
                    ] {
                        w.create_element(name)
                            .write_text_content(BytesText::new(text))?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        })?;
    let mut xml = String::from_utf8(writer.into_inner())?;
    xml.push('\n');
    Ok(xml)
}

/// The `sitemap` subcommand: print the sitemap on standard output.
pub fn command(site: &Site) -> Result<()> {
    let entries = entries(site, Utc::now());
    log::debug!("{} sitemap entries", entries.len());
    print!("{}", to_xml(&entries)?);
    Ok(())
}
