//! Identity of the site: its public URL and the metadata shared by every page.

use serde_json::json;

pub const SITE_NAME: &str = "Start Open Source";
pub const DEFAULT_SITE_URL: &str = "https://good-first-issue.vercel.app";
pub const DESCRIPTION: &str =
    "Find beginner-friendly open source issues by language, repository, and organization.";
pub const KEYWORDS: [&str; 14] = [
    "good first issue",
    "open source",
    "beginner friendly issues",
    "github issues",
    "first contribution",
    "open source contribution",
    "beginner open source projects",
    "help wanted issues",
    "first pull request",
    "open source for beginners",
    "contribute to open source",
    "github good first issue",
    "starter issues",
    "easy issues github",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Site {
    /// Public URL, with a scheme and without trailing slash
    pub url: String,
    pub google_verification: Option<String>,
}

impl Site {
    pub fn new(url: &str, google_verification: Option<String>) -> Self {
        Self {
            url: normalize_url(url),
            google_verification: google_verification.filter(|v| !v.trim().is_empty()),
        }
    }

    pub fn title(&self) -> String {
        format!("{SITE_NAME} | Discover Good First Issues")
    }

    /// Structured data describing the site, as a JSON-LD document safe to embed in a `<script>`.
    pub fn json_ld(&self) -> String {
        let doc = json!({
            "@context": "https://schema.org",
            "@graph": [
                {
                    "@type": "WebSite",
                    "name": SITE_NAME,
                    "url": self.url,
                    "description": DESCRIPTION,
                    "potentialAction": {
                        "@type": "SearchAction",
                        "target": {
                            "@type": "EntryPoint",
                            "urlTemplate": format!("{}/?q={{search_term_string}}", self.url),
                        },
                        "query-input": "required name=search_term_string",
                    },
                },
                {
                    "@type": "Organization",
                    "name": SITE_NAME,
                    "url": self.url,
                    "logo": format!("{}/static/favicon.svg", self.url),
                },
            ],
        });
        doc.to_string().replace("</", "<\\/")
    }
}

/// An empty URL becomes the default one; a URL without scheme gets `https://`.
pub fn normalize_url(raw: &str) -> String {
    let raw = raw.trim();
    let url = if raw.is_empty() {
        DEFAULT_SITE_URL.to_string()
    } else if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    url.trim_end_matches('/').to_string()
}
