use chrono::{DateTime, Utc};

/// `1234` -> `1.2k` (with `decimals` digits after the point); small numbers are left alone.
pub fn compact(n: u64, decimals: usize) -> String {
    if n >= 1000 {
        format!("{:.decimals$}k", n as f64 / 1000.0)
    } else {
        n.to_string()
    }
}

/// `1234567` -> `1,234,567`.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// How long ago `date` was, in the largest relevant unit (`just now`, `5m ago`, `3mo ago`...).
pub fn time_ago(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - date).num_seconds();
    let days = seconds / 86400;
    if seconds < 60 {
        "just now".into()
    } else if seconds < 3600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{}h ago", seconds / 3600)
    } else if days < 30 {
        format!("{days}d ago")
    } else if days < 365 {
        format!("{}mo ago", days / 30)
    } else {
        format!("{}y ago", days / 365)
    }
}

/// CSS class of the dot shown next to a language name.
pub fn language_class(language: &str) -> &'static str {
    match language {
        "TypeScript" => "lang-typescript",
        "JavaScript" => "lang-javascript",
        "Python" => "lang-python",
        "Go" => "lang-go",
        "Rust" => "lang-rust",
        "Java" => "lang-java",
        "C++" => "lang-cpp",
        "C#" => "lang-csharp",
        "Ruby" => "lang-ruby",
        "PHP" => "lang-php",
        "Swift" => "lang-swift",
        "Kotlin" => "lang-kotlin",
        "Shell" => "lang-shell",
        _ => "lang-other",
    }
}

/// CSS class of a label badge, chosen on well-known keywords of the label.
pub fn label_class(label: &str) -> &'static str {
    const KEYWORDS: [(&str, &str); 4] = [
        ("good first issue", "label-first"),
        ("help wanted", "label-help"),
        ("beginner", "label-beginner"),
        ("easy", "label-easy"),
    ];
    let label = label.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(keyword, _)| label.contains(keyword))
        .map(|(_, class)| *class)
        .unwrap_or("label-other")
}
