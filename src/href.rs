use std::sync::LazyLock;

use reqwest::Url;

/// A link to the home page, with its query string.
///
/// Keys keep their insertion order, and setting an existing key replaces its value in place,
/// so that links differing by one parameter only differ at one place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Href {
    pairs: Vec<(&'static str, String)>,
}

impl Href {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &'static str, value: impl ToString) -> Self {
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
        self
    }

    pub fn with_opt(self, key: &'static str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self.without(key),
        }
    }

    pub fn without(mut self, key: &'static str) -> Self {
        self.pairs.retain(|(k, _)| *k != key);
        self
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.pairs.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// The `application/x-www-form-urlencoded` query string, without the leading `?`.
    pub fn query(&self) -> String {
        encode_pairs(self.pairs())
    }
}

impl std::fmt::Display for Href {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.pairs.is_empty() {
            write!(f, "/")
        } else {
            write!(f, "/?{}", self.query())
        }
    }
}

/// Form-encode key/value pairs.
pub fn encode_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    static BASE: LazyLock<Url> = LazyLock::new(|| Url::parse("http://localhost/").unwrap());
    let mut url = BASE.clone();
    url.query_pairs_mut().extend_pairs(pairs);
    url.query().unwrap_or_default().to_string()
}
