use reqwest::Url;

/// Absolute `http`/`https` link to an event page, embedded in confirmation emails.
/// Holds the caller's text (trimmed), not the normalised form `Url` would print.
#[derive(Debug, Clone)]
pub struct EventUrl(String);

impl EventUrl {
    pub fn parse(url: String) -> Result<EventUrl, String> {
        let trimmed = url.trim();
        let parsed =
            Url::parse(trimmed).map_err(|err| format!("{} is not a valid url: {}", url, err))?;

        match parsed.scheme() {
            "http" | "https" => Ok(Self(trimmed.to_string())),
            scheme => Err(format!("{} urls are not allowed as event links", scheme)),
        }
    }
}

impl AsRef<str> for EventUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
