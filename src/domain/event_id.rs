const MAX_LENGTH: usize = 256;

/// Opaque identifier of an upstream event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct EventId(String);

impl EventId {
    pub fn parse(id: String) -> Result<EventId, String> {
        let id = id.trim();

        if id.is_empty() || id.len() > MAX_LENGTH {
            return Err(format!("{} is not a valid event id", id));
        }

        Ok(Self(id.to_string()))
    }
}

impl AsRef<str> for EventId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
