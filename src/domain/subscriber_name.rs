/// Display name of a subscriber. Only presence is required: any non-blank text
/// is accepted and escaped wherever it ends up in markup.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SubscriberName(String);

impl SubscriberName {
    pub fn parse(name: String) -> Result<SubscriberName, String> {
        if name.trim().is_empty() {
            return Err(String::from("Subscriber name cannot be blank"));
        }

        Ok(Self(name))
    }
}

impl AsRef<str> for SubscriberName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
