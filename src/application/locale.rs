use serde::{Deserialize, Deserializer, Serialize};

/// Language of outgoing credit emails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "en")]
    En,
}

impl Locale {
    /// Only the exact tag `en` selects English; anything else is Brazilian Portuguese.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("en") => Locale::En,
            _ => Locale::PtBr,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::PtBr => "pt-BR",
            Locale::En => "en",
        }
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Locale::from_raw(raw.as_deref()))
    }
}
