use serde::{de, Deserialize, Deserializer};

/// A record id as submitted by a client: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdInput {
    Number(i64),
    Text(String),
}

impl IdInput {
    /// `Ok(None)` for a blank string, an error for anything non-numeric.
    pub fn into_id(self) -> Result<Option<i64>, String> {
        match self {
            Self::Number(id) => Ok(Some(id)),
            Self::Text(text) if text.trim().is_empty() => Ok(None),
            Self::Text(text) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| format!("invalid id {text:?}")),
        }
    }
}

/// `deserialize_with` for optional id fields; pair it with `#[serde(default)]`.
pub(crate) fn optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IdInput>::deserialize(deserializer)? {
        Some(input) => input.into_id().map_err(de::Error::custom),
        None => Ok(None),
    }
}
