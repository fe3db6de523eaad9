//! The todo item, the only entity the application stores.
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Represents a single item on the list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier, milliseconds since the Unix epoch at creation
    pub id: i64,
    /// Trimmed, never empty
    pub text: String,
    /// Whether the item has been checked off
    pub completed: bool,
    /// When the item was created
    #[serde(with = "iso8601_millis")]
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Creates an open item with the given id and already-normalized text.
    ///
    /// The creation time is truncated to milliseconds so that it survives a
    /// trip through the persisted format unchanged.
    pub fn new(id: i64, text: String) -> Self {
        Todo {
            id,
            text,
            completed: false,
            created_at: Utc::now().trunc_subsecs(3),
        }
    }
}

/// `createdAt` is written as `YYYY-MM-DDTHH:MM:SS.mmmZ` and read as any RFC 3339 timestamp.
mod iso8601_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}
