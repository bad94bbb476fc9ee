use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

pub const MIN_SATISFACTION: u8 = 1;
pub const MAX_SATISFACTION: u8 = 5;

/// Feedback body. `satisfaction` may arrive as a number or a numeric string
/// (form posts send strings); a null `comment` reads as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackInput {
    #[serde(default, deserialize_with = "lenient_rating")]
    pub satisfaction: Option<i64>,
    #[serde(default, deserialize_with = "nullable_text")]
    pub comment: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRating {
    Number(i64),
    Text(String),
}

fn lenient_rating<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    match Option::<RawRating>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawRating::Number(n)) => Ok(Some(n)),
        Some(RawRating::Text(t)) if t.trim().is_empty() => Ok(None),
        Some(RawRating::Text(t)) => t
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("satisfaction must be a whole number, got {t:?}"))),
    }
}

fn nullable_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Stored feedback; immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    #[serde(rename = "userEmail")]
    pub user_email: String,
    pub satisfaction: u8,
    pub comment: String,
    pub date: DateTime<Utc>,
}
