use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One user's well-being record for a single calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    pub mood: i32,
    pub sleep_hours: f32,
    pub water_cups: i32,
    pub sport_min: i32,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DailyEntry {
    pub fn mood_emoji(&self) -> &'static str {
        mood_emoji(self.mood)
    }

    pub fn mood_label(&self) -> &'static str {
        mood_label(self.mood)
    }
}

/// POST /entries payload. The server answers with the canonical `DailyEntry`,
/// creating or replacing the record for (user, date).
#[derive(Debug, Clone, Serialize, Validate)]
pub struct EntryDraft {
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    #[validate(range(min = 1, max = 5, message = "L'humeur doit être comprise entre 1 et 5"))]
    pub mood: i32,
    #[validate(range(
        min = 0.0,
        max = 24.0,
        message = "Les heures de sommeil doivent être comprises entre 0 et 24"
    ))]
    pub sleep_hours: f32,
    #[validate(range(min = 0, message = "Le nombre de verres d'eau ne peut pas être négatif"))]
    pub water_cups: i32,
    #[validate(range(min = 0, message = "Les minutes de sport ne peuvent pas être négatives"))]
    pub sport_min: i32,
    pub note: String,
}

impl EntryDraft {
    /// Blank form for a given day. Mood starts at the unselected placeholder
    /// (0), which validation rejects until the user picks a rating.
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date,
            mood: 0,
            sleep_hours: 7.5,
            water_cups: 8,
            sport_min: 0,
            note: String::new(),
        }
    }
}

/// GET /entries filters; every field is optional.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntryQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl EntryQuery {
    /// Entries for one exact day.
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    /// Entries within an inclusive date range.
    pub fn between(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..Self::default()
        }
    }
}

const MOOD_SCALE: [(&str, &str); 5] = [
    ("😢", "Très triste"),
    ("😞", "Triste"),
    ("😐", "Neutre"),
    ("😊", "Bonne humeur"),
    ("😍", "Excellente humeur"),
];

fn mood_step(mood: i32) -> (&'static str, &'static str) {
    mood.checked_sub(1)
        .and_then(|step| usize::try_from(step).ok())
        .and_then(|i| MOOD_SCALE.get(i))
        .copied()
        .unwrap_or(MOOD_SCALE[2])
}

/// Emoji for a 1-5 mood rating; out-of-range values fall back to neutral.
pub fn mood_emoji(mood: i32) -> &'static str {
    mood_step(mood).0
}

/// Label for a 1-5 mood rating; out-of-range values fall back to neutral.
pub fn mood_label(mood: i32) -> &'static str {
    mood_step(mood).1
}

/// The server serializes entry dates as full RFC 3339 timestamps while drafts
/// post bare `YYYY-MM-DD` strings. Both deserialize to the calendar date as
/// written (any time-of-day or offset in a timestamp is dropped, not
/// converted); serialization always emits `YYYY-MM-DD`.
pub(crate) mod calendar_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveDate, String> {
        if let Ok(date) = NaiveDate::parse_from_str(raw, FORMAT) {
            return Ok(date);
        }
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
            return Ok(timestamp.date_naive());
        }
        Err(format!("invalid calendar date: {raw}"))
    }
}
