use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Error;

/// One journal entry. The id is assigned by the document store on creation,
/// the owner by the repository from the active identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub mood: Mood,
    #[serde(with = "time::serde::timestamp")]
    pub date: OffsetDateTime,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Story {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        mood: Mood,
    ) -> Self {
        Self {
            id: String::new(),
            owner_id: String::new(),
            title: title.into(),
            description: description.into(),
            mood,
            date: OffsetDateTime::now_utc(),
            images: Vec::new(),
        }
    }

    pub fn with_date(mut self, date: OffsetDateTime) -> Self {
        self.date = date;
        self
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }
}

/// Mood tag attached to a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    #[default]
    Neutral,
    Happy,
    Angry,
    Sad,
}

impl Mood {
    pub const ALL: [Mood; 4] = [Mood::Neutral, Mood::Happy, Mood::Angry, Mood::Sad];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Neutral => "neutral",
            Mood::Happy => "happy",
            Mood::Angry => "angry",
            Mood::Sad => "sad",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "neutral" => Ok(Mood::Neutral),
            "happy" => Ok(Mood::Happy),
            "angry" => Ok(Mood::Angry),
            "sad" => Ok(Mood::Sad),
            other => Err(Error::Other(anyhow::anyhow!("Unknown mood: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_round_trip() {
        for mood in Mood::ALL {
            assert_eq!(mood.as_str().parse::<Mood>().unwrap(), mood);
        }
        assert!("grumpy".parse::<Mood>().is_err());
    }

    #[test]
    fn test_story_serde_uses_unix_timestamps() {
        let story = Story::new("t", "d", Mood::Happy);
        let json = serde_json::to_value(&story).unwrap();
        assert!(json["date"].is_i64());

        let parsed: Story = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.date.unix_timestamp(), story.date.unix_timestamp());
    }
}
