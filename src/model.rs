use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Content prefix marking a message as a reference to a local animated image.
pub const GIF_PREFIX: &str = "GIF: ";

/// Message content referencing the GIF at `path`.
pub fn gif_content(path: &str) -> String {
    format!("{GIF_PREFIX}{path}")
}

/// A single chat message. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub sender: String,
    pub content: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Local>,
}

impl Message {
    pub fn new(sender: impl Into<String>, content: impl Into<String>, at: DateTime<Local>) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
            timestamp: at,
        }
    }

    /// Path of the referenced GIF, if this message follows the GIF convention.
    pub fn gif_path(&self) -> Option<&str> {
        self.content.strip_prefix(GIF_PREFIX)
    }
}

/// A file a user has made visible to everyone else on this machine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SharedFile {
    pub filepath: String,
    pub shared_by: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Local>,
}

impl SharedFile {
    pub fn exists(&self) -> bool {
        Path::new(&self.filepath).exists()
    }
}

/// Timestamp codec shared by every persisted record.
///
/// Writes RFC 3339 with the local offset. Reads that form back, and also
/// accepts offset-less ISO-8601 strings (interpreted as local time) so
/// documents produced by older clients still load.
pub mod timestamp {
    use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, false))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Local>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Local>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Local));
        }
        let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
        Local.from_local_datetime(&naive).earliest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn message_round_trips_json() {
        let msg = Message::new("alice", "hello there", Local::now());
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, parsed);
    }

    #[test]
    fn shared_file_serializes_snake_case_keys() {
        let file = SharedFile {
            filepath: "/tmp/notes.txt".into(),
            shared_by: "bob".into(),
            timestamp: Local::now(),
        };
        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(value["shared_by"], "bob");
        assert_eq!(value["filepath"], "/tmp/notes.txt");
        let parsed: SharedFile = serde_json::from_value(value).unwrap();
        assert_eq!(file, parsed);
    }

    #[test]
    fn accepts_offsetless_local_timestamps() {
        let json = r#"{"sender":"carol","content":"hi","timestamp":"2024-03-05T14:07:09.123456"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        let expected = Local
            .with_ymd_and_hms(2024, 3, 5, 14, 7, 9)
            .earliest()
            .unwrap()
            .with_nanosecond(123_456_000)
            .unwrap();
        assert_eq!(msg.timestamp, expected);
    }

    #[test]
    fn rejects_garbage_timestamp() {
        let json = r#"{"sender":"carol","content":"hi","timestamp":"yesterday"}"#;
        assert!(serde_json::from_str::<Message>(json).is_err());
    }

    #[test]
    fn gif_convention() {
        let msg = Message::new("dave", gif_content("/tmp/party.gif"), Local::now());
        assert_eq!(msg.content, "GIF: /tmp/party.gif");
        assert_eq!(msg.gif_path(), Some("/tmp/party.gif"));

        let plain = Message::new("dave", "GIF:no-space", Local::now());
        assert_eq!(plain.gif_path(), None);
    }

    #[test]
    fn encoded_timestamps_sort_chronologically() {
        let early = Local.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).earliest().unwrap();
        let late = Local.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).earliest().unwrap();
        let a = serde_json::to_value(Message::new("a", "x", early)).unwrap();
        let b = serde_json::to_value(Message::new("a", "x", late)).unwrap();
        assert!(a["timestamp"].as_str().unwrap() < b["timestamp"].as_str().unwrap());
    }
}
