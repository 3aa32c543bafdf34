//! Notes the voice agent takes while interviewing the user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewNote {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Person or topic the note is about.
    pub about: String,
    pub note: String,
}

impl InterviewNote {
    pub fn new(
        about: impl Into<String>,
        note: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            about: about.into().trim().to_string(),
            note: note.into().trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_note_trims_and_gets_fresh_id() {
        let at = Utc.with_ymd_and_hms(2025, 1, 6, 14, 5, 9).unwrap();
        let a = InterviewNote::new(" Dana ", " shipped the login fix\n", at);
        let b = InterviewNote::new("Dana", "shipped the login fix", at);
        assert_eq!(a.about, "Dana");
        assert_eq!(a.note, "shipped the login fix");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn serializes_with_rfc3339_timestamp() {
        let at = Utc.with_ymd_and_hms(2025, 1, 6, 14, 5, 9).unwrap();
        let json = serde_json::to_value(InterviewNote::new("team", "standup moved", at)).unwrap();
        assert_eq!(json["timestamp"], "2025-01-06T14:05:09Z");
        assert_eq!(json["about"], "team");
        assert_eq!(json["note"], "standup moved");
        assert!(json["id"].is_string());
    }
}
