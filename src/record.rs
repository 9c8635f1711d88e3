//! Score submissions and their persisted form

use chrono::NaiveDateTime;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Capture time layout stored with every record
pub const CAPTURE_TIME_FORMAT: &str = "%d:%m:%Y %H:%M:%S";

/// One player entry of a submitted batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    #[serde(default, deserialize_with = "loose_player_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    pub score: f64,
}

impl ScoreSubmission {
    /// Player id if present and non-empty
    pub fn player_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Stamp the submission with its capture time
    ///
    /// Returns None for submissions without a usable player id.
    pub fn to_record(&self, now: NaiveDateTime) -> Option<ScoreRecord> {
        let id = self.player_id()?;
        Some(ScoreRecord {
            id: id.to_string(),
            name: self.name.clone(),
            score: self.score,
            time: now.format(CAPTURE_TIME_FORMAT).to_string(),
        })
    }
}

/// Player ids arrive as strings or bare numbers
fn loose_player_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(de::Error::custom(format!("invalid player id: {}", other))),
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Whole scores serialize as JSON integers (`30`, not `30.0`)
fn integral_score<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if score.fract() == 0.0 && score.abs() < 9.0e15 {
        serializer.serialize_i64(*score as i64)
    } else {
        serializer.serialize_f64(*score)
    }
}

/// Best score of one player within one bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: String,
    pub name: String,
    #[serde(serialize_with = "integral_score")]
    pub score: f64,
    pub time: String,
}

/// Sort records by descending score
///
/// The sort is stable, so ties keep storage scan order.
pub fn rank(records: &mut [ScoreRecord]) {
    records.sort_by(|a, b| b.score.total_cmp(&a.score));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn submission(id: Option<&str>, score: f64) -> ScoreSubmission {
        ScoreSubmission {
            id: id.map(str::to_string),
            name: "Alice".to_string(),
            score,
        }
    }

    #[test]
    fn test_to_record_stamps_time() {
        let record = submission(Some("p1"), 42.0).to_record(at(9, 5, 3)).unwrap();

        assert_eq!(record.id, "p1");
        assert_eq!(record.name, "Alice");
        assert_eq!(record.score, 42.0);
        assert_eq!(record.time, "07:03:2024 09:05:03");
    }

    #[test]
    fn test_missing_or_empty_id_yields_no_record() {
        assert!(submission(None, 1.0).to_record(at(0, 0, 0)).is_none());
        assert!(submission(Some(""), 1.0).to_record(at(0, 0, 0)).is_none());
    }

    #[test]
    fn test_deserialize_without_id_or_name() {
        let parsed: ScoreSubmission = serde_json::from_str(r#"{"score": 7}"#).unwrap();

        assert_eq!(parsed.id, None);
        assert_eq!(parsed.name, "");
        assert_eq!(parsed.score, 7.0);
    }

    #[test]
    fn test_deserialize_loose_fields() {
        let parsed: ScoreSubmission =
            serde_json::from_str(r#"{"id": 1234, "name": null, "score": 3.5}"#).unwrap();
        assert_eq!(parsed.player_id(), Some("1234"));
        assert_eq!(parsed.name, "");

        let parsed: ScoreSubmission =
            serde_json::from_str(r#"{"id": null, "score": 1}"#).unwrap();
        assert_eq!(parsed.player_id(), None);

        assert!(serde_json::from_str::<ScoreSubmission>(r#"{"id": [1], "score": 1}"#).is_err());
    }

    #[test]
    fn test_whole_scores_serialize_as_integers() {
        let mut record = submission(Some("p1"), 30.0).to_record(at(0, 0, 0)).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["score"], serde_json::json!(30));
        assert_eq!(serde_json::to_string(&json["score"]).unwrap(), "30");

        record.score = 12.5;
        assert_eq!(serde_json::to_value(&record).unwrap()["score"], 12.5);

        record.score = -4.0;
        let round_trip: ScoreRecord =
            serde_json::from_str(&serde_json::to_string(&record).unwrap()).unwrap();
        assert_eq!(round_trip.score, -4.0);
    }

    #[test]
    fn test_rank_descending() {
        let mut records: Vec<ScoreRecord> = [("a", 30.0), ("b", 10.0), ("c", 20.0)]
            .iter()
            .map(|(id, score)| ScoreRecord {
                id: id.to_string(),
                name: String::new(),
                score: *score,
                time: String::new(),
            })
            .collect();

        rank(&mut records);

        let scores: Vec<f64> = records.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![30.0, 20.0, 10.0]);
    }
}
