use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single requested conversion and its lifecycle state, as reported
/// by the remote service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Opaque identifier assigned by the server at creation.
    pub id: String,
    /// Human-readable input descriptor (stream URL or uploaded filename).
    pub source: String,
    pub status: JobStatus,
    /// Server-side artifact filename, if the server reports one.
    #[serde(default)]
    pub output_file: Option<String>,
    /// Path to the produced artifact, relative to the API origin.
    /// Present once `status` is `done`.
    #[serde(default)]
    pub output_url: Option<String>,
    /// Failure description when `status` is `error`. The server already
    /// truncates transcoder output; the client must not truncate further
    /// except for display.
    #[serde(default)]
    pub error: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Remote job state. `Done` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Converting,
    Done,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }

    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Whether `next` is reachable from this status. Terminal states
    /// have no outgoing edges; `pending` may skip straight to a
    /// terminal state on a fast conversion.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        match self {
            JobStatus::Pending => matches!(
                next,
                JobStatus::Converting | JobStatus::Done | JobStatus::Error
            ),
            JobStatus::Converting => matches!(next, JobStatus::Done | JobStatus::Error),
            JobStatus::Done | JobStatus::Error => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Converting => "converting",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Server-assigned token returned by an upload, consumed by the
/// immediately following convert call. Never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResult {
    pub filename: String,
}

/// Body of a convert call. Exactly one of `url` / `filename` is set;
/// the constructors keep invalid combinations unrepresentable at the
/// call site. Both fields are serialized (null included) to match the
/// service's wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub url: Option<String>,
    pub filename: Option<String>,
}

impl ConversionRequest {
    /// Convert a remote manifest URL.
    pub fn from_url<S: Into<String>>(url: S) -> Self {
        Self {
            url: Some(url.into()),
            filename: None,
        }
    }

    /// Convert a previously uploaded manifest file.
    pub fn from_upload<S: Into<String>>(filename: S) -> Self {
        Self {
            url: None,
            filename: Some(filename.into()),
        }
    }
}

/// Job timestamps as sent by the service. A well-behaved server emits
/// RFC 3339; the reference backend emits a naive ISO-8601 UTC string,
/// so both are accepted.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        raw.parse::<NaiveDateTime>()
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_value(created_at: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "j1",
            "status": "pending",
            "source": "https://example.com/stream/index.m3u8",
            "output_file": null,
            "output_url": null,
            "error": null,
            "created_at": created_at,
        })
    }

    #[test]
    fn test_status_terminal() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Converting.is_terminal());
        assert!(JobStatus::Done.is_terminal());
        assert!(JobStatus::Error.is_terminal());
    }

    #[test]
    fn test_status_transitions() {
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Converting));
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Done));
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Error));
        assert!(JobStatus::Converting.can_transition_to(JobStatus::Done));
        assert!(JobStatus::Converting.can_transition_to(JobStatus::Error));

        // No edges out of terminal states, and no regression.
        assert!(!JobStatus::Converting.can_transition_to(JobStatus::Pending));
        assert!(!JobStatus::Done.can_transition_to(JobStatus::Converting));
        assert!(!JobStatus::Error.can_transition_to(JobStatus::Pending));
        assert!(!JobStatus::Done.can_transition_to(JobStatus::Error));
    }

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Converting).unwrap(),
            "\"converting\""
        );
        let status: JobStatus = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(status, JobStatus::Done);
    }

    #[test]
    fn test_job_parses_rfc3339_timestamp() {
        let job: Job = serde_json::from_value(job_value("2026-08-07T12:00:00Z")).unwrap();
        assert_eq!(job.id, "j1");
        assert_eq!(job.created_at.to_rfc3339(), "2026-08-07T12:00:00+00:00");
    }

    #[test]
    fn test_job_parses_naive_timestamp() {
        // Python's datetime.utcnow().isoformat() carries no offset.
        let job: Job = serde_json::from_value(job_value("2026-08-07T12:00:00.123456")).unwrap();
        assert_eq!(job.created_at.timestamp(), 1786104000);
    }

    #[test]
    fn test_job_rejects_garbage_timestamp() {
        assert!(serde_json::from_value::<Job>(job_value("yesterday")).is_err());
    }

    #[test]
    fn test_conversion_request_serializes_both_fields() {
        let request = ConversionRequest::from_url("https://host/a.m3u8");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({ "url": "https://host/a.m3u8", "filename": null })
        );

        let request = ConversionRequest::from_upload("list.m3u8");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({ "url": null, "filename": "list.m3u8" })
        );
    }
}
