use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{route::Route, Client, Result};

/// The current print job, from `GET api/job`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct JobStatus {
    /// Target of the current print job.
    pub job: Job,

    /// Progress of the current print job.
    pub progress: Progress,

    /// State of the job or connection.
    pub state: JobState,

    /// Error message, only set if there has been an error.
    pub error: Option<String>,
}

/// The file being printed and its estimates.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// The file that is the target of the current print job (abridged).
    pub file: JobFile,

    /// Average print time of previous prints of the file, in seconds.
    pub average_print_time: Option<f64>,

    /// Estimated print time for the file, in seconds.
    pub estimated_print_time: Option<f64>,

    /// Print time of the last print of the file, in seconds.
    pub last_print_time: Option<f64>,

    /// Estimated filament usage.
    pub filament: Option<Filament>,

    /// User who started the job.
    pub user: Option<String>,
}

/// Abridged file information.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct JobFile {
    /// Name of the file without path, e.g. `file.gco`. Always ASCII.
    pub name: Option<String>,

    /// Name of the file without path, possibly with non-ASCII characters.
    pub display: Option<String>,

    /// Path of the file within its origin, e.g. `folder/subfolder/file.gco`.
    pub path: Option<String>,

    /// Where the file is stored.
    pub origin: Option<Origin>,

    /// Size in bytes.
    pub size: Option<u64>,

    /// Upload time.
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub date: Option<DateTime<Utc>>,
}

/// Where a file is stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// OctoPrint's uploads folder.
    Local,

    /// The printer's SD card.
    Sdcard,
}

/// Estimated filament usage.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Filament {
    /// Length of filament, in mm.
    pub length: f64,

    /// Volume of filament, in cm³.
    pub volume: f64,
}

/// Progress of the current print job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Percentage of completion.
    pub completion: Option<f64>,

    /// Position in the file, in bytes from the beginning.
    pub filepos: Option<u64>,

    /// Time spent printing so far, in seconds.
    pub print_time: Option<u64>,

    /// Estimated time left, in seconds.
    pub print_time_left: Option<u64>,

    /// How `print_time_left` was estimated.
    pub print_time_left_origin: Option<RemainingPrintTimeSource>,
}

/// How the remaining print time was estimated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemainingPrintTimeSource {
    /// Linear approximation of progress in bytes against time.
    Linear,

    /// Analysis of the file.
    Analysis,

    /// Estimate after the linear estimation stabilized.
    Estimate,

    /// Average total of past prints of the same model on the same profile.
    Average,

    /// Mixture of estimate and analysis.
    MixedAnalysis,

    /// Mixture of estimate and average.
    MixedAverage,
}

/// State of the job or connection. OctoPrint does not document an
/// exhaustive list, so anything unrecognized is kept as
/// [JobState::Unknown].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum JobState {
    /// `Operational`
    Operational,
    /// `Printing`
    Printing,
    /// `Pausing`
    Pausing,
    /// `Paused`
    Paused,
    /// `Cancelling`
    Cancelling,
    /// `Error`
    Error,
    /// `Offline`
    Offline,
    /// `Offline after error`
    OfflineAfterError,
    /// `Opening serial connection`
    OpeningSerialConnection,
    /// Any other state text.
    Unknown(String),
}

impl JobState {
    /// The state as OctoPrint writes it.
    pub fn as_str(&self) -> &str {
        match self {
            JobState::Operational => "Operational",
            JobState::Printing => "Printing",
            JobState::Pausing => "Pausing",
            JobState::Paused => "Paused",
            JobState::Cancelling => "Cancelling",
            JobState::Error => "Error",
            JobState::Offline => "Offline",
            JobState::OfflineAfterError => "Offline after error",
            JobState::OpeningSerialConnection => "Opening serial connection",
            JobState::Unknown(state) => state,
        }
    }
}

impl From<String> for JobState {
    fn from(state: String) -> Self {
        match state.as_str() {
            "Operational" => JobState::Operational,
            "Printing" => JobState::Printing,
            "Pausing" => JobState::Pausing,
            "Paused" => JobState::Paused,
            "Cancelling" => JobState::Cancelling,
            "Error" => JobState::Error,
            "Offline" => JobState::Offline,
            "Offline after error" => JobState::OfflineAfterError,
            "Opening serial connection" => JobState::OpeningSerialConnection,
            _ => JobState::Unknown(state),
        }
    }
}

impl From<JobState> for String {
    fn from(state: JobState) -> Self {
        match state {
            JobState::Unknown(state) => state,
            known => known.as_str().to_owned(),
        }
    }
}

impl Client {
    /// Retrieve information about the current print job.
    pub async fn job_status(&self) -> Result<JobStatus> {
        self.get_json(Route::Job).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_deserialize_printing_job() {
        let status: JobStatus = serde_json::from_str(
            r#"{
              "job": {
                "file": {
                  "name": "whistle_v2.gcode",
                  "origin": "local",
                  "size": 1468987,
                  "date": 1378847754
                },
                "estimatedPrintTime": 8811,
                "filament": { "length": 810, "volume": 5.36 }
              },
              "progress": {
                "completion": 0.2298468264184775,
                "filepos": 337942,
                "printTime": 276,
                "printTimeLeft": 912,
                "printTimeLeftOrigin": "mixed-analysis"
              },
              "state": "Printing"
            }"#,
        )
        .unwrap();

        assert_eq!(status.state, JobState::Printing);
        assert_eq!(status.error, None);
        assert_eq!(status.job.file.name.as_deref(), Some("whistle_v2.gcode"));
        assert_eq!(status.job.file.origin, Some(Origin::Local));
        assert_eq!(status.job.file.date, DateTime::from_timestamp(1378847754, 0));
        assert_eq!(status.job.estimated_print_time, Some(8811.0));
        assert_eq!(
            status.job.filament,
            Some(Filament {
                length: 810.0,
                volume: 5.36,
            })
        );
        assert_eq!(status.progress.filepos, Some(337942));
        assert_eq!(
            status.progress.print_time_left_origin,
            Some(RemainingPrintTimeSource::MixedAnalysis)
        );
    }

    #[test]
    fn test_deserialize_idle_job() {
        let status: JobStatus = serde_json::from_str(
            r#"{
              "job": {
                "file": { "name": null, "origin": null, "size": null, "date": null },
                "estimatedPrintTime": null,
                "filament": null,
                "user": null
              },
              "progress": { "completion": null, "filepos": null, "printTime": null, "printTimeLeft": null },
              "state": "Offline after error",
              "error": "SerialException"
            }"#,
        )
        .unwrap();

        assert_eq!(status.state, JobState::OfflineAfterError);
        assert_eq!(status.error.as_deref(), Some("SerialException"));
        assert_eq!(status.job.file, JobFile::default());
        assert_eq!(status.progress, Progress::default());
    }

    #[test]
    fn test_job_state_keeps_unknown_text() {
        let state: JobState = serde_json::from_str(r#""Starting print from SD""#).unwrap();
        assert_eq!(state, JobState::Unknown("Starting print from SD".to_owned()));
        assert_eq!(serde_json::to_string(&state).unwrap(), r#""Starting print from SD""#);

        assert_eq!(
            serde_json::to_string(&JobState::OpeningSerialConnection).unwrap(),
            r#""Opening serial connection""#
        );
    }
}
