//! Best-score persistence collaborators.
//!
//! The typing engine never talks to these directly; the app and the score
//! reporter go through [`ScoreBackend`].

pub mod local;
pub mod remote;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use local::LocalBackend;
pub use remote::RemoteBackend;

/// Maximum rows a leaderboard returns
pub const LEADERBOARD_SIZE: usize = 10;

/// Who scores are attributed to, as reported by `/me`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub logged_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(rename = "highestWPM", default, skip_serializing_if = "Option::is_none")]
    pub highest_wpm: Option<u32>,
}

impl Profile {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(username: impl Into<String>, highest_wpm: u32) -> Self {
        Self {
            logged_in: true,
            username: Some(username.into()),
            highest_wpm: Some(highest_wpm),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    #[serde(rename = "highestWPM")]
    pub highest_wpm: u32,
}

/// Answer to a save request that reached the collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SaveStatus {
    Saved,
    /// No session to attribute the score to
    Unauthorized,
    UnknownUser,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Local,
    Remote,
    Off,
}

pub trait ScoreBackend: Send + Sync {
    fn me(&self) -> anyhow::Result<Profile>;

    /// Best-score upsert: storage only changes when `wpm` beats the record
    fn save_score(&self, wpm: u32) -> anyhow::Result<SaveStatus>;

    /// Top scores, highest first, only entries above zero
    fn leaderboard(&self) -> anyhow::Result<Vec<LeaderboardEntry>>;

    fn logout(&self) -> anyhow::Result<()>;
}
