use super::{LeaderboardEntry, Profile, SaveStatus, ScoreBackend};
use anyhow::{bail, Context};
use reqwest::{
    blocking::{Client, RequestBuilder},
    header::COOKIE,
    StatusCode,
};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000/auth";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct SaveScoreBody {
    wpm: u32,
}

/// HTTP client for the session-authenticated score API
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: Client,
    base_url: String,
    session_cookie: Option<String>,
}

impl RemoteBackend {
    pub fn new(base_url: &str, session_cookie: Option<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_cookie: session_cookie.filter(|c| !c.trim().is_empty()),
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn with_session(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.session_cookie {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.with_session(self.client.get(self.endpoint(path)))
    }
}

impl ScoreBackend for RemoteBackend {
    fn me(&self) -> anyhow::Result<Profile> {
        let resp = self.get("me").send().context("GET /me failed")?;
        let profile = resp
            .error_for_status()?
            .json::<Profile>()
            .context("malformed /me response")?;
        Ok(profile)
    }

    fn save_score(&self, wpm: u32) -> anyhow::Result<SaveStatus> {
        let resp = self
            .with_session(self.client.post(self.endpoint("save-score")))
            .json(&SaveScoreBody { wpm })
            .send()
            .context("POST /save-score failed")?;

        let status = resp.status();
        debug!(%status, wpm, "save-score answered");
        match status {
            StatusCode::UNAUTHORIZED => Ok(SaveStatus::Unauthorized),
            StatusCode::NOT_FOUND => Ok(SaveStatus::UnknownUser),
            s if s.is_success() => Ok(SaveStatus::Saved),
            s => bail!("HTTP {}", s),
        }
    }

    fn leaderboard(&self) -> anyhow::Result<Vec<LeaderboardEntry>> {
        let resp = self.get("leaderboard").send().context("GET /leaderboard failed")?;
        let entries = resp
            .error_for_status()?
            .json::<Vec<LeaderboardEntry>>()
            .context("malformed /leaderboard response")?;
        Ok(entries)
    }

    fn logout(&self) -> anyhow::Result<()> {
        self.get("logout")
            .send()
            .context("GET /logout failed")?
            .error_for_status()?;
        Ok(())
    }
}
