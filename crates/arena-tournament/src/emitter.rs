//! Match-result delivery to the ranking service.
//!
//! Emission is fire-and-forget: the score-update request enqueues a
//! detached task and returns; delivery failures only ever surface as
//! logs. The tournament's own state stays authoritative regardless of
//! what the ranking service sees.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;

use arena_core::{
    MatchOutcome, MatchResultEvent, MatchResultUser, RankingClientSettings,
};
use arena_db::models::{Match, Participant};

/// Transport for delivering match results. Production uses HTTP; tests
/// mock this.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn deliver(&self, event: &MatchResultEvent) -> Result<(), SinkError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("ranking service returned status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
}

impl SinkError {
    fn is_retryable(&self) -> bool {
        match self {
            SinkError::Transport(_) => true,
            SinkError::Status(status) => *status >= 500,
        }
    }
}

/// HTTP sink posting JSON to the ranking ingest endpoint.
pub struct HttpResultSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpResultSink {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SinkError::Transport(e.to_string()))?;
        let endpoint = format!(
            "{}/rankings/match-results",
            base_url.trim_end_matches('/')
        );
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ResultSink for HttpResultSink {
    async fn deliver(&self, event: &MatchResultEvent) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(event)
            .send()
            .await
            .map_err(|e| SinkError::Transport(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(SinkError::Status(response.status().as_u16()))
        }
    }
}

/// Fire-and-forget notifier with bounded retries.
#[derive(Clone)]
pub struct MatchResultNotifier {
    sink: Option<Arc<dyn ResultSink>>,
    max_retries: u32,
}

impl MatchResultNotifier {
    /// Notification disabled; every event is dropped with a debug log.
    pub fn disabled() -> Self {
        Self {
            sink: None,
            max_retries: 0,
        }
    }

    pub fn new(sink: Arc<dyn ResultSink>, max_retries: u32) -> Self {
        Self {
            sink: Some(sink),
            max_retries,
        }
    }

    pub fn from_settings(settings: &RankingClientSettings) -> Self {
        if settings.base_url.is_empty() {
            tracing::warn!("ranking service URL is empty - match-result notification disabled");
            return Self::disabled();
        }
        match HttpResultSink::new(&settings.base_url, settings.request_timeout()) {
            Ok(sink) => Self::new(Arc::new(sink), settings.max_retries),
            Err(err) => {
                tracing::error!("failed to build ranking client ({err}) - notification disabled");
                Self::disabled()
            }
        }
    }

    /// Deliver in the background; never blocks or fails the caller.
    pub fn notify(&self, event: MatchResultEvent) {
        let Some(sink) = self.sink.clone() else {
            tracing::debug!(match_id = %event.match_id, "notification disabled, dropping match result");
            return;
        };
        let max_retries = self.max_retries;
        tokio::spawn(async move {
            deliver_with_retry(sink.as_ref(), &event, max_retries).await;
        });
    }
}

/// At-least-once delivery: retry transient failures with exponential
/// backoff, give up on anything else.
pub(crate) async fn deliver_with_retry(
    sink: &dyn ResultSink,
    event: &MatchResultEvent,
    max_retries: u32,
) {
    let mut attempt = 0;
    loop {
        match sink.deliver(event).await {
            Ok(()) => {
                tracing::debug!(match_id = %event.match_id, "match result delivered");
                return;
            }
            Err(err) if err.is_retryable() && attempt < max_retries => {
                let delay = backoff_delay(attempt);
                tracing::warn!(
                    match_id = %event.match_id,
                    attempt,
                    error = %err,
                    "match result delivery failed, retrying in {delay:?}"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                tracing::error!(
                    match_id = %event.match_id,
                    error = %err,
                    "giving up on match result delivery"
                );
                return;
            }
        }
    }
}

/// Exponential backoff with jitter, capped at 30s.
fn backoff_delay(attempt: u32) -> Duration {
    let base = 500u64 << attempt.min(6);
    let jitter = rand::thread_rng().gen_range(0..=base / 2);
    Duration::from_millis((base + jitter).min(30_000))
}

/// Build the event for a completed match.
///
/// Only participants with a platform account make it into `users`; guest
/// entries are omitted with a log line. An event with no users is still
/// emitted so the ranking service can mark the match processed.
pub fn build_match_result_event(
    scored: &Match,
    game_id: &str,
    participants: &[Participant],
) -> MatchResultEvent {
    let mut users = Vec::new();
    for entry_id in [scored.participant1_id, scored.participant2_id]
        .into_iter()
        .flatten()
    {
        let outcome = if scored.winner_id.is_none() {
            MatchOutcome::Draw
        } else if scored.winner_id == Some(entry_id) {
            MatchOutcome::Win
        } else {
            MatchOutcome::Loss
        };

        match participants.iter().find(|p| p.id == entry_id) {
            Some(participant) => match participant.user_id {
                Some(user_id) => users.push(MatchResultUser { user_id, outcome }),
                None => tracing::info!(
                    match_id = %scored.id,
                    entry = %entry_id,
                    "guest participant omitted from match result"
                ),
            },
            None => tracing::warn!(
                match_id = %scored.id,
                entry = %entry_id,
                "participant entry missing while building match result"
            ),
        }
    }

    MatchResultEvent {
        match_id: scored.id,
        tournament_id: Some(scored.tournament_id),
        game_id: game_id.to_string(),
        timestamp: Utc::now(),
        users,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{BracketType, MatchStatus, ParticipantStatus};
    use uuid::Uuid;

    fn entry(tournament_id: Uuid, user_id: Option<Uuid>) -> Participant {
        Participant {
            id: Uuid::new_v4(),
            tournament_id,
            user_id,
            display_name: "player".to_string(),
            seed: 0,
            status: ParticipantStatus::Registered,
            is_waitlisted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn completed_match(
        tournament_id: Uuid,
        p1: &Participant,
        p2: &Participant,
        winner: Option<Uuid>,
    ) -> Match {
        Match {
            id: Uuid::new_v4(),
            tournament_id,
            round: 1,
            match_number: 1,
            participant1_id: Some(p1.id),
            participant2_id: Some(p2.id),
            winner_id: winner,
            loser_id: winner.map(|w| if w == p1.id { p2.id } else { p1.id }),
            score1: 2,
            score2: 1,
            status: MatchStatus::Completed,
            notes: None,
            proofs: Vec::new(),
            scheduled_time: None,
            completed_time: Some(Utc::now()),
            next_match_id: None,
            loser_next_match_id: None,
            bracket_type: BracketType::Winners,
            previous_match_ids: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn event_carries_win_and_loss() {
        let t = Uuid::new_v4();
        let p1 = entry(t, Some(Uuid::new_v4()));
        let p2 = entry(t, Some(Uuid::new_v4()));
        let m = completed_match(t, &p1, &p2, Some(p1.id));

        let event = build_match_result_event(&m, "chess", &[p1.clone(), p2.clone()]);
        assert_eq!(event.match_id, m.id);
        assert_eq!(event.tournament_id, Some(t));
        assert_eq!(event.game_id, "chess");
        assert_eq!(event.users.len(), 2);
        assert_eq!(event.users[0].user_id, p1.user_id.unwrap());
        assert_eq!(event.users[0].outcome, MatchOutcome::Win);
        assert_eq!(event.users[1].outcome, MatchOutcome::Loss);
    }

    #[test]
    fn draw_marks_both_users() {
        let t = Uuid::new_v4();
        let p1 = entry(t, Some(Uuid::new_v4()));
        let p2 = entry(t, Some(Uuid::new_v4()));
        let m = completed_match(t, &p1, &p2, None);

        let event = build_match_result_event(&m, "", &[p1, p2]);
        assert!(event.users.iter().all(|u| u.outcome == MatchOutcome::Draw));
    }

    #[test]
    fn guests_are_omitted_but_the_event_still_exists() {
        let t = Uuid::new_v4();
        let p1 = entry(t, None);
        let p2 = entry(t, Some(Uuid::new_v4()));
        let m = completed_match(t, &p1, &p2, Some(p1.id));

        let event = build_match_result_event(&m, "chess", &[p1, p2.clone()]);
        assert_eq!(event.users.len(), 1);
        assert_eq!(event.users[0].user_id, p2.user_id.unwrap());
        assert_eq!(event.users[0].outcome, MatchOutcome::Loss);

        let both_guests_event = {
            let g1 = entry(t, None);
            let g2 = entry(t, None);
            let gm = completed_match(t, &g1, &g2, Some(g1.id));
            build_match_result_event(&gm, "chess", &[g1, g2])
        };
        assert!(both_guests_event.users.is_empty());
    }

    fn sample_event() -> MatchResultEvent {
        MatchResultEvent {
            match_id: Uuid::new_v4(),
            tournament_id: None,
            game_id: "chess".to_string(),
            timestamp: Utc::now(),
            users: Vec::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried_until_success() {
        let mut sink = MockResultSink::new();
        let mut calls = 0;
        sink.expect_deliver().times(3).returning(move |_| {
            calls += 1;
            if calls < 3 {
                Err(SinkError::Transport("connection refused".to_string()))
            } else {
                Ok(())
            }
        });

        deliver_with_retry(&sink, &sample_event(), 5).await;
    }

    #[tokio::test(start_paused = true)]
    async fn client_errors_are_not_retried() {
        let mut sink = MockResultSink::new();
        sink.expect_deliver()
            .times(1)
            .returning(|_| Err(SinkError::Status(422)));

        deliver_with_retry(&sink, &sample_event(), 5).await;
    }

    #[tokio::test(start_paused = true)]
    async fn retry_budget_is_bounded() {
        let mut sink = MockResultSink::new();
        sink.expect_deliver()
            .times(4)
            .returning(|_| Err(SinkError::Status(503)));

        // 1 initial attempt + 3 retries.
        deliver_with_retry(&sink, &sample_event(), 3).await;
    }

    #[test]
    fn backoff_grows_and_stays_bounded() {
        let mut previous_cap = 0;
        for attempt in 0..10 {
            let delay = backoff_delay(attempt);
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_secs(30));
            let cap = 500u64 << attempt.min(6);
            assert!(cap >= previous_cap);
            previous_cap = cap;
        }
    }
}
