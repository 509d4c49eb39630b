//! HTTP client for a remote rules engine.
//!
//! All endpoints are JSON over POST: `{base}/game` creates a game,
//! `{base}/game/{id}/move` plays a move, `{base}/game/{id}/suggestion`
//! asks the engine for its own move. No client-side timeout is set; the
//! engine bounds its own search with the thinking time it is handed.

use super::{EngineError, GameCreated, GameId, RulesEngine, Suggestion, TurnReport};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Remote rules engine reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRulesEngine {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct CreateGameBody<'a> {
    position: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SubmitMoveBody<'a> {
    #[serde(rename = "move")]
    mv: &'a str,
    history: &'a [String],
}

#[derive(Debug, Serialize)]
struct SuggestMoveBody<'a> {
    history: &'a [String],
    think_time_ms: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpRulesEngine {
    /// Creates a client for the engine at `base_url`, e.g.
    /// `http://127.0.0.1:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// POSTs `body` and decodes the JSON reply.
    ///
    /// `refusal_is_rejection` marks the one endpoint where a 4xx means
    /// "the engine judged the move illegal" rather than a broken request.
    async fn post<B, T>(
        &self,
        url: String,
        body: &B,
        refusal_is_rejection: bool,
    ) -> Result<T, EngineError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self.client.post(&url).json(body).send().await.map_err(|e| {
            warn!(error = %e, url = %url, "engine request failed to send");
            EngineError::Unreachable {
                detail: e.to_string(),
            }
        })?;

        let status = response.status();
        debug!(status = %status, url = %url, "engine replied");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if refusal_is_rejection && status.is_client_error() {
                let reason = serde_json::from_str::<ErrorBody>(&body)
                    .map(|b| b.error)
                    .unwrap_or_else(|_| format!("HTTP {status}"));
                warn!(reason = %reason, "engine refused the move");
                return Err(EngineError::Rejected { reason });
            }
            warn!(status = %status, "engine replied with an error status");
            return Err(EngineError::Protocol {
                detail: format!("HTTP {status}: {body}"),
            });
        }

        response.json::<T>().await.map_err(|e| EngineError::Protocol {
            detail: e.to_string(),
        })
    }
}

#[async_trait]
impl RulesEngine for HttpRulesEngine {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn create_game(
        &self,
        position: Option<&str>,
    ) -> Result<GameCreated, EngineError> {
        info!("creating game on the rules engine");
        let created: GameCreated = self
            .post(
                format!("{}/game", self.base_url),
                &CreateGameBody { position },
                false,
            )
            .await?;
        info!(
            game = %created.session,
            legal_moves = created.legal_moves.len(),
            "game created"
        );
        Ok(created)
    }

    #[instrument(skip(self, history), fields(game = %game, plies = history.len()))]
    async fn submit_move(
        &self,
        game: &GameId,
        mv: &str,
        history: &[String],
    ) -> Result<TurnReport, EngineError> {
        debug!(%mv, "submitting move");
        self.post(
            format!("{}/game/{}/move", self.base_url, game),
            &SubmitMoveBody { mv, history },
            true,
        )
        .await
    }

    #[instrument(skip(self, history), fields(game = %game, plies = history.len()))]
    async fn suggest_move(
        &self,
        game: &GameId,
        history: &[String],
        think_time: Duration,
    ) -> Result<Suggestion, EngineError> {
        debug!(think_ms = think_time.as_millis() as u64, "requesting a suggestion");
        let suggestion: Suggestion = self
            .post(
                format!("{}/game/{}/suggestion", self.base_url, game),
                &SuggestMoveBody {
                    history,
                    think_time_ms: think_time.as_millis() as u64,
                },
                false,
            )
            .await?;
        debug!(
            best_move = %suggestion.best_move,
            evaluation = %suggestion.evaluation,
            "suggestion received"
        );
        Ok(suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slashes_from_the_base_url() {
        let engine = HttpRulesEngine::new("http://localhost:8000///");
        assert_eq!(engine.base_url, "http://localhost:8000");
        let untouched = HttpRulesEngine::new("http://localhost:8000");
        assert_eq!(untouched.base_url, "http://localhost:8000");
    }

    #[test]
    fn wire_bodies_use_the_engine_field_names() {
        let body = SubmitMoveBody {
            mv: "O-O",
            history: &["fen1".to_string()],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["move"], "O-O");
        assert_eq!(json["history"][0], "fen1");

        let create = serde_json::to_value(CreateGameBody { position: None }).unwrap();
        assert!(create["position"].is_null());
    }
}
