//! reqwest-backed implementation of [`GamificationBackend`].

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{GamificationBackend, HabitCompletion, SubtaskToggle, TaskCompletion};
use crate::clock::FocusCompletion;
use crate::error::BackendError;
use crate::model::{EntityId, Habit, Task};
use crate::snapshot::DashboardSnapshot;

pub struct HttpBackend {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpBackend {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:8000/api/`.
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, BackendError> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: Url::parse(&base)?,
            token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.base_url.join(path)?)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<String, BackendError> {
        let resp = self.authorize(req).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, BackendError> {
        let body = self.send(req).await?;
        serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        self.send_json(self.client.get(url)).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        self.send_json(self.client.post(url)).await
    }
}

impl GamificationBackend for HttpBackend {
    async fn fetch_dashboard(&self) -> Result<DashboardSnapshot, BackendError> {
        self.get("dashboard/").await
    }

    async fn fetch_habits(&self) -> Result<Vec<Habit>, BackendError> {
        self.get("habits/").await
    }

    async fn fetch_tasks(&self) -> Result<Vec<Task>, BackendError> {
        self.get("tasks/").await
    }

    async fn complete_habit(&self, id: EntityId) -> Result<HabitCompletion, BackendError> {
        self.post(&format!("habits/{id}/complete/")).await
    }

    async fn complete_task(&self, id: EntityId) -> Result<TaskCompletion, BackendError> {
        self.post(&format!("tasks/{id}/complete/")).await
    }

    async fn toggle_subtask(&self, id: EntityId) -> Result<SubtaskToggle, BackendError> {
        self.post(&format!("subtasks/{id}/toggle/")).await
    }

    async fn record_focus_session(&self, completion: &FocusCompletion) -> Result<(), BackendError> {
        let url = self.endpoint("focus-sessions/")?;
        debug!(%url, ?completion, "POST");
        self.send(self.client.post(url).json(completion)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(server: &mockito::Server) -> HttpBackend {
        HttpBackend::new(&server.url(), Some("tok".into()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn fetch_dashboard_decodes_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/dashboard/")
            .match_header("authorization", "Bearer tok")
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"first_name": "Ada", "last_name": "L", "motivation": "ship it",
                    "level": 3, "total_xp": 520, "current_level_xp": 45, "xp_for_next_level": 156}"#,
            )
            .create_async()
            .await;

        let snap = backend(&server).fetch_dashboard().await.unwrap();
        assert_eq!(snap.level, 3);
        assert_eq!(snap.total_xp, 520);
        assert_eq!(snap.first_name, "Ada");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn complete_habit_posts_to_entity_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/habits/7/complete/")
            .with_body(r#"{"xp_awarded": 25, "streak": 3, "is_completed": true}"#)
            .create_async()
            .await;

        let resp = backend(&server).complete_habit(7).await.unwrap();
        assert_eq!(resp.xp_awarded, Some(25));
        assert_eq!(resp.streak, Some(3));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/tasks/9/complete/")
            .with_status(404)
            .with_body("not found")
            .create_async()
            .await;

        let err = backend(&server).complete_task(9).await.unwrap_err();
        match err {
            BackendError::Status { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn garbage_body_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/subtasks/2/toggle/")
            .with_body("<html>")
            .create_async()
            .await;

        let err = backend(&server).toggle_subtask(2).await.unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[tokio::test]
    async fn focus_session_sends_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/focus-sessions/")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "duration_minutes": 25,
                "sessions_completed": 2
            })))
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;

        backend(&server)
            .record_focus_session(&FocusCompletion {
                duration_minutes: 25,
                sessions_completed: 2,
            })
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let b = HttpBackend::new("http://localhost:8000/api", None, Duration::from_secs(1)).unwrap();
        assert_eq!(b.endpoint("dashboard/").unwrap().as_str(), "http://localhost:8000/api/dashboard/");
    }
}
