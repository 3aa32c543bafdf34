//! Board dumps from the Trello REST API.

use async_trait::async_trait;
use weekly_core::board::{BoardProvider, BOARD_DUMP_QUERY};
use weekly_core::{Result, WeeklyError};

pub struct TrelloBoards {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    token: Option<String>,
}

impl TrelloBoards {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        api_key: Option<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            token,
        }
    }
}

#[async_trait]
impl BoardProvider for TrelloBoards {
    async fn fetch_board(&self, board_id: &str) -> Result<String> {
        let (Some(key), Some(token)) = (self.api_key.as_deref(), self.token.as_deref()) else {
            return Err(WeeklyError::MissingCredentials(
                "TRELLO_API_KEY/TRELLO_TOKEN".to_string(),
            ));
        };

        let resp = self
            .http
            .get(format!("{}/boards/{board_id}", self.base_url))
            .query(&[("key", key), ("token", token)])
            .query(BOARD_DUMP_QUERY)
            .send()
            .await
            .map_err(|e| WeeklyError::BoardFetch {
                status: 502,
                body: e.to_string(),
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| WeeklyError::BoardFetch {
            status: 502,
            body: e.to_string(),
        })?;
        if !status.is_success() {
            return Err(WeeklyError::BoardFetch {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn boards(url: &str) -> TrelloBoards {
        TrelloBoards::new(
            reqwest::Client::new(),
            url,
            Some("key-1".into()),
            Some("tok-1".into()),
        )
    }

    #[tokio::test]
    async fn fetches_full_board_dump() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/boards/b1")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("key".into(), "key-1".into()),
                Matcher::UrlEncoded("token".into(), "tok-1".into()),
                Matcher::UrlEncoded("cards".into(), "all".into()),
                Matcher::UrlEncoded("checklists".into(), "all".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"name":"Sprint 12","cards":[]}"#)
            .create_async()
            .await;

        let dump = boards(&server.url()).fetch_board("b1").await.unwrap();
        assert_eq!(dump, r#"{"name":"Sprint 12","cards":[]}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn upstream_error_keeps_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/boards/nope")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body("The requested resource was not found.")
            .create_async()
            .await;

        let err = boards(&server.url()).fetch_board("nope").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Trello error 404: The requested resource was not found."
        );
    }

    #[tokio::test]
    async fn missing_credentials() {
        let b = TrelloBoards::new(reqwest::Client::new(), "http://127.0.0.1:9", None, None);
        let err = b.fetch_board("b1").await.unwrap_err();
        assert!(matches!(err, WeeklyError::MissingCredentials(_)));
    }
}
