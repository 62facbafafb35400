use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use url::form_urlencoded;

use crate::board_page::parse_board_html;
use crate::{
    BoardPage, EntityFields, EntityId, EntityKind, FailureKind, RequestError, SubmitMode,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    /// Only the connect phase is bounded. An AI answer may take as long as
    /// the model needs.
    pub connect_timeout: Option<Duration>,
    pub max_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            connect_timeout: Some(Duration::from_secs(10)),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Every server endpoint the client talks to.
#[async_trait::async_trait]
pub trait HomenetApi: Send + Sync {
    /// `POST /ai/query`; the plain-text answer on 2xx.
    async fn ask(&self, prompt: &str) -> Result<String, RequestError>;

    /// `GET /{kind}-board`, parsed into cards and count.
    async fn load_board(&self, kind: EntityKind) -> Result<BoardPage, RequestError>;

    /// `POST /{kind}-board/add|edit`; the re-rendered card list.
    async fn submit_entity(
        &self,
        kind: EntityKind,
        mode: SubmitMode,
        fields: &EntityFields,
    ) -> Result<BoardPage, RequestError>;

    /// `DELETE /{kind}-board/delete/{id}`; any 2xx is success.
    async fn delete_entity(&self, kind: EntityKind, id: EntityId) -> Result<(), RequestError>;

    /// `GET /{kind}-board/random`; the body whatever the status.
    async fn random_entity(&self, kind: EntityKind) -> Result<String, RequestError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(settings: ClientSettings) -> Result<Self, RequestError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| RequestError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url, RequestError> {
        let joined = format!("{}{}", self.settings.base_url.trim_end_matches('/'), path);
        reqwest::Url::parse(&joined)
            .map_err(|err| RequestError::new(FailureKind::InvalidUrl, format!("{joined}: {err}")))
    }

    async fn post_form(
        &self,
        path: &str,
        body: String,
    ) -> Result<reqwest::Response, RequestError> {
        let url = self.endpoint(path)?;
        engine_debug!("POST {} ({} bytes)", url, body.len());
        self.client
            .post(url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, RequestError> {
        let url = self.endpoint(path)?;
        engine_debug!("GET {}", url);
        self.client.get(url).send().await.map_err(map_reqwest_error)
    }

    /// Reads the body, failing once it grows past `max_bytes`.
    async fn read_body(&self, response: reqwest::Response) -> Result<String, RequestError> {
        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, Some(content_len)));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, Some(next_len)));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[async_trait::async_trait]
impl HomenetApi for ReqwestClient {
    async fn ask(&self, prompt: &str) -> Result<String, RequestError> {
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("prompt", prompt)
            .finish();
        let response = self.post_form("/ai/query", body).await?;
        let response = require_success(response)?;
        let text = self.read_body(response).await?;
        engine_info!("AI response received, {} bytes", text.len());
        Ok(text)
    }

    async fn load_board(&self, kind: EntityKind) -> Result<BoardPage, RequestError> {
        let response = self.get(&format!("/{}-board", kind.slug())).await?;
        let response = require_success(response)?;
        let html = self.read_body(response).await?;
        Ok(parse_board_html(kind, &html))
    }

    async fn submit_entity(
        &self,
        kind: EntityKind,
        mode: SubmitMode,
        fields: &EntityFields,
    ) -> Result<BoardPage, RequestError> {
        if mode == SubmitMode::Edit && fields.id.is_none() {
            return Err(RequestError::new(
                FailureKind::InvalidUrl,
                format!("editing a {kind} requires an id"),
            ));
        }
        let body = encode_fields(kind, fields);
        let path = format!("/{}-board/{}", kind.slug(), mode.path_segment());
        let response = self.post_form(&path, body).await?;
        let response = require_success(response)?;
        let html = self.read_body(response).await?;
        Ok(parse_board_html(kind, &html))
    }

    async fn delete_entity(&self, kind: EntityKind, id: EntityId) -> Result<(), RequestError> {
        let url = self.endpoint(&format!("/{}-board/delete/{id}", kind.slug()))?;
        engine_debug!("DELETE {}", url);
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        require_success(response).map(|_| ())
    }

    async fn random_entity(&self, kind: EntityKind) -> Result<String, RequestError> {
        let response = self.get(&format!("/{}-board/random", kind.slug())).await?;
        let status = response.status();
        if !status.is_success() {
            engine_warn!("Random {} answered {}; showing body anyway", kind, status);
        }
        self.read_body(response).await
    }
}

/// Encodes add/edit form fields. The flag is sent as `on` only when set,
/// like an HTML checkbox.
pub fn encode_fields(kind: EntityKind, fields: &EntityFields) -> String {
    let mut form = form_urlencoded::Serializer::new(String::new());
    if let Some(id) = fields.id {
        form.append_pair("id", &id.to_string());
    }
    form.append_pair("title", fields.title.trim())
        .append_pair("year", fields.year.trim())
        .append_pair("genre", &fields.genre)
        .append_pair("streaming", &fields.streaming)
        .append_pair("notes", &fields.notes)
        .append_pair("imdb_link", &fields.imdb_link);
    if fields.flag {
        form.append_pair(kind.flag_field(), "on");
    }
    form.finish()
}

fn require_success(response: reqwest::Response) -> Result<reqwest::Response, RequestError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(RequestError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ))
    }
}

fn too_large(max_bytes: u64, actual: Option<u64>) -> RequestError {
    RequestError::new(
        FailureKind::TooLarge { max_bytes, actual },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        return RequestError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return RequestError::new(FailureKind::InvalidUrl, err.to_string());
    }
    RequestError::new(FailureKind::Network, err.to_string())
}
