use async_trait::async_trait;
use parcelchat_types::{
    AdminReplyRequest, AdminReplyResponse, DeleteThreadResponse, ErrorBody, MessageListResponse,
    MessageView, PostMessageRequest, PostMessageResponse, StatusUpdateRequest,
    StatusUpdateResponse, ThreadDetailResponse, ThreadListResponse, ThreadStatus, ThreadView,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::poller::MessageSource;

/// Shared HTTP plumbing for the customer and admin clients
#[derive(Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
    base_url: Url,
    admin_token: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::Config(format!("invalid base url: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!("{} cannot be a base url", base_url)));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(Self {
            http_client,
            base_url,
            admin_token: config.admin_token.clone(),
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str], admin: bool) -> reqwest::RequestBuilder {
        let mut req = self.http_client.request(method, self.url(segments));
        if admin {
            if let Some(token) = &self.admin_token {
                req = req.header(AUTHORIZATION, format!("Bearer {}", token));
            }
        }
        req
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T> {
        let response = req.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(error_from_response(status, &bytes));
        }
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
        body: &B,
    ) -> Result<T> {
        self.send(req.json(body)).await
    }
}

fn error_from_response(status: StatusCode, body: &[u8]) -> ClientError {
    let parsed: Option<ErrorBody> = serde_json::from_slice(body).ok();
    let message = parsed
        .as_ref()
        .map(|b| b.error.clone())
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());

    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound,
        StatusCode::BAD_REQUEST => ClientError::Validation {
            message,
            fields: parsed.and_then(|b| b.fields).unwrap_or_default(),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ClientError::Unauthorized(status.as_u16())
        }
        _ => ClientError::Http {
            status: status.as_u16(),
            message,
        },
    }
}

/// Operations available to the public widget
#[async_trait]
pub trait CustomerApi: MessageSource {
    async fn post_message(&self, request: &PostMessageRequest) -> Result<PostMessageResponse>;

    async fn close_thread(&self, thread_id: &str) -> Result<StatusUpdateResponse>;
}

/// Operations available to the admin console
#[async_trait]
pub trait AdminApi: MessageSource {
    async fn list_threads(&self, status: Option<ThreadStatus>) -> Result<Vec<ThreadView>>;

    async fn get_thread(&self, thread_id: &str) -> Result<ThreadDetailResponse>;

    async fn reply(&self, thread_id: &str, text: &str) -> Result<AdminReplyResponse>;

    async fn set_status(&self, thread_id: &str, status: ThreadStatus) -> Result<StatusUpdateResponse>;

    async fn delete_thread(&self, thread_id: &str) -> Result<DeleteThreadResponse>;
}

/// Client for the public chat routes
#[derive(Clone)]
pub struct CustomerClient {
    transport: HttpTransport,
}

impl CustomerClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(config)?,
        })
    }
}

#[async_trait]
impl MessageSource for CustomerClient {
    async fn fetch_messages(&self, thread_id: &str) -> Result<Vec<MessageView>> {
        let req = self
            .transport
            .request(Method::GET, &["chat", "threads", thread_id], false);
        let body: MessageListResponse = self.transport.send(req).await?;
        Ok(body.messages)
    }
}

#[async_trait]
impl CustomerApi for CustomerClient {
    async fn post_message(&self, request: &PostMessageRequest) -> Result<PostMessageResponse> {
        let req = self
            .transport
            .request(Method::POST, &["chat", "webhook"], false);
        self.transport.send_json(req, request).await
    }

    async fn close_thread(&self, thread_id: &str) -> Result<StatusUpdateResponse> {
        let req = self
            .transport
            .request(Method::PATCH, &["chat", "threads", thread_id], false);
        let body = StatusUpdateRequest {
            status: Some(ThreadStatus::Closed),
        };
        self.transport.send_json(req, &body).await
    }
}

/// Client for the admin chat routes; requires an admin token
#[derive(Clone)]
pub struct AdminClient {
    transport: HttpTransport,
}

impl AdminClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        if config.admin_token.is_none() {
            return Err(ClientError::Config("admin_token is required".to_string()));
        }
        Ok(Self {
            transport: HttpTransport::new(config)?,
        })
    }
}

#[async_trait]
impl MessageSource for AdminClient {
    async fn fetch_messages(&self, thread_id: &str) -> Result<Vec<MessageView>> {
        Ok(self.get_thread(thread_id).await?.messages)
    }
}

#[async_trait]
impl AdminApi for AdminClient {
    async fn list_threads(&self, status: Option<ThreadStatus>) -> Result<Vec<ThreadView>> {
        let mut req = self
            .transport
            .request(Method::GET, &["admin", "chat", "threads"], true);
        if let Some(status) = status {
            req = req.query(&[("status", status.as_str())]);
        }
        let body: ThreadListResponse = self.transport.send(req).await?;
        Ok(body.threads)
    }

    async fn get_thread(&self, thread_id: &str) -> Result<ThreadDetailResponse> {
        let req = self
            .transport
            .request(Method::GET, &["admin", "chat", "threads", thread_id], true);
        self.transport.send(req).await
    }

    async fn reply(&self, thread_id: &str, text: &str) -> Result<AdminReplyResponse> {
        let req = self
            .transport
            .request(Method::POST, &["admin", "chat", "threads", thread_id], true);
        let body = AdminReplyRequest {
            message: text.to_string(),
        };
        self.transport.send_json(req, &body).await
    }

    async fn set_status(&self, thread_id: &str, status: ThreadStatus) -> Result<StatusUpdateResponse> {
        let req = self
            .transport
            .request(Method::PATCH, &["admin", "chat", "threads", thread_id], true);
        let body = StatusUpdateRequest {
            status: Some(status),
        };
        self.transport.send_json(req, &body).await
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<DeleteThreadResponse> {
        let req = self
            .transport
            .request(Method::DELETE, &["admin", "chat", "threads", thread_id], true);
        self.transport.send(req).await
    }
}
