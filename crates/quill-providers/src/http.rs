use async_trait::async_trait;
use quill_core::{ClientConfig, DraftPost, Error, Operation, Post, PostCollection, PostId, Result};
use reqwest::{Client, Response, Url};

/// Path segment of the collection resource under the base URL.
const COLLECTION_SEGMENT: &str = "posts";

/// Client for a REST backend exposing `GET/POST /posts` and `DELETE /posts/{id}`.
pub struct HttpPostCollection {
    /// HTTP client for API requests.
    client: Client,
    /// Base address; `/posts` is appended to its path.
    base_url: Url,
}

impl HttpPostCollection {
    /// Creates a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base_url: config.parsed_base_url()?,
        })
    }

    /// Creates a client around an existing `reqwest` client.
    #[must_use]
    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Base address requests are issued against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/posts`, or `{base}/posts/{id}` when an id is given.
    ///
    /// The id is percent-encoded as a single path segment.
    fn resource_url(&self, id: Option<&PostId>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                Error::Config(format!("base_url '{}' cannot carry a path", self.base_url))
            })?;
            segments.pop_if_empty().push(COLLECTION_SEGMENT);
            if let Some(post_id) = id {
                segments.push(post_id.as_str());
            }
        }
        Ok(url)
    }
}

/// Turn a non-2xx response into [`Error::Status`], keeping its body for diagnostics.
async fn ensure_success(operation: Operation, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::Status {
        operation,
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl PostCollection for HttpPostCollection {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn list(&self) -> Result<Vec<Post>> {
        let url = self.resource_url(None)?;
        tracing::debug!("GET {url}");

        let response = self.client.get(url).send().await?;
        let body = ensure_success(Operation::List, response).await?.bytes().await?;

        Ok(serde_json::from_slice(&body)?)
    }

    async fn create(&self, draft: &DraftPost) -> Result<Post> {
        let url = self.resource_url(None)?;
        tracing::debug!("POST {url}");

        let response = self.client.post(url).json(draft).send().await?;
        let body = ensure_success(Operation::Create, response)
            .await?
            .bytes()
            .await?;

        Ok(serde_json::from_slice(&body)?)
    }

    async fn delete(&self, id: &PostId) -> Result<()> {
        let url = self.resource_url(Some(id))?;
        tracing::debug!("DELETE {url}");

        let response = self.client.delete(url).send().await?;
        ensure_success(Operation::Delete, response).await?;

        Ok(())
    }
}
