use async_trait::async_trait;

use crate::{DraftPost, Post, PostId, Result};

/// Client for the remote `/posts` collection resource.
///
/// Implementations hold no local post state; every call goes to the backend
/// and any failure is returned, never retried.
#[async_trait]
pub trait PostCollection: Send + Sync {
    /// Returns a short identifier for this client, used in logs.
    fn name(&self) -> &'static str;

    /// Fetches every post in server order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with a
    /// non-success status, or the body is not a JSON array of posts.
    async fn list(&self) -> Result<Vec<Post>>;

    /// Creates a post from the draft and returns it with its server-assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with a
    /// non-success status, or the body is not a JSON post.
    async fn create(&self, draft: &DraftPost) -> Result<Post>;

    /// Deletes the post with the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server answers with a
    /// non-success status.
    async fn delete(&self, id: &PostId) -> Result<()>;
}
