//! Mock collection resource for testing synchronization.
//!
//! Keeps the "server" side of the collection in memory, assigns ids on
//! create, and lets tests script failures or hold a call open until released.
//! Every call is recorded for verification.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use quill_core::{DraftPost, Error, Operation, Post, PostCollection, PostId, Result};
use tokio::sync::Notify;

/// A call received by the mock, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `list()`
    List,
    /// `create(draft)`
    Create(DraftPost),
    /// `delete(id)`
    Delete(PostId),
}

impl MockCall {
    /// Which operation this call was.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::List => Operation::List,
            Self::Create(_) => Operation::Create,
            Self::Delete(_) => Operation::Delete,
        }
    }
}

/// Server-side state shared by all clones of one mock.
struct MockState {
    /// Stored posts in server order
    posts: Vec<Post>,
    /// Next id handed out by `create`
    next_id: u64,
    /// Operations that currently fail
    failing: HashSet<Operation>,
    /// Operations that wait for a permit before answering
    holds: HashMap<Operation, Arc<Notify>>,
    /// Call history for verification
    calls: Vec<MockCall>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            posts: Vec::new(),
            next_id: 1,
            failing: HashSet::new(),
            holds: HashMap::new(),
            calls: Vec::new(),
        }
    }
}

/// In-memory [`PostCollection`] with scriptable failures.
///
/// Clones share state, so a test can keep one handle for inspection while the
/// synchronizer owns another.
#[derive(Clone, Default)]
pub struct MockPostCollection {
    /// Shared server-side state
    state: Arc<Mutex<MockState>>,
}

impl MockPostCollection {
    /// Create an empty collection; the first created post gets id `1`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored posts.
    ///
    /// Ids assigned afterwards continue after the largest numeric id present.
    #[must_use]
    pub fn with_posts(self, posts: Vec<Post>) -> Self {
        {
            let mut state = self.state();
            state.next_id = posts
                .iter()
                .filter_map(|post| post.id.as_str().parse::<u64>().ok())
                .max()
                .map_or(1, |largest| largest + 1);
            state.posts = posts;
        }
        self
    }

    /// Make `operation` fail until [`Self::set_failing`] turns it back off.
    #[must_use]
    pub fn failing(self, operation: Operation) -> Self {
        self.set_failing(operation, true);
        self
    }

    /// Toggle failure of `operation` on a live mock.
    pub fn set_failing(&self, operation: Operation, failing: bool) {
        let mut state = self.state();
        if failing {
            state.failing.insert(operation);
        } else {
            state.failing.remove(&operation);
        }
    }

    /// Hold the reply to every later call of `operation` until a permit is given.
    ///
    /// Each `notify_one` on the returned handle lets one held call answer.
    /// A held `create` or `delete` is applied when the call arrives and only
    /// its reply waits; a held `list` reads the posts when it is released.
    pub fn hold(&self, operation: Operation) -> Arc<Notify> {
        let mut state = self.state();
        Arc::clone(state.holds.entry(operation).or_default())
    }

    /// Posts currently stored on the "server".
    #[must_use]
    pub fn posts(&self) -> Vec<Post> {
        self.state().posts.clone()
    }

    /// Get the call history.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    /// Number of calls made for one operation.
    #[must_use]
    pub fn call_count(&self, operation: Operation) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    /// Clear the call history.
    pub fn clear_history(&self) {
        self.state().calls.clear();
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Record the call and look up how it should be answered.
    fn receive(&self, call: MockCall) -> Reply {
        let operation = call.operation();
        let mut state = self.state();
        state.calls.push(call);
        Reply {
            operation,
            hold: state.holds.get(&operation).cloned(),
            fails: state.failing.contains(&operation),
        }
    }
}

/// Scripted answer to one received call.
struct Reply {
    /// Operation being answered
    operation: Operation,
    /// Permit source the reply waits on, if held
    hold: Option<Arc<Notify>>,
    /// Whether the call fails instead of being applied
    fails: bool,
}

impl Reply {
    /// Wait for a permit if the reply is held.
    async fn wait(&self) {
        if let Some(notify) = &self.hold {
            notify.notified().await;
        }
    }

    fn failure<T>(&self) -> Result<T> {
        Err(Error::Status {
            operation: self.operation,
            status: 503,
            body: "mock failure".to_owned(),
        })
    }
}

#[async_trait]
impl PostCollection for MockPostCollection {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn list(&self) -> Result<Vec<Post>> {
        let reply = self.receive(MockCall::List);
        reply.wait().await;
        if reply.fails {
            return reply.failure();
        }
        Ok(self.posts())
    }

    async fn create(&self, draft: &DraftPost) -> Result<Post> {
        let reply = self.receive(MockCall::Create(draft.clone()));
        if reply.fails {
            reply.wait().await;
            return reply.failure();
        }

        let post = {
            let mut state = self.state();
            let post = Post::new(
                state.next_id.to_string(),
                draft.title.clone(),
                draft.content.clone(),
            );
            state.next_id += 1;
            state.posts.push(post.clone());
            post
        };
        reply.wait().await;
        Ok(post)
    }

    async fn delete(&self, id: &PostId) -> Result<()> {
        let reply = self.receive(MockCall::Delete(id.clone()));
        if reply.fails {
            reply.wait().await;
            return reply.failure();
        }

        let removed = {
            let mut state = self.state();
            let before = state.posts.len();
            state.posts.retain(|post| &post.id != id);
            state.posts.len() != before
        };
        reply.wait().await;
        if !removed {
            return Err(Error::Status {
                operation: Operation::Delete,
                status: 404,
                body: format!("no post with id {id}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_assigns_sequential_ids() {
        let mock = MockPostCollection::new();

        let first = mock.create(&DraftPost::new("A", "a")).await.unwrap();
        let second = mock.create(&DraftPost::new("B", "b")).await.unwrap();

        assert_eq!(first.id.as_str(), "1");
        assert_eq!(second.id.as_str(), "2");
        assert_eq!(mock.list().await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn test_mock_ids_continue_after_seeded_posts() {
        let mock = MockPostCollection::new().with_posts(vec![
            Post::new("4", "Old", "post"),
            Post::new("abc", "Other", "post"),
        ]);

        let created = mock.create(&DraftPost::new("New", "post")).await.unwrap();
        assert_eq!(created.id.as_str(), "5");
    }

    #[tokio::test]
    async fn test_mock_scripted_failure() {
        let mock = MockPostCollection::new()
            .with_posts(vec![Post::new("1", "T", "C")])
            .failing(Operation::Delete);

        let error = mock.delete(&PostId::from("1")).await.unwrap_err();
        assert!(error.is_remote());
        assert_eq!(mock.posts().len(), 1);

        mock.set_failing(Operation::Delete, false);
        mock.delete(&PostId::from("1")).await.unwrap();
        assert!(mock.posts().is_empty());
    }

    #[tokio::test]
    async fn test_mock_delete_unknown_id() {
        let mock = MockPostCollection::new();
        let error = mock.delete(&PostId::from("missing")).await.unwrap_err();
        assert!(matches!(error, Error::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_mock_call_history() {
        let mock = MockPostCollection::new();

        mock.list().await.unwrap();
        mock.create(&DraftPost::new("T", "C")).await.unwrap();
        mock.delete(&PostId::from("1")).await.unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                MockCall::List,
                MockCall::Create(DraftPost::new("T", "C")),
                MockCall::Delete(PostId::from("1")),
            ]
        );
        assert_eq!(mock.call_count(Operation::Create), 1);

        mock.clear_history();
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_mock_hold_waits_for_permit() {
        let mock = MockPostCollection::new();
        let release = mock.hold(Operation::List);

        let (listed, ()) = tokio::join!(mock.list(), async {
            tokio::task::yield_now().await;
            assert_eq!(mock.call_count(Operation::List), 1);
            release.notify_one();
        });

        assert!(listed.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mock_held_create_is_stored_before_reply() {
        let mock = MockPostCollection::new();
        let release = mock.hold(Operation::Create);

        let draft = DraftPost::new("T", "C");
        let (created, ()) = tokio::join!(mock.create(&draft), async {
            assert_eq!(mock.posts(), vec![Post::new("1", "T", "C")]);
            release.notify_one();
        });

        assert_eq!(created.unwrap(), Post::new("1", "T", "C"));
    }
}
