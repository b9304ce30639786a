use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use quill_core::{
    ClientConfig, DraftField, DraftPost, InsertPolicy, Operation, Post, PostCollection, PostId,
};

use crate::{SyncError, SyncResult};

/// Lifecycle of the local post list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// No list has been requested yet.
    #[default]
    Uninitialized,
    /// A list call is outstanding.
    Loading,
    /// The list reflects the last applied response. Failures also land here.
    Ready,
}

/// Calls currently outstanding against the collection.
#[derive(Debug, Default)]
struct InFlight {
    /// A list call is outstanding
    list: bool,
    /// A create call is outstanding
    create: bool,
    /// Ids with an outstanding delete call
    deletes: HashSet<PostId>,
}

/// Everything the synchronizer owns.
#[derive(Debug, Default)]
struct SyncState {
    /// Lifecycle phase
    phase: Phase,
    /// Local snapshot of the server list
    posts: Vec<Post>,
    /// Unsaved form input
    draft: DraftPost,
    /// Outstanding calls
    in_flight: InFlight,
}

/// Lock the state, recovering it if a previous holder panicked.
fn lock(state: &Mutex<SyncState>) -> MutexGuard<'_, SyncState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Which in-flight slot a call occupies.
enum Slot {
    /// The list slot
    List,
    /// The create slot
    Create,
    /// The delete slot for one id
    Delete(PostId),
}

/// Occupies an in-flight slot until dropped, so an abandoned call frees it too.
struct PendingCall<'state> {
    /// State holding the slot
    state: &'state Mutex<SyncState>,
    /// Slot to release
    slot: Slot,
}

impl Drop for PendingCall<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        match &self.slot {
            Slot::List => {
                state.in_flight.list = false;
                if state.phase == Phase::Loading {
                    state.phase = Phase::Ready;
                }
            }
            Slot::Create => state.in_flight.create = false,
            Slot::Delete(id) => {
                state.in_flight.deletes.remove(id);
            }
        }
    }
}

/// Insert a created post, replacing any local entry that already carries its id.
fn merge_created(posts: &mut Vec<Post>, post: Post, policy: InsertPolicy) {
    if let Some(existing) = posts.iter_mut().find(|known| known.id == post.id) {
        *existing = post;
        return;
    }
    match policy {
        InsertPolicy::Append => posts.push(post),
        InsertPolicy::Prepend => posts.insert(0, post),
    }
}

/// Owns the local post list and draft, and keeps them in step with the server.
///
/// The list is only ever replaced or edited by applying a successful
/// `list`, `create` or `delete` response. A failed call leaves both the list
/// and the draft exactly as they were, logs the failure and returns it.
///
/// Operations take `&self` and may overlap. At most one list, one create and
/// one delete per id may be outstanding; a duplicate is rejected with
/// [`SyncError::InFlight`] without reaching the server.
pub struct PostListSynchronizer {
    /// Remote collection resource
    collection: Arc<dyn PostCollection>,
    /// Where created posts are inserted
    policy: InsertPolicy,
    /// Local state, never locked across an await
    state: Mutex<SyncState>,
}

impl PostListSynchronizer {
    /// Create a synchronizer with an empty list and draft.
    pub fn new(collection: Arc<dyn PostCollection>, policy: InsertPolicy) -> Self {
        Self {
            collection,
            policy,
            state: Mutex::new(SyncState::default()),
        }
    }

    /// Create a synchronizer using the insert policy from configuration.
    pub fn from_config(collection: Arc<dyn PostCollection>, config: &ClientConfig) -> Self {
        Self::new(collection, config.insert_policy)
    }

    /// Fetch the server list and replace the local one with it.
    ///
    /// Not retried on failure; calling it again issues a fresh list call.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InFlight`] if a list call is outstanding, or
    /// [`SyncError::Remote`] if the call fails. Either way local posts are unchanged.
    pub async fn initialize(&self) -> SyncResult<()> {
        let _pending = {
            let mut state = lock(&self.state);
            if state.in_flight.list {
                return Err(SyncError::InFlight(Operation::List));
            }
            state.in_flight.list = true;
            state.phase = Phase::Loading;
            self.pending(Slot::List)
        };

        tracing::debug!("Fetching posts from {}", self.collection.name());
        let result = self.collection.list().await;

        let mut state = lock(&self.state);
        state.phase = Phase::Ready;
        match result {
            Ok(posts) => {
                tracing::info!("Loaded {} posts", posts.len());
                state.posts = posts;
                Ok(())
            }
            Err(error) => {
                tracing::warn!("Error fetching posts: {error}");
                Err(SyncError::Remote {
                    operation: Operation::List,
                    source: error,
                })
            }
        }
    }

    /// Set one draft field. Purely local.
    pub fn update_draft_field(&self, field: DraftField, value: impl Into<String>) {
        lock(&self.state).draft.set(field, value.into());
    }

    /// Set a draft field by its form name, `title` or `content`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownField`] for any other name.
    pub fn update_draft_field_named(&self, name: &str, value: impl Into<String>) -> SyncResult<()> {
        let field = name
            .parse::<DraftField>()
            .map_err(|_| SyncError::UnknownField(name.to_owned()))?;
        self.update_draft_field(field, value);
        Ok(())
    }

    /// Create a post from the draft, insert it locally and clear the draft.
    ///
    /// The created post is placed according to the insert policy, or replaces a
    /// local entry with the same id if a concurrent list already brought it in.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::IncompleteDraft`] if either field is blank,
    /// [`SyncError::InFlight`] if a create is outstanding, or
    /// [`SyncError::Remote`] if the call fails. On error the list and the
    /// draft are unchanged.
    pub async fn submit_draft(&self) -> SyncResult<Post> {
        let (draft, _pending) = {
            let mut state = lock(&self.state);
            if !state.draft.is_complete() {
                return Err(SyncError::IncompleteDraft);
            }
            if state.in_flight.create {
                return Err(SyncError::InFlight(Operation::Create));
            }
            state.in_flight.create = true;
            (state.draft.clone(), self.pending(Slot::Create))
        };

        tracing::debug!("Creating post '{}'", draft.title);
        let result = self.collection.create(&draft).await;

        match result {
            Ok(post) => {
                tracing::info!("Created post {}", post.id);
                let mut state = lock(&self.state);
                merge_created(&mut state.posts, post.clone(), self.policy);
                state.draft.clear();
                Ok(post)
            }
            Err(error) => {
                tracing::warn!("Error adding post: {error}");
                Err(SyncError::Remote {
                    operation: Operation::Create,
                    source: error,
                })
            }
        }
    }

    /// Delete a post on the server, then drop it from the local list.
    ///
    /// Issued immediately, with no confirmation step.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InFlight`] if a delete of the same id is
    /// outstanding, or [`SyncError::Remote`] if the call fails. On error the
    /// list is unchanged.
    pub async fn delete_post(&self, id: &PostId) -> SyncResult<()> {
        let _pending = {
            let mut state = lock(&self.state);
            if !state.in_flight.deletes.insert(id.clone()) {
                return Err(SyncError::InFlight(Operation::Delete));
            }
            self.pending(Slot::Delete(id.clone()))
        };

        tracing::debug!("Deleting post {id}");
        let result = self.collection.delete(id).await;

        match result {
            Ok(()) => {
                tracing::info!("Deleted post {id}");
                lock(&self.state).posts.retain(|post| &post.id != id);
                Ok(())
            }
            Err(error) => {
                tracing::warn!("Error deleting post {id}: {error}");
                Err(SyncError::Remote {
                    operation: Operation::Delete,
                    source: error,
                })
            }
        }
    }

    /// Snapshot of the local post list.
    #[must_use]
    pub fn posts(&self) -> Vec<Post> {
        lock(&self.state).posts.clone()
    }

    /// Snapshot of the draft.
    #[must_use]
    pub fn draft(&self) -> DraftPost {
        lock(&self.state).draft.clone()
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        lock(&self.state).phase
    }

    /// Whether any call of `operation` is outstanding.
    #[must_use]
    pub fn is_pending(&self, operation: Operation) -> bool {
        let state = lock(&self.state);
        match operation {
            Operation::List => state.in_flight.list,
            Operation::Create => state.in_flight.create,
            Operation::Delete => !state.in_flight.deletes.is_empty(),
        }
    }

    /// Whether `submit_draft` would reach the server right now.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        let state = lock(&self.state);
        state.draft.is_complete() && !state.in_flight.create
    }

    /// Where created posts are inserted.
    #[must_use]
    pub const fn insert_policy(&self) -> InsertPolicy {
        self.policy
    }

    fn pending(&self, slot: Slot) -> PendingCall<'_> {
        PendingCall {
            state: &self.state,
            slot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Post> {
        vec![Post::new("1", "One", "first"), Post::new("2", "Two", "second")]
    }

    #[test]
    fn test_merge_created_appends() {
        let mut posts = sample();
        merge_created(&mut posts, Post::new("3", "Three", "third"), InsertPolicy::Append);
        let ids: Vec<&str> = posts.iter().map(|post| post.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn test_merge_created_prepends() {
        let mut posts = sample();
        merge_created(&mut posts, Post::new("3", "Three", "third"), InsertPolicy::Prepend);
        let ids: Vec<&str> = posts.iter().map(|post| post.id.as_str()).collect();
        assert_eq!(ids, ["3", "1", "2"]);
    }

    #[test]
    fn test_merge_created_replaces_known_id() {
        let mut posts = sample();
        merge_created(&mut posts, Post::new("2", "Two", "edited"), InsertPolicy::Prepend);
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[1], Post::new("2", "Two", "edited"));
    }

    #[test]
    fn test_pending_call_releases_slot_on_drop() {
        let state = Mutex::new(SyncState::default());
        {
            let mut guard = lock(&state);
            guard.in_flight.list = true;
            guard.phase = Phase::Loading;
            guard.in_flight.deletes.insert(PostId::from("9"));
        }

        drop(PendingCall {
            state: &state,
            slot: Slot::List,
        });
        drop(PendingCall {
            state: &state,
            slot: Slot::Delete(PostId::from("9")),
        });

        let guard = lock(&state);
        assert!(!guard.in_flight.list);
        assert_eq!(guard.phase, Phase::Ready);
        assert!(guard.in_flight.deletes.is_empty());
    }
}
