use core::fmt::{self, Display, Formatter};
use core::result::Result as CoreResult;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::Error;

/// Server-assigned identity of a post.
///
/// Opaque to the client. Backends differ in how they emit ids, so both JSON
/// strings and JSON integers are accepted; integers keep their decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    /// Wrap an identifier received from the server or typed by a user.
    pub fn new<T: Into<String>>(id: T) -> Self {
        Self(id.into())
    }

    /// The identifier text, as sent in `DELETE /posts/{id}`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PostId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PostId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Wire forms an id may take.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPostId {
    /// Document-store and UUID style ids.
    Text(String),
    /// Auto-increment ids.
    Unsigned(u64),
    /// Auto-increment ids from backends that use signed columns.
    Signed(i64),
}

impl<'de> Deserialize<'de> for PostId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> CoreResult<Self, D::Error> {
        Ok(match RawPostId::deserialize(deserializer)? {
            RawPostId::Text(text) => Self(text),
            RawPostId::Unsigned(number) => Self(number.to_string()),
            RawPostId::Signed(number) => Self(number.to_string()),
        })
    }
}

/// A server-owned blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Server-assigned identity, immutable once created.
    #[serde(alias = "_id")]
    pub id: PostId,
    /// Post title.
    pub title: String,
    /// Post body.
    pub content: String,
}

impl Post {
    /// Build a post with the given identity.
    pub fn new<I, T, C>(id: I, title: T, content: C) -> Self
    where
        I: Into<PostId>,
        T: Into<String>,
        C: Into<String>,
    {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Editable fields of a [`DraftPost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    /// The `title` field.
    Title,
    /// The `content` field.
    Content,
}

impl DraftField {
    /// Field name as used in forms and in the create request body.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
        }
    }
}

impl Display for DraftField {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for DraftField {
    type Err = Error;

    fn from_str(name: &str) -> CoreResult<Self, Self::Err> {
        match name {
            "title" => Ok(Self::Title),
            "content" => Ok(Self::Content),
            other => Err(Error::UnknownField(other.to_owned())),
        }
    }
}

/// Unsaved local input for a post that does not exist yet.
///
/// Serializes to the `{title, content}` body of `POST /posts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPost {
    /// Draft title.
    pub title: String,
    /// Draft body.
    pub content: String,
}

impl DraftPost {
    /// Build a draft from both fields.
    pub fn new<T: Into<String>, C: Into<String>>(title: T, content: C) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Current value of one field.
    #[must_use]
    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Title => &self.title,
            DraftField::Content => &self.content,
        }
    }

    /// Replace one field.
    pub fn set(&mut self, field: DraftField, value: String) {
        match field {
            DraftField::Title => self.title = value,
            DraftField::Content => self.content = value,
        }
    }

    /// Whether both fields hold something other than whitespace.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.content.trim().is_empty()
    }

    /// Whether both fields are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.content.is_empty()
    }

    /// Reset both fields to empty.
    pub fn clear(&mut self) {
        self.title.clear();
        self.content.clear();
    }
}

/// The three calls issued against the collection resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `GET /posts`
    List,
    /// `POST /posts`
    Create,
    /// `DELETE /posts/{id}`
    Delete,
}

impl Display for Operation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Delete => "delete",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{from_str, json, to_value};

    #[test]
    fn test_post_accepts_string_id() {
        let post: Post = from_str(r#"{"id":"1","title":"Hello","content":"World"}"#).unwrap();
        assert_eq!(post, Post::new("1", "Hello", "World"));
    }

    #[test]
    fn test_post_accepts_document_store_id() {
        let post: Post =
            from_str(r#"{"_id":"65f0c2a1e4b0","title":"T","content":"C","__v":0}"#).unwrap();
        assert_eq!(post.id.as_str(), "65f0c2a1e4b0");
    }

    #[test]
    fn test_post_accepts_numeric_id() {
        let post: Post = from_str(r#"{"id":42,"title":"T","content":"C"}"#).unwrap();
        assert_eq!(post.id, PostId::from("42"));

        let negative: Post = from_str(r#"{"id":-3,"title":"T","content":"C"}"#).unwrap();
        assert_eq!(negative.id.as_str(), "-3");
    }

    #[test]
    fn test_post_rejects_missing_id() {
        assert!(from_str::<Post>(r#"{"title":"T","content":"C"}"#).is_err());
    }

    #[test]
    fn test_post_serializes_id_as_string() {
        let value = to_value(Post::new("7", "T", "C")).unwrap();
        assert_eq!(value, json!({"id": "7", "title": "T", "content": "C"}));
    }

    #[test]
    fn test_draft_body_has_no_identity() {
        let value = to_value(DraftPost::new("Hello", "World")).unwrap();
        assert_eq!(value, json!({"title": "Hello", "content": "World"}));
    }

    #[test]
    fn test_draft_field_parsing() {
        assert_eq!("title".parse::<DraftField>().unwrap(), DraftField::Title);
        assert_eq!("content".parse::<DraftField>().unwrap(), DraftField::Content);

        let error = "author".parse::<DraftField>().unwrap_err();
        assert!(matches!(error, Error::UnknownField(name) if name == "author"));
    }

    #[test]
    fn test_draft_completeness() {
        let mut draft = DraftPost::default();
        assert!(draft.is_empty());
        assert!(!draft.is_complete());

        draft.set(DraftField::Title, "Hello".to_owned());
        assert!(!draft.is_complete());

        draft.set(DraftField::Content, "   ".to_owned());
        assert!(!draft.is_complete());

        draft.set(DraftField::Content, "World".to_owned());
        assert!(draft.is_complete());
        assert_eq!(draft.get(DraftField::Title), "Hello");

        draft.clear();
        assert_eq!(draft, DraftPost::default());
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::List.to_string(), "list");
        assert_eq!(Operation::Create.to_string(), "create");
        assert_eq!(Operation::Delete.to_string(), "delete");
    }
}
