//! Line-oriented interactive session: edit a draft, submit it, delete posts.
//!
//! Failures are logged and the session carries on with its last good state.

use anyhow::Result;
use quill_core::{DraftField, PostId};
use quill_sync::PostListSynchronizer;
use tokio::io::{AsyncBufReadExt as _, BufReader, stdin};

use crate::handlers::show_posts;

const HELP_TEXT: &str = "\
Commands:
    list                 Show the local post list
    refresh              Fetch the list from the backend again
    title <text>         Set the draft title
    content <text>       Set the draft content
    set <field> <text>   Set a draft field by name
    draft                Show the draft
    submit               Create a post from the draft
    delete <id>          Delete a post
    help                 Show this help
    quit                 Leave the session

Text is taken as typed, trailing spaces included. Inside text, \\n starts a
new line and \\\\ is a single backslash.";

/// One parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum ShellCommand {
    List,
    Refresh,
    Set { field: String, value: String },
    Draft,
    Submit,
    Delete(PostId),
    Help,
    Quit,
    Empty,
    Invalid(String),
}

/// Expand `\n` to a newline and `\\` to a backslash; other escapes stay as typed.
fn unescape(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            unescaped.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => unescaped.push('\n'),
            Some('\\') => unescaped.push('\\'),
            Some(other) => {
                unescaped.push('\\');
                unescaped.push(other);
            }
            None => unescaped.push('\\'),
        }
    }
    unescaped
}

fn parse_command(line: &str) -> ShellCommand {
    let line = line.trim_start();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim_start()));

    match word {
        "" => ShellCommand::Empty,
        "list" => ShellCommand::List,
        "refresh" => ShellCommand::Refresh,
        "title" | "content" => ShellCommand::Set {
            field: word.to_owned(),
            value: unescape(rest),
        },
        "set" => match rest.split_once(char::is_whitespace) {
            Some((field, value)) => ShellCommand::Set {
                field: field.to_owned(),
                value: unescape(value.trim_start()),
            },
            None if !rest.is_empty() => ShellCommand::Set {
                field: rest.to_owned(),
                value: String::new(),
            },
            None => ShellCommand::Invalid("set needs a field name".to_owned()),
        },
        "draft" => ShellCommand::Draft,
        "submit" => ShellCommand::Submit,
        "delete" if rest.trim_end().is_empty() => {
            ShellCommand::Invalid("delete needs a post id".to_owned())
        }
        "delete" => ShellCommand::Delete(PostId::from(rest.trim_end())),
        "help" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => ShellCommand::Invalid(format!("unknown command '{other}'")),
    }
}

/// Run the session until `quit` or end of input.
///
/// # Errors
/// Returns an error only if stdin cannot be read
pub async fn run_shell(sync: &PostListSynchronizer) -> Result<()> {
    if let Err(error) = sync.initialize().await {
        tracing::warn!("Starting with an empty list: {error}");
    }
    show_posts(&sync.posts());
    tracing::info!("{HELP_TEXT}");

    let mut lines = BufReader::new(stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            ShellCommand::Quit => break,
            ShellCommand::Empty => {}
            ShellCommand::Help => tracing::info!("{HELP_TEXT}"),
            ShellCommand::Invalid(reason) => tracing::warn!("{reason}; type 'help'"),
            ShellCommand::List => show_posts(&sync.posts()),
            ShellCommand::Refresh => {
                if sync.initialize().await.is_ok() {
                    show_posts(&sync.posts());
                }
            }
            ShellCommand::Set { field, value } => {
                if let Err(error) = sync.update_draft_field_named(&field, value) {
                    tracing::warn!("{error}");
                }
            }
            ShellCommand::Draft => {
                let draft = sync.draft();
                if draft.is_empty() {
                    tracing::info!("Draft is empty");
                }
                for field in [DraftField::Title, DraftField::Content] {
                    tracing::info!("{field}: {}", draft.get(field));
                }
            }
            ShellCommand::Submit => match sync.submit_draft().await {
                Ok(post) => {
                    tracing::info!("Added post {}", post.id);
                    show_posts(&sync.posts());
                }
                Err(error) => tracing::warn!("{error}"),
            },
            ShellCommand::Delete(id) => {
                if sync.delete_post(&id).await.is_ok() {
                    show_posts(&sync.posts());
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_field_shortcuts() {
        assert_eq!(
            parse_command("title Hello there"),
            ShellCommand::Set {
                field: "title".to_owned(),
                value: "Hello there".to_owned()
            }
        );
        assert_eq!(
            parse_command("content line one\\nline two"),
            ShellCommand::Set {
                field: "content".to_owned(),
                value: "line one\nline two".to_owned()
            }
        );
    }

    #[test]
    fn test_parses_named_set() {
        assert_eq!(
            parse_command("set author  me"),
            ShellCommand::Set {
                field: "author".to_owned(),
                value: "me".to_owned()
            }
        );
        assert_eq!(
            parse_command("set title"),
            ShellCommand::Set {
                field: "title".to_owned(),
                value: String::new()
            }
        );
        assert!(matches!(parse_command("set"), ShellCommand::Invalid(_)));
    }

    #[test]
    fn test_parses_delete() {
        assert_eq!(
            parse_command("  delete 65f0c2a1  "),
            ShellCommand::Delete(PostId::from("65f0c2a1"))
        );
        assert!(matches!(parse_command("delete"), ShellCommand::Invalid(_)));
    }

    #[test]
    fn test_parses_simple_commands() {
        assert_eq!(parse_command(""), ShellCommand::Empty);
        assert_eq!(parse_command("list"), ShellCommand::List);
        assert_eq!(parse_command("refresh"), ShellCommand::Refresh);
        assert_eq!(parse_command("draft"), ShellCommand::Draft);
        assert_eq!(parse_command("submit"), ShellCommand::Submit);
        assert_eq!(parse_command("help"), ShellCommand::Help);
        assert_eq!(parse_command("exit"), ShellCommand::Quit);
        assert!(matches!(parse_command("publish"), ShellCommand::Invalid(_)));
    }

    #[test]
    fn test_field_value_keeps_trailing_whitespace() {
        assert_eq!(
            parse_command("title  Hello  "),
            ShellCommand::Set {
                field: "title".to_owned(),
                value: "Hello  ".to_owned()
            }
        );
        assert_eq!(
            parse_command("set content indented\\n  "),
            ShellCommand::Set {
                field: "content".to_owned(),
                value: "indented\n  ".to_owned()
            }
        );
    }

    #[test]
    fn test_escaped_backslash_is_literal() {
        assert_eq!(unescape("a\\\\nb"), "a\\nb");
        assert_eq!(unescape("path\\to"), "path\\to");
        assert_eq!(unescape("trailing\\"), "trailing\\");
        assert_eq!(unescape("two\\nlines"), "two\nlines");
    }
}
