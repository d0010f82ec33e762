use scrivener_core::{DomainError, DomainResult};

use crate::editor::Editor;

/// Commands that can be invoked on an existing editor.
///
/// Creation is not a variant: it needs a fresh identity and goes through
/// [`Editor::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    AppendText { text: String, position: Option<i64> },
    DeleteText { position: i64, length: i64 },
    Delete,
}

impl EditorCommand {
    /// Build a command from its name and string arguments.
    ///
    /// | name          | args                  |
    /// |---------------|-----------------------|
    /// | `append`      | `<text>`              |
    /// | `insert`      | `<position> <text>`   |
    /// | `delete-text` | `<position> <length>` |
    /// | `delete`      |                       |
    ///
    /// Text arguments after the first are joined with single spaces.
    pub fn parse(name: &str, args: &[&str]) -> DomainResult<Self> {
        match name {
            "append" => {
                if args.is_empty() {
                    return Err(DomainError::validation("append expects <text>"));
                }
                Ok(Self::AppendText {
                    text: args.join(" "),
                    position: None,
                })
            }
            "insert" => match args {
                [position, rest @ ..] if !rest.is_empty() => Ok(Self::AppendText {
                    text: rest.join(" "),
                    position: Some(parse_number("position", position)?),
                }),
                _ => Err(DomainError::validation("insert expects <position> <text>")),
            },
            "delete-text" => match args {
                [position, length] => Ok(Self::DeleteText {
                    position: parse_number("position", position)?,
                    length: parse_number("length", length)?,
                }),
                _ => Err(DomainError::validation(
                    "delete-text expects <position> <length>",
                )),
            },
            "delete" if args.is_empty() => Ok(Self::Delete),
            "delete" => Err(DomainError::validation("delete takes no arguments")),
            other => Err(DomainError::validation(format!("unknown command '{other}'"))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::AppendText { position: None, .. } => "append",
            Self::AppendText { .. } => "insert",
            Self::DeleteText { .. } => "delete-text",
            Self::Delete => "delete",
        }
    }
}

fn parse_number(what: &str, raw: &str) -> DomainResult<i64> {
    raw.trim()
        .parse()
        .map_err(|_| DomainError::validation(format!("{what} must be a number (got '{raw}')")))
}

impl Editor {
    /// Route a command to the matching command method.
    pub fn execute(&mut self, command: &EditorCommand) -> DomainResult<()> {
        match command {
            EditorCommand::AppendText { text, position } => self.append_text(text, *position),
            EditorCommand::DeleteText { position, length } => self.delete_text(*position, *length),
            EditorCommand::Delete => self.delete(),
        }
    }
}
