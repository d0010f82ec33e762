//! Command session: one text line in, one response out.
//!
//! ```text
//! create <file>
//! append <id> <text>
//! insert <id> <pos> <text>
//! delete-text <id> <pos> <len>
//! delete <id>
//! list
//! show <id>
//! history <id>
//! rebuild
//! ```

use anyhow::{Context, anyhow, bail};

use scrivener_core::AggregateId;
use scrivener_editor::EditorCommand;
use scrivener_infra::{EditorConfig, Services};

pub struct Session {
    services: Services,
}

impl Session {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            services: Services::new(config),
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Run one input line. Blank lines and `#` comments produce no output.
    pub fn run_line(&self, line: &str) -> anyhow::Result<Option<String>> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = words.split_first() else {
            return Ok(None);
        };
        if name.starts_with('#') {
            return Ok(None);
        }

        let output = match name {
            "create" => {
                if args.is_empty() {
                    bail!("create expects <file>");
                }
                let id = self.services.gateway.create(&args.join(" "))?;
                format!("created {id}")
            }
            "list" => self.list(),
            "show" => self.show(&single_id(name, args)?)?,
            "history" => self.history(&single_id(name, args)?)?,
            "rebuild" => self.rebuild()?,
            _ => {
                let (id, command) = edit_command(name, line, args)?;
                self.services
                    .gateway
                    .execute(&id, &command)
                    .with_context(|| format!("{name} {id}"))?;
                "ok".to_string()
            }
        };
        Ok(Some(output))
    }

    fn list(&self) -> String {
        self.services
            .editor_list
            .list()
            .iter()
            .map(|row| format!("{}\t{}", row.id, row.file_name))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn show(&self, id: &AggregateId) -> anyhow::Result<String> {
        let doc = self
            .services
            .editor_content
            .get(id)
            .ok_or_else(|| anyhow!("no editor {id}"))?;
        Ok(format!(
            "{}\t{}\t{} bytes\n{}",
            doc.id, doc.file_name, doc.length, doc.content
        ))
    }

    fn history(&self, id: &AggregateId) -> anyhow::Result<String> {
        let events = self.services.history(id)?;
        if events.is_empty() {
            bail!("no history for {id}");
        }
        let lines = events
            .iter()
            .map(|e| {
                let payload = serde_json::to_string(e.event.payload())?;
                Ok(format!("{}\t{}\t{}", e.sequence_number, e.event_type(), payload))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(lines.join("\n"))
    }

    fn rebuild(&self) -> anyhow::Result<String> {
        let rebuilt = self.services.rebuild_projections()?;
        let matches = rebuilt.list.list() == self.services.editor_list.list()
            && rebuilt.content.list() == self.services.editor_content.list();
        tracing::info!(editors = rebuilt.list.len(), matches, "projections rebuilt");
        Ok(format!(
            "rebuilt {} editors; views {}",
            rebuilt.list.len(),
            if matches { "match" } else { "differ" }
        ))
    }
}

/// Parse an editing command. The text of `append` and `insert` is the rest of
/// the line after the single space that ends the last argument, spacing kept.
fn edit_command(name: &str, line: &str, args: &[&str]) -> anyhow::Result<(AggregateId, EditorCommand)> {
    let text_after = match name {
        "append" => Some((2, "<id> <text>")),
        "insert" => Some((3, "<id> <pos> <text>")),
        _ => None,
    };

    if let Some((leading, usage)) = text_after {
        let (words, text) =
            split_leading(line, leading).ok_or_else(|| anyhow!("{name} expects {usage}"))?;
        let id = AggregateId::new(words[1])?;
        let mut command_args = words[2..].to_vec();
        command_args.push(text);
        return Ok((id, EditorCommand::parse(name, &command_args)?));
    }

    let (id, rest) = args
        .split_first()
        .ok_or_else(|| anyhow!("{name} expects <id>"))?;
    Ok((AggregateId::new(*id)?, EditorCommand::parse(name, rest)?))
}

/// Split off `n` whitespace-separated words and return the remainder
/// untouched, minus the one separator that follows the last word.
fn split_leading(line: &str, n: usize) -> Option<(Vec<&str>, &str)> {
    let mut words = Vec::with_capacity(n);
    let mut rest = line;
    for _ in 0..n {
        rest = rest.trim_start();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        if end == 0 {
            return None;
        }
        words.push(&rest[..end]);
        rest = &rest[end..];
    }

    let mut chars = rest.chars();
    chars.next();
    Some((words, chars.as_str()))
}

fn single_id(name: &str, args: &[&str]) -> anyhow::Result<AggregateId> {
    match args {
        [id] => Ok(AggregateId::new(*id)?),
        _ => bail!("{name} expects <id>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(session: &Session, lines: &[&str]) -> Vec<String> {
        lines
            .iter()
            .filter_map(|line| match session.run_line(line) {
                Ok(out) => out,
                Err(e) => Some(format!("error: {e:#}")),
            })
            .collect()
    }

    #[test]
    fn edit_session() {
        let session = Session::new(&EditorConfig::default());
        let out = run(
            &session,
            &[
                "create a.txt",
                "append E1 Hello",
                "insert E1 0 X",
                "",
                "# comment",
                "show E1",
            ],
        );
        assert_eq!(
            out,
            vec!["created E1", "ok", "ok", "E1\ta.txt\t6 bytes\nXHello"]
        );
    }

    #[test]
    fn list_and_delete() {
        let session = Session::new(&EditorConfig::default());
        run(&session, &["create z.txt", "create b.txt", "create c.txt", "delete E3"]);
        assert_eq!(run(&session, &["list"]), vec!["E2\tb.txt\nE1\tz.txt"]);
    }

    #[test]
    fn errors_are_reported_not_fatal() {
        let session = Session::new(&EditorConfig::default());
        run(&session, &["create a.txt", "append E1 abc"]);

        for line in [
            "delete-text E1 two 1",
            "delete-text E1 1 9",
            "append E9 text",
            "show E9",
            "frobnicate",
            "create",
        ] {
            assert!(session.run_line(line).is_err(), "{line} should fail");
        }
        assert_eq!(run(&session, &["history E1"]).len(), 1);
        assert_eq!(
            session.services().history(&AggregateId::new("E1").unwrap()).unwrap().len(),
            2
        );
    }

    #[test]
    fn history_and_rebuild() {
        let session = Session::new(&EditorConfig::default());
        run(&session, &["create a.txt", "append E1 0123456789", "delete-text E1 5 3"]);

        let history = run(&session, &["history E1"]).remove(0);
        let types: Vec<&str> = history
            .lines()
            .map(|l| l.split('\t').nth(1).unwrap())
            .collect();
        assert_eq!(types, vec!["EditorCreated", "TextAppended", "TextDeleted"]);

        assert_eq!(run(&session, &["rebuild"]), vec!["rebuilt 1 editors; views match"]);
    }

    #[test]
    fn text_keeps_its_spacing() {
        let session = Session::new(&EditorConfig::default());
        let out = run(
            &session,
            &["create a.txt", "append E1 a  b ", "insert E1 0 x ", "show E1"],
        );
        assert_eq!(out[3], "E1\ta.txt\t7 bytes\nx a  b ");
    }

    #[test]
    fn leading_words_split_off_the_raw_remainder() {
        assert_eq!(
            split_leading("insert  E1 3   two  words", 3),
            Some((vec!["insert", "E1", "3"], "  two  words"))
        );
        assert_eq!(split_leading("append E1", 2), Some((vec!["append", "E1"], "")));
        assert_eq!(split_leading("append", 2), None);
    }
}
