use anyhow::{anyhow, bail, Context};
use client_core::Keystroke;
use serde_json::Value;
use shared::domain::Selection;

pub const HELP: &str = "commands: format | orgimports | runtests | outsource | \
commit <start> <end> | select <start> <end> | resolve <json> | key <shortcut> | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Format,
    OrgImports,
    RunTests,
    Outsource,
    Commit(Selection),
    Select(Selection),
    Resolve(Value),
    Key(Keystroke),
    Help,
    Quit,
}

/// Parses one stdin line. Blank lines yield `None`.
pub fn parse(line: &str) -> anyhow::Result<Option<Command>> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb {
        "" => return Ok(None),
        "format" => Command::Format,
        "orgimports" => Command::OrgImports,
        "runtests" => Command::RunTests,
        "outsource" => Command::Outsource,
        "commit" => Command::Commit(parse_range(rest)?),
        "select" => Command::Select(parse_range(rest)?),
        "resolve" => {
            let choices = serde_json::from_str(rest).context("resolve expects a JSON value")?;
            Command::Resolve(choices)
        }
        "key" => Command::Key(rest.parse().context("invalid shortcut")?),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command {other:?}; {HELP}"),
    };
    Ok(Some(command))
}

fn parse_range(rest: &str) -> anyhow::Result<Selection> {
    let mut parts = rest.split_whitespace();
    let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next()) else {
        bail!("expected <start> <end>");
    };
    let start: u64 = start
        .parse()
        .map_err(|_| anyhow!("start offset {start:?} is not a number"))?;
    let end: u64 = end
        .parse()
        .map_err(|_| anyhow!("end offset {end:?} is not a number"))?;
    if end < start {
        bail!("end offset {end} is before start offset {start}");
    }
    Ok(Selection::new(start, end))
}
