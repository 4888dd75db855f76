//! Line-oriented front-end: every input line is one user action.
//!
//! Lines are split like a POSIX shell: quotes group words and an unquoted
//! `#` starts a comment, so colors are written `ff0000` or `'#ff0000'`.

use std::collections::HashSet;
use std::io::{BufRead, Write};

use clap::{CommandFactory, Parser};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::{ClusterEvent, Outcome, Session};
use crate::cli::args::{ShellCommand, ShellLine};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::domain::{NodeId, Position, TreeRender};

const PROMPT: &str = "clustree>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Read commands from `input` until EOF or `quit`.
///
/// Errors on a single line are reported to `out` and the shell carries on;
/// only I/O failures end it early.
#[instrument(level = "debug", skip_all)]
pub fn run_shell<R: BufRead, W: Write>(
    session: &mut Session,
    input: R,
    out: &mut W,
    interactive: bool,
) -> CliResult<()> {
    let mut lines = input.lines();
    loop {
        if interactive {
            output::prompt(out, PROMPT)?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        debug!(line, "shell input");

        let Some(words) = shlex::split(line) else {
            output::info(out, "error: unbalanced quotes")?;
            continue;
        };
        let parsed = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed,
            Err(e) => {
                output::info(out, e.render().to_string().trim_end())?;
                continue;
            }
        };

        match execute_line(session, parsed.command, out) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(CliError::Io(e)) => return Err(CliError::Io(e)),
            Err(e) => output::error(out, &e)?,
        }
    }
    Ok(())
}

fn execute_line<W: Write>(
    session: &mut Session,
    command: ShellCommand,
    out: &mut W,
) -> CliResult<Flow> {
    match command {
        ShellCommand::New {
            label,
            color,
            size,
            parent,
        } => {
            let outcome = session.apply(ClusterEvent::Create {
                label,
                color,
                size,
                parent,
            })?;
            report(session, outcome, "create", out)?;
        }
        ShellCommand::Child { parent, label } => {
            let outcome = session.apply(ClusterEvent::Create {
                label,
                color: None,
                size: None,
                parent: Some(parent),
            })?;
            report(session, outcome, "create", out)?;
        }
        ShellCommand::Rm { node } => {
            let outcome = session.apply(ClusterEvent::Delete(node))?;
            report(session, outcome, "deleted", out)?;
        }
        ShellCommand::Color { node, color } => {
            let outcome = session.apply(ClusterEvent::UpdateColor(node, color))?;
            report(session, outcome, "recolored", out)?;
        }
        ShellCommand::Rename { node, label } => {
            let outcome = session.apply(ClusterEvent::UpdateLabel(node, label.join(" ")))?;
            report(session, outcome, "renamed", out)?;
        }
        ShellCommand::Move { node, x, y } => {
            let outcome =
                session.apply(ClusterEvent::UpdatePosition(node, Position::new(x, y)))?;
            report(session, outcome, "moved", out)?;
        }
        ShellCommand::Drag { node, dx, dy } => {
            session.begin_drag(&node)?;
            session.drag_to(dx, dy);
            let outcome = session.end_drag();
            report(session, outcome, "moved", out)?;
        }
        ShellCommand::Toggle { node } => {
            let outcome = session.apply(ClusterEvent::ToggleExpand(node))?;
            report(session, outcome, "toggled", out)?;
        }
        ShellCommand::Undo => {
            let outcome = session.apply(ClusterEvent::Undo)?;
            report(session, outcome, "undone", out)?;
        }
        ShellCommand::Redo => {
            let outcome = session.apply(ClusterEvent::Redo)?;
            report(session, outcome, "redone", out)?;
        }
        ShellCommand::Ls { all } => list(session, all, out)?,
        ShellCommand::Tree => {
            let tree = session
                .store()
                .to_tree_string()
                .map_err(crate::application::ApplicationError::from)?;
            output::info(out, tree.to_string().trim_end())?;
        }
        ShellCommand::Help => {
            let help = ShellLine::command().render_help();
            output::info(out, help.to_string().trim_end())?;
        }
        ShellCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn report<W: Write>(session: &Session, outcome: Outcome, action: &str, out: &mut W) -> CliResult<()> {
    match outcome {
        Outcome::Created(id) => {
            let msg = describe(session, id);
            output::success(out, &format!("created {msg}"))?;
        }
        Outcome::Applied => output::success(out, action)?,
        Outcome::Ignored => output::ignored(out, &format!("nothing {action}"))?,
    }
    Ok(())
}

fn describe(session: &Session, id: NodeId) -> String {
    match session.store().get(id) {
        Some(node) => format!("{} [{}]", output::label(node), id.short()),
        None => id.short(),
    }
}

fn list<W: Write>(session: &Session, all: bool, out: &mut W) -> CliResult<()> {
    let store = session.store();
    let visible: HashSet<NodeId> = store.visible_nodes().iter().map(|n| n.id).collect();

    let rows = store
        .nodes()
        .iter()
        .filter(|node| all || visible.contains(&node.id))
        .map(|node| output::node_row(node, visible.contains(&node.id)))
        .join("\n");
    if !rows.is_empty() {
        output::info(out, &rows)?;
    }
    output::info(
        out,
        &format!(
            "{} of {} clusters, {} links",
            visible.len(),
            store.len(),
            store.visible_links().len()
        ),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::CreationDefaults;
    use crate::domain::ClusterTreeStore;
    use std::io::Cursor;

    fn run(script: &str) -> (Session, String) {
        colored::control::set_override(false);
        let mut session = Session::new(ClusterTreeStore::new(), CreationDefaults::default());
        let mut out = Vec::new();
        run_shell(&mut session, Cursor::new(script), &mut out, false).unwrap();
        (session, String::from_utf8(out).unwrap())
    }

    #[test]
    fn given_script_when_running_then_builds_tree() {
        let (session, out) = run("new A\nchild A B\nchild B C\n");
        assert_eq!(session.store().len(), 3);
        assert!(out.contains("created A"));
        assert!(out.contains("created C"));
    }

    #[test]
    fn given_bad_line_when_running_then_reports_and_continues() {
        let (session, out) = run("bogus\nrm nobody\nnew A\n");
        assert_eq!(session.store().len(), 1);
        assert!(out.contains("no cluster matches 'nobody'"));
    }

    #[test]
    fn given_quit_when_running_then_stops_reading() {
        let (session, _) = run("new A\nquit\nnew B\n");
        assert_eq!(session.store().len(), 1);
    }

    #[test]
    fn given_quoted_label_when_running_then_kept_as_one_word() {
        let (session, out) = run("new \"Big Idea\" -c '#0000ff'\nnew A # trailing note\n");
        let labels: Vec<&str> = session.store().nodes().iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Big Idea", "A"]);
        assert_eq!(session.store().nodes()[0].color, crate::domain::Color::rgb(0, 0, 255));
        assert!(out.contains("created Big Idea"), "{out}");
    }

    #[test]
    fn given_unbalanced_quote_when_running_then_reports_and_continues() {
        let (session, out) = run("new \"Big Idea\nnew B\n");
        assert!(out.contains("unbalanced quotes"), "{out}");
        assert_eq!(session.store().len(), 1);
    }

    #[test]
    fn given_negative_move_when_running_then_accepted() {
        let (session, out) = run("new A\nmove A -10 -20\n");
        assert!(out.contains("moved"), "{out}");
        assert_eq!(
            session.store().nodes()[0].position,
            Position::new(-10.0, -20.0)
        );
    }
}
