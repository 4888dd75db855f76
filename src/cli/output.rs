//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::io::{self, Write};

use colored::{ColoredString, Colorize};

use crate::domain::ClusterNode;

/// Print error (red bold "error:" prefix)
pub fn error(out: &mut impl Write, msg: &(impl std::fmt::Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "{}: {}", "error".red().bold(), msg)
}

/// Print success status (green checkmark)
pub fn success(out: &mut impl Write, msg: &(impl std::fmt::Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "{} {}", "✓".green(), msg)
}

/// Print a request that changed nothing (dimmed)
pub fn ignored(out: &mut impl Write, msg: &(impl std::fmt::Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "{} {}", "·".dimmed(), msg.to_string().dimmed())
}

/// Print plain output (no color)
pub fn info(out: &mut impl Write, msg: &(impl std::fmt::Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "{}", msg)
}

/// Print prompt without newline (cyan)
pub fn prompt(out: &mut impl Write, msg: &(impl std::fmt::Display + ?Sized)) -> io::Result<()> {
    write!(out, "{} ", msg.to_string().cyan())?;
    out.flush()
}

/// Cluster label painted in its own fill color
pub fn label(node: &ClusterNode) -> ColoredString {
    node.label
        .as_str()
        .truecolor(node.color.r, node.color.g, node.color.b)
        .bold()
}

/// One listing row: short id, label, color, size, position, flags
pub fn node_row(node: &ClusterNode, visible: bool) -> String {
    let mut flags = Vec::new();
    if !node.expanded {
        flags.push("collapsed");
    }
    if !visible {
        flags.push("hidden");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" ({})", flags.join(", "))
    };

    format!(
        "{}  {} {} size={:.0} at {}{}",
        node.id.short().dimmed(),
        label(node),
        node.color,
        node.size,
        node.position,
        flags
    )
}
