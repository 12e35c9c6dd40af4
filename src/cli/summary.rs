//! Plain-text renderings of store state for the CLI

use std::fmt::Write;

use crate::graph::Layout;
use crate::realtime::RouteOutcome;
use crate::tree::{EventStore, TreeStore, ViewRow};

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn write_rows(out: &mut String, title: &str, rows: &[ViewRow]) {
    let _ = writeln!(out, "{} ({}):", title, rows.len());
    for row in rows {
        let name = match &row.namespace {
            Some(ns) => format!("{}/{}", ns, row.name),
            None => row.name.clone(),
        };
        let mut flags = String::new();
        if row.is_suspended {
            flags.push_str(" [suspended]");
        }
        if row.is_reconciling {
            flags.push_str(" [reconciling]");
        }
        let _ = writeln!(out, "  {:<8} {:<15} {}{}", row.status.as_str(), row.kind, name, flags);
    }
}

/// Tree, derived listings and event counters
pub fn render_summary(store: &TreeStore, events: &EventStore) -> String {
    let views = store.derived_views();
    let root = store.root();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Tree: {} {} ({} nodes)",
        root.kind,
        root.display_name(),
        store.tree().len()
    );
    write_rows(&mut out, "Applications", &views.applications);
    write_rows(&mut out, "Repositories", &views.repositories);
    write_rows(&mut out, "Controllers", &views.controllers);
    let _ = writeln!(
        out,
        "Events: {} (new: {}, warnings: {})",
        events.len(),
        yes_no(events.has_new_events()),
        yes_no(events.has_new_warnings())
    );
    out
}

/// Positioned nodes followed by edges
pub fn render_layout(layout: &Layout) -> String {
    let mut out = String::new();
    for node in &layout.nodes {
        let _ = writeln!(
            out,
            "{} ({}) at {},{}",
            node.id, node.node_type, node.x, node.y
        );
    }
    for edge in &layout.edges {
        let _ = writeln!(out, "{} -> {}", edge.source, edge.target);
    }
    out
}

/// One-line description of what a routed message did
pub fn describe_outcome(outcome: &RouteOutcome) -> String {
    match outcome {
        RouteOutcome::TreeReplaced { nodes } => format!("tree replaced ({} nodes)", nodes),
        RouteOutcome::Delta { op, outcome } => format!("{} -> {:?}", op.as_str(), outcome),
        RouteOutcome::LogAppended => "log appended".to_string(),
        RouteOutcome::Event { added, notice } => {
            let mut line = if *added {
                "event added".to_string()
            } else {
                "event duplicate".to_string()
            };
            if let Some(notice) = notice {
                let _ = write!(line, " ({:?}: {})", notice.level, notice.text.replace('\n', ""));
            }
            line
        }
        RouteOutcome::Connected { client_id } => {
            format!("connected ({})", client_id.as_deref().unwrap_or("-"))
        }
        RouteOutcome::Heartbeat => "heartbeat".to_string(),
        RouteOutcome::Ignored { kind } => format!("ignored {}", kind),
        RouteOutcome::Dropped { reason } => format!("dropped: {}", reason),
    }
}
