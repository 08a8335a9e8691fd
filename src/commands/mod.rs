pub mod chart;
pub mod help;
pub mod list;
pub mod stores;

use crate::models::SelectedStore;
use crate::services::{Session, Snapshot};

/// What the terminal loop should do after a line
#[derive(Debug, PartialEq)]
pub enum Reply {
    Output(String),
    Quit,
    Nothing,
}

/// Parse one input line and run it against the session
pub fn handle_line(session: &mut Session, line: &str, chart_size: (u32, u32)) -> Reply {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.is_empty() {
        return Reply::Nothing;
    }

    let command = parts[0].to_lowercase();
    let args = &parts[1..];

    let result = match command.as_str() {
        "help" | "?" => Ok(help::execute()),
        "quit" | "exit" | "q" => return Reply::Quit,
        "add" | "a" => list::add(session, args),
        "remove" | "rm" | "del" => list::remove(session, args),
        "list" | "ls" => Ok(list::render_list(&session.snapshot())),
        "catalog" | "search" => list::catalog(session, args),
        "chart" => chart::toggle(session, args),
        "refresh" => chart::refresh(session, args),
        "plot" => chart::plot(session, args, chart_size),
        "cheapest" | "compare" => stores::cheapest(session),
        "stores" => Ok(stores::render_quotes(&session.snapshot().quotes)),
        "select" => stores::select(session, args),
        "map" => Ok(stores::render_map(&session.snapshot())),
        _ => Err(format!("❌ Unknown command '{}'. Type `help` for the list.", parts[0])),
    };

    match result {
        Ok(output) => Reply::Output(output),
        Err(e) => {
            tracing::debug!("Command {} failed: {}", command, e);
            Reply::Output(e)
        }
    }
}

/// Lines describing what changed between two snapshots, for updates that
/// arrive without a command (finished fetches)
pub fn render_update(previous: &Snapshot, current: &Snapshot, last_seen: &mut u64) -> Vec<String> {
    let mut lines = Vec::new();

    if current.catalog.len() != previous.catalog.len() && !current.catalog.is_empty() {
        lines.push(format!("📦 Catalog ready: {} products", current.catalog.len()));
    }
    if current.quotes != previous.quotes && !current.quotes.is_empty() {
        lines.push(stores::render_quotes(&current.quotes));
    }
    if current.chart != previous.chart && !current.chart.is_empty() {
        let products: Vec<&str> = current.chart.series.iter().map(|s| s.label.as_str()).collect();
        lines.push(format!(
            "📈 Chart updated: {} over {} dates (`plot` to draw it)",
            products.join(", "),
            current.chart.labels.len()
        ));
    }
    // store selections answer a command directly; only the device fix arrives on its own
    if current.selected_store != previous.selected_store
        && matches!(current.selected_store, Some(SelectedStore::Device(_)))
    {
        lines.push(stores::render_map(current));
    }
    lines.extend(render_notices(current, last_seen));
    lines
}

/// Lines to show for notices newer than `last_seen`; updates `last_seen`
pub fn render_notices(snapshot: &Snapshot, last_seen: &mut u64) -> Vec<String> {
    let lines = snapshot
        .notices
        .iter()
        .filter(|n| n.seq > *last_seen)
        .map(|n| format!("⚠️ {}", n.error))
        .collect();
    if let Some(last) = snapshot.notices.last() {
        *last_seen = (*last_seen).max(last.seq);
    }
    lines
}
