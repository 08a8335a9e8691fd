use crate::services::{Command, Session, Snapshot};
use crate::utils::Table;

const CATALOG_PAGE: usize = 25;

pub fn add(session: &mut Session, args: &[&str]) -> Result<String, String> {
    if args.is_empty() {
        return Err("❌ Usage: `add <product>`".to_string());
    }
    session.execute(Command::AddProduct(args.join(" ")))
}

pub fn remove(session: &mut Session, args: &[&str]) -> Result<String, String> {
    if args.is_empty() {
        return Err("❌ Usage: `remove <product>`".to_string());
    }
    session.execute(Command::RemoveProduct(args.join(" ")))
}

pub fn catalog(session: &mut Session, args: &[&str]) -> Result<String, String> {
    if args.first().map(|a| a.eq_ignore_ascii_case("reload")).unwrap_or(false) {
        return session.execute(Command::LoadCatalog);
    }
    Ok(render_catalog(&session.snapshot(), &args.join(" ")))
}

pub fn render_list(snapshot: &Snapshot) -> String {
    if snapshot.list.is_empty() {
        return "🛒 The shopping list is empty. Add products with `add <product>`.".to_string();
    }

    let mut table = Table::new(vec!["#", "Product", "Barcode", "Chart"]).align_right(0);
    for (i, entry) in snapshot.list.iter().enumerate() {
        let chart = if entry.chart_enabled {
            format!("on {}", entry.color.to_hex())
        } else {
            "off".to_string()
        };
        table.add_row(vec![
            (i + 1).to_string(),
            entry.product.name.clone(),
            entry.product.barcode.clone(),
            chart,
        ]);
    }
    format!("🛒 Shopping list\n{}", table.render())
}

pub fn render_catalog(snapshot: &Snapshot, filter: &str) -> String {
    if snapshot.catalog.is_empty() {
        return if snapshot.pending.catalog {
            "⏳ The product catalog is still loading".to_string()
        } else {
            "❌ No catalog products. Try `catalog reload`.".to_string()
        };
    }

    let filter = filter.trim().to_lowercase();
    let matching: Vec<_> = snapshot
        .catalog
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&filter))
        .collect();
    if matching.is_empty() {
        return format!("No catalog products match '{}'", filter);
    }

    let mut table = Table::new(vec!["Product", "Barcode"]);
    for product in matching.iter().take(CATALOG_PAGE) {
        table.add_row(vec![product.name.clone(), product.barcode.clone()]);
    }
    let mut output = table.render();
    if matching.len() > CATALOG_PAGE {
        output.push_str(&format!("... and {} more\n", matching.len() - CATALOG_PAGE));
    }
    output
}
