use crate::models::StoreQuote;
use crate::services::{Command, Session, Snapshot};
use crate::utils::Table;

pub fn cheapest(session: &mut Session) -> Result<String, String> {
    session.execute(Command::FindCheapest)
}

pub fn select(session: &mut Session, args: &[&str]) -> Result<String, String> {
    let position = args
        .first()
        .and_then(|a| a.trim_start_matches('#').parse::<usize>().ok())
        .ok_or_else(|| "❌ Usage: `select <store #>`".to_string())?;
    session.execute(Command::SelectStore(position))
}

/// Format a total the way the backend's market shows prices (BGN)
pub fn format_total(total: f64) -> String {
    format!("{} лв.", format!("{:.2}", total).replace('.', ","))
}

pub fn render_quotes(quotes: &[StoreQuote]) -> String {
    if quotes.is_empty() {
        return "No comparison yet. Run `cheapest` to compare stores.".to_string();
    }

    let mut table = Table::new(vec!["#", "Store", "Total", "Map"]).align_right(0).align_right(2);
    for (i, quote) in quotes.iter().enumerate() {
        let map = if quote.location().is_some() { "yes" } else { "-" };
        table.add_row(vec![
            (i + 1).to_string(),
            quote.store.clone(),
            format_total(quote.total_price),
            map.to_string(),
        ]);
    }
    format!("🏪 Cheapest places to buy\n{}", table.render())
}

pub fn render_map(snapshot: &Snapshot) -> String {
    let center = match snapshot.map_center {
        Some(center) => center,
        None => return "🗺️ Map has no center yet".to_string(),
    };
    let label = match &snapshot.selected_store {
        Some(selected) => selected.label().unwrap_or("your location").to_string(),
        None => "default origin".to_string(),
    };
    format!(
        "🗺️ Map centered on {} at {:.4}, {:.4}",
        label, center.latitude, center.longitude
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, SelectedStore};

    #[test]
    fn test_format_total() {
        assert_eq!(format_total(12.4), "12,40 лв.");
        assert_eq!(format_total(0.5), "0,50 лв.");
    }

    #[test]
    fn test_render_quotes_keeps_backend_order() {
        let quotes = vec![
            StoreQuote {
                store: "Lidl".into(),
                total_price: 9.5,
                lat: Some(42.6),
                lng: Some(23.3),
            },
            StoreQuote {
                store: "Billa".into(),
                total_price: 10.25,
                lat: None,
                lng: None,
            },
        ];
        let rendered = render_quotes(&quotes);
        let lidl = rendered.find("Lidl").unwrap();
        let billa = rendered.find("Billa").unwrap();

        assert!(lidl < billa);
        assert!(rendered.contains("10,25 лв."));
    }

    #[test]
    fn test_render_map_labels() {
        let mut snapshot = Snapshot::default();
        snapshot.map_center = Some(Coordinates::new(42.6977, 23.3219));
        assert!(render_map(&snapshot).contains("default origin"));

        snapshot.selected_store = Some(SelectedStore::Store {
            label: "Lidl".into(),
            location: Coordinates::new(42.6, 23.3),
        });
        assert!(render_map(&snapshot).contains("Lidl"));
    }
}
