use std::path::PathBuf;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::models::ChartDataset;
use crate::services::chart_service;
use crate::services::{Command, Session};

const DEFAULT_CHART_FILE: &str = "price-history.png";
const NOTHING_TO_PLOT: &str = "❌ No price history to chart. Turn a chart on with `chart <product>`.";

pub fn toggle(session: &mut Session, args: &[&str]) -> Result<String, String> {
    if args.is_empty() {
        return Err("❌ Usage: `chart <product>`".to_string());
    }
    session.execute(Command::ToggleChart(args.join(" ")))
}

pub fn refresh(session: &mut Session, args: &[&str]) -> Result<String, String> {
    if args.is_empty() {
        return Err("❌ Usage: `refresh <product>`".to_string());
    }
    session.execute(Command::RefreshHistory(args.join(" ")))
}

/// Write the current chart dataset to a PNG without holding up the input loop
pub fn plot(session: &Session, args: &[&str], size: (u32, u32)) -> Result<String, String> {
    info!("📈 Plot command called with args: {:?}", args);

    let path = args
        .first()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CHART_FILE));
    let dataset = session.snapshot().chart;
    if dataset.is_empty() {
        return Err(NOTHING_TO_PLOT.to_string());
    }

    let reply = format!("🖼️ Rendering {} ...", path.display());
    let job = render_in_background(dataset, path, size);
    tokio::spawn(async move {
        match job.await {
            Ok(Ok(message)) | Ok(Err(message)) => println!("{}", message),
            Err(e) => error!("Chart rendering task failed: {}", e),
        }
    });
    Ok(reply)
}

/// Rasterize on the blocking pool; resolves to the line to show the user
pub fn render_in_background(
    dataset: ChartDataset,
    path: PathBuf,
    size: (u32, u32),
) -> JoinHandle<Result<String, String>> {
    tokio::task::spawn_blocking(move || {
        chart_service::render_chart_png(&dataset, &path, size.0, size.1)?;

        let products: Vec<&str> = dataset.series.iter().map(|s| s.label.as_str()).collect();
        Ok(format!(
            "📈 Wrote {} ({} dates: {})",
            path.display(),
            dataset.labels.len(),
            products.join(", ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::idle_session;
    use crate::models::chart::SeriesColor;
    use crate::models::ChartSeries;

    #[test]
    fn test_plot_refuses_empty_chart() {
        let session = idle_session();
        assert_eq!(plot(&session, &[], (640, 480)), Err(NOTHING_TO_PLOT.to_string()));
    }

    #[tokio::test]
    async fn test_background_render_reports_missing_prices() {
        let dataset = ChartDataset {
            labels: vec![],
            series: vec![ChartSeries {
                product_id: "1".into(),
                label: "Milk".into(),
                color: SeriesColor::for_product("1"),
                values: vec![],
            }],
        };

        let outcome = render_in_background(dataset, PathBuf::from("unused.png"), (640, 480))
            .await
            .unwrap();
        assert!(outcome.unwrap_err().contains("No price history"));
    }
}
