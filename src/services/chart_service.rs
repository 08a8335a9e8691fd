use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use chrono::NaiveDate;
use plotters::prelude::*;

use super::history_cache::PriceHistoryCache;
use super::shopping_list::ShoppingList;
use crate::models::{ChartDataset, ChartSeries, PricePoint, ShoppingListEntry};

/// Derive the chart dataset from the list and the history cache.
///
/// Only listed products with a cached history are charted, in list order.
/// The label axis is the sorted union of every charted date; each series is
/// aligned to it with `None` where that product has no observation.
pub fn project(list: &ShoppingList, cache: &PriceHistoryCache) -> ChartDataset {
    let charted: Vec<(&ShoppingListEntry, &[PricePoint])> = list
        .entries()
        .iter()
        .filter_map(|entry| cache.get(&entry.product.id).map(|history| (entry, history)))
        .collect();

    let labels: Vec<NaiveDate> = charted
        .iter()
        .flat_map(|(_, history)| history.iter().map(|p| p.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let series = charted
        .iter()
        .map(|(entry, history)| {
            // several points on one date: the last in sorted order wins
            let by_date: HashMap<NaiveDate, f64> = history.iter().map(|p| (p.date, p.price)).collect();
            ChartSeries {
                product_id: entry.product.id.clone(),
                label: entry.product.name.clone(),
                color: entry.color,
                values: labels.iter().map(|date| by_date.get(date).copied()).collect(),
            }
        })
        .collect();

    ChartDataset { labels, series }
}

/// Split a series into runs of consecutive observations, so gaps stay gaps
fn contiguous_runs(values: &[Option<f64>]) -> Vec<Vec<(i32, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(price) => current.push((i as i32, *price)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Render the dataset as a PNG line chart at `path`
pub fn render_chart_png(dataset: &ChartDataset, path: &Path, width: u32, height: u32) -> Result<(), String> {
    let prices: Vec<f64> = dataset
        .series
        .iter()
        .flat_map(|s| s.values.iter().flatten().copied())
        .collect();

    if prices.is_empty() {
        return Err("❌ No price history to chart. Turn a chart on with `chart <product>`.".to_string());
    }

    // Find price range
    let min_price = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max_price = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // Add some padding to the price range
    let price_range = (max_price - min_price).max(1e-8);
    let padding = price_range * 0.1;
    let y_min = (min_price - padding).max(0.0);
    let y_max = max_price + padding;

    let x_max = (dataset.labels.len() as i32 - 1).max(1);
    let labels = &dataset.labels;

    let backend = BitMapBackend::new(path, (width, height));
    let root = backend.into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| format!("Failed to fill canvas: {}", e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Price history", ("sans-serif", 32.0).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0..x_max, y_min..y_max)
        .map_err(|e| format!("Failed to build chart: {}", e))?;

    chart
        .configure_mesh()
        .x_labels(labels.len().min(12))
        .x_label_formatter(&|i| {
            labels
                .get(*i as usize)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .y_desc("Price")
        .x_desc("Date")
        .draw()
        .map_err(|e| format!("Failed to draw mesh: {}", e))?;

    for series in &dataset.series {
        let color = RGBColor(series.color.r, series.color.g, series.color.b);
        for (run_index, run) in contiguous_runs(&series.values).into_iter().enumerate() {
            let drawn = chart
                .draw_series(LineSeries::new(run.clone(), color.stroke_width(2)))
                .map_err(|e| format!("Failed to draw line: {}", e))?;
            if run_index == 0 {
                drawn
                    .label(series.label.clone())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }
            chart
                .draw_series(run.into_iter().map(|point| Circle::new(point, 3, color.filled())))
                .map_err(|e| format!("Failed to draw point: {}", e))?;
        }
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| format!("Failed to draw legend: {}", e))?;

    root.present()
        .map_err(|e| format!("Failed to render chart: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: id.into(),
            barcode: format!("{0}{0}{0}", id),
            name: name.into(),
        }
    }

    fn point(date: &str, price: f64) -> PricePoint {
        PricePoint {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            price,
        }
    }

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn fixture() -> (ShoppingList, PriceHistoryCache) {
        let mut list = ShoppingList::default();
        list.add(product("1", "Milk"));
        list.add(product("2", "Bread"));
        list.add(product("3", "Eggs"));

        let mut cache = PriceHistoryCache::default();
        let milk = cache.begin_fetch("1");
        cache.apply("1", milk, vec![point("2024-01-03", 1.6), point("2024-01-01", 1.2)]);
        let bread = cache.begin_fetch("2");
        cache.apply("2", bread, vec![point("2024-01-02", 0.9), point("2024-01-03", 1.0)]);
        (list, cache)
    }

    #[test]
    fn test_series_align_to_shared_axis() {
        let (list, cache) = fixture();
        let dataset = project(&list, &cache);

        assert_eq!(dataset.labels, vec![date("2024-01-01"), date("2024-01-02"), date("2024-01-03")]);
        assert_eq!(dataset.series.len(), 2);
        assert_eq!(dataset.series[0].label, "Milk");
        assert_eq!(dataset.series[0].values, vec![Some(1.2), None, Some(1.6)]);
        assert_eq!(dataset.series[1].label, "Bread");
        assert_eq!(dataset.series[1].values, vec![None, Some(0.9), Some(1.0)]);
    }

    #[test]
    fn test_projection_is_pure() {
        let (list, cache) = fixture();
        assert_eq!(project(&list, &cache), project(&list, &cache));
    }

    #[test]
    fn test_colors_come_from_the_entry() {
        let (list, cache) = fixture();
        let dataset = project(&list, &cache);

        assert_eq!(dataset.series[0].color, list.get("1").unwrap().color);
        assert_eq!(dataset.series[1].color, list.get("2").unwrap().color);
    }

    #[test]
    fn test_empty_inputs_give_empty_dataset() {
        let dataset = project(&ShoppingList::default(), &PriceHistoryCache::default());
        assert!(dataset.is_empty());
        assert!(dataset.labels.is_empty());
    }

    #[test]
    fn test_contiguous_runs_break_on_gaps() {
        let runs = contiguous_runs(&[Some(1.0), Some(2.0), None, Some(3.0), None]);
        assert_eq!(runs, vec![vec![(0, 1.0), (1, 2.0)], vec![(3, 3.0)]]);
    }

    #[test]
    fn test_render_refuses_empty_dataset() {
        let result = render_chart_png(&ChartDataset::default(), Path::new("unused.png"), 640, 480);
        assert!(result.unwrap_err().contains("No price history"));
    }
}
