//! Chart-ready data models

use chrono::NaiveDate;

/// Fixed palette series colors are drawn from
const PALETTE: [(u8, u8, u8); 10] = [
    (31, 119, 180),
    (255, 127, 14),
    (44, 160, 44),
    (214, 39, 40),
    (148, 103, 189),
    (140, 86, 75),
    (227, 119, 194),
    (127, 127, 127),
    (188, 189, 34),
    (23, 190, 207),
];

/// RGB color of one chart series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl SeriesColor {
    /// Stable color for a product id (FNV-1a into the palette).
    /// The same id maps to the same color across runs and platforms.
    pub fn for_product(product_id: &str) -> Self {
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in product_id.bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x100000001b3);
        }
        let (r, g, b) = PALETTE[(hash % PALETTE.len() as u64) as usize];
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Values for one product aligned to the dataset's label axis.
/// `None` marks a date the product has no observation for.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub product_id: String,
    pub label: String,
    pub color: SeriesColor,
    pub values: Vec<Option<f64>>,
}

/// Shared date axis plus one series per charted product
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartDataset {
    pub labels: Vec<NaiveDate>,
    pub series: Vec<ChartSeries>,
}

impl ChartDataset {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_is_stable_per_product() {
        let first = SeriesColor::for_product("64a1f0c2");
        let second = SeriesColor::for_product("64a1f0c2");
        assert_eq!(first, second);
        assert!(PALETTE.contains(&(first.r, first.g, first.b)));
    }

    #[test]
    fn test_hex_format() {
        let color = SeriesColor { r: 31, g: 119, b: 180 };
        assert_eq!(color.to_hex(), "#1f77b4");
    }
}
