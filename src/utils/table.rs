/// Column alignment within a terminal table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Plain-text table for stdout, measured in characters so Cyrillic names
/// and the `лв.` suffix line up
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    align: Vec<Align>,
}

impl Table {
    pub fn new(headers: Vec<&str>) -> Self {
        Table {
            align: vec![Align::Left; headers.len()],
            headers: headers.into_iter().map(str::to_string).collect(),
            rows: Vec::new(),
        }
    }

    /// Right-align one column (counts, prices)
    pub fn align_right(mut self, column: usize) -> Self {
        if let Some(align) = self.align.get_mut(column) {
            *align = Align::Right;
        }
        self
    }

    /// Cells beyond the header count are dropped
    pub fn add_row(&mut self, mut row: Vec<String>) {
        row.truncate(self.headers.len());
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let separator = widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-");

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(self.line(&self.headers, &widths));
        lines.push(separator);
        lines.extend(self.rows.iter().map(|row| self.line(row, &widths)));

        let mut output = lines.join("\n");
        output.push('\n');
        output
    }

    fn line(&self, cells: &[String], widths: &[usize]) -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .zip(&self.align)
            .map(|((cell, &width), align)| match align {
                Align::Left => format!("{:<width$}", cell, width = width),
                Align::Right => format!("{:>width$}", cell, width = width),
            })
            .collect();
        padded.join(" | ").trim_end().to_string()
    }
}
