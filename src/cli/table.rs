use std::fmt;
use std::iter::FromIterator;

use prettytable::{format, Row, Table};

pub trait ToRow {
    fn columns() -> Row;
    fn to_row(&self) -> Row;
}

/// Records shown one per line under `T::columns()`
pub struct OutputTable<T: ToRow> {
    rows: Vec<T>,
}

impl<T: ToRow> OutputTable<T> {
    fn render(&self) -> Table {
        let mut table = Table::new();
        table.set_format(
            format::FormatBuilder::new()
                .padding(1, 1)
                .separator(
                    format::LinePosition::Title,
                    format::LineSeparator::new('-', '+', '+', '+'),
                )
                .build(),
        );
        table.set_titles(T::columns());
        for row in &self.rows {
            table.add_row(row.to_row());
        }
        table
    }

    pub fn print(&self) {
        if self.rows.is_empty() {
            println!("No entries");
            return;
        }
        self.render().printstd();
    }
}

impl<T: ToRow> FromIterator<T> for OutputTable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(rows: I) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }
}

impl<T: ToRow> fmt::Display for OutputTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}
