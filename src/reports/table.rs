/* Copyright © 2024-2025 Adam Train <adam@trainrelay.net>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */
use std::fmt::Write;

const COLUMN_GAP: &str = "   ";

/// Plain text table. Column widths follow the widest cell, counted in
/// characters since account and project names are rarely ASCII only.
pub struct Table {
	column_count: usize,
	rows: Vec<Row>,
	right_align: Vec<bool>, // indicates columns by index
}

pub enum Row {
	Header(Vec<String>),
	Data(Vec<String>),
	Separator,
	PartialSeparator(Vec<bool>), // indicates columns by index
}

impl Table {
	pub fn new(column_count: usize) -> Self {
		Self {
			column_count,
			rows: Vec::new(),
			right_align: vec![false; column_count],
		}
	}

	/// Adds a header row. Header cells are centered.
	pub fn add_header(&mut self, row: Vec<String>) {
		self.rows.push(Row::Header(row));
	}

	/// Adds a data row. Missing trailing cells are left empty.
	pub fn add_row(&mut self, row: Vec<String>) {
		self.rows.push(Row::Data(row));
	}

	/// Adds a full separator row.
	pub fn add_separator(&mut self) {
		self.rows.push(Row::Separator);
	}

	/// Adds a partial separator row for selected columns.
	pub fn add_partial_separator(&mut self, indices: &[usize]) {
		let mut cols = vec![false; self.column_count];
		for &i in indices {
			if i < self.column_count {
				cols[i] = true;
			}
		}
		self.rows.push(Row::PartialSeparator(cols));
	}

	/// Specifies columns that should be right-aligned by index.
	pub fn right_align(&mut self, cols: &[usize]) {
		for &col in cols {
			if col < self.column_count {
				self.right_align[col] = true;
			}
		}
	}

	pub fn render(&self) -> String {
		let mut max_widths = vec![0; self.column_count];

		for row in &self.rows {
			if let Row::Data(cells) | Row::Header(cells) = row {
				for (i, value) in cells.iter().take(self.column_count).enumerate()
				{
					max_widths[i] = max_widths[i].max(value.chars().count());
				}
			}
		}

		let mut out = String::new();
		for row in &self.rows {
			let line = match row {
				Row::Header(cells) => self.header_line(&max_widths, cells),
				Row::Data(cells) => self.data_line(&max_widths, cells),
				Row::Separator => {
					let total_width: usize = max_widths.iter().sum::<usize>()
						+ COLUMN_GAP.len() * self.column_count.saturating_sub(1);
					"-".repeat(total_width)
				},
				Row::PartialSeparator(cols) => self.partial_line(&max_widths, cols),
			};

			// trailing padding only gets in the way of diffs and terminals
			let _ = writeln!(out, "{}", line.trim_end());
		}

		out
	}

	fn cell<'a>(cells: &'a [String], i: usize) -> &'a str {
		cells.get(i).map(String::as_str).unwrap_or("")
	}

	fn data_line(&self, max_widths: &[usize], cells: &[String]) -> String {
		let rendered: Vec<String> = (0..self.column_count)
			.map(|i| {
				let value = Table::cell(cells, i);
				if self.right_align[i] {
					format!("{:>width$}", value, width = max_widths[i])
				} else {
					format!("{:<width$}", value, width = max_widths[i])
				}
			})
			.collect();

		rendered.join(COLUMN_GAP)
	}

	fn header_line(&self, max_widths: &[usize], cells: &[String]) -> String {
		let rendered: Vec<String> = (0..self.column_count)
			.map(|i| Table::center_align(Table::cell(cells, i), max_widths[i]))
			.collect();

		rendered.join(COLUMN_GAP)
	}

	fn partial_line(&self, max_widths: &[usize], cols: &[bool]) -> String {
		let rendered: Vec<String> = cols
			.iter()
			.enumerate()
			.map(|(i, draw)| {
				let fill = if *draw { "-" } else { " " };
				fill.repeat(max_widths[i])
			})
			.collect();

		rendered.join(COLUMN_GAP)
	}

	fn center_align(value: &str, width: usize) -> String {
		let len = value.chars().count();
		if len >= width {
			return value.to_string();
		}
		let total_padding = width - len;
		let left_padding = total_padding / 2;
		let right_padding = total_padding - left_padding;

		format!(
			"{}{}{}",
			" ".repeat(left_padding),
			value,
			" ".repeat(right_padding)
		)
	}
}
