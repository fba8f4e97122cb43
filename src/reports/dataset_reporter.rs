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
use crate::gl::dataset::Dataset;
use crate::gl::links::LinkBuilder;
use crate::reports::table::Table;
use std::fmt::Write;

/// Lists the datasets found in the exports, grouped by year. Datasets that
/// are shown on the report are marked with `*`.
pub struct DatasetReporter<'a> {
	datasets: &'a [Dataset],
	visible: &'a [Dataset],
	links: Option<&'a LinkBuilder>,
}

impl<'a> DatasetReporter<'a> {
	pub fn new(datasets: &'a [Dataset], visible: &'a [Dataset]) -> Self {
		Self {
			datasets,
			visible,
			links: None,
		}
	}

	/// Also list the result report link of each dataset.
	pub fn with_links(mut self, links: &'a LinkBuilder) -> Self {
		self.links = Some(links);
		self
	}

	pub fn print(&self) {
		print!("{}", self.render());
	}

	pub fn render(&self) -> String {
		let mut out = String::new();

		// datasets are ordered most recent first, so a year's datasets are
		// always next to each other
		let mut years: Vec<i64> = vec![];
		for dataset in self.datasets {
			if years.last() != Some(&dataset.year()) {
				years.push(dataset.year());
			}
		}

		for (i, year) in years.iter().enumerate() {
			if i > 0 {
				out.push('\n');
			}
			let _ = writeln!(out, "{}", year);

			let mut table = Table::new(5);
			for dataset in self.datasets.iter().filter(|d| d.year() == *year) {
				table.add_row(vec![
					self.mark(dataset).to_string(),
					dataset.key.to_string(),
					dataset.description1.clone(),
					dataset.description2.clone(),
					Self::flags(dataset),
				]);
			}
			out.push_str(&table.render());
		}

		if let Some(links) = self.links {
			let lines: Vec<String> = self
				.datasets
				.iter()
				.filter_map(|d| {
					d.result_report_link(links, None, None, false)
						.map(|link| format!("{}: {}", d.key, link))
				})
				.collect();

			if !lines.is_empty() {
				let _ = writeln!(out, "\nLinks");
				for line in lines {
					let _ = writeln!(out, "{}", line);
				}
			}
		}

		out
	}

	fn mark(&self, dataset: &Dataset) -> &'static str {
		if self.visible.iter().any(|v| v.key == dataset.key) {
			"*"
		} else {
			" "
		}
	}

	fn flags(dataset: &Dataset) -> String {
		let mut flags = vec![];
		if dataset.is_sum {
			flags.push("sum");
		} else if dataset.is_yearly {
			flags.push("yearly");
		}
		if dataset.has_child_sum {
			flags.push("in sum");
		}
		if !dataset.is_from_primary_source {
			flags.push("budget");
		}
		flags.join(", ")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::gl::dataset::{partition, DatasetSelection};
	use crate::gl::entry::{LedgerEntry, Source};

	fn entry(year: i64, month: i64, entry_type: &str, source: Source) -> LedgerEntry {
		let mut e = LedgerEntry::new(source);
		e.year = year;
		e.month = month;
		e.entry_type = entry_type.to_string();
		e.version = "1".to_string();
		e
	}

	#[test]
	fn test_render() {
		let datasets = partition(&[
			entry(2023, 2, "R", Source::Ledger),
			entry(2023, 9, "R", Source::Ledger),
			entry(2023, 0, "B", Source::Budget),
			entry(2022, 0, "R", Source::Ledger),
		]);
		let visible =
			DatasetSelection::Keys(vec!["202302:R:1".to_string()]).apply(&datasets);

		let text = DatasetReporter::new(&datasets, &visible).render();
		assert_eq!(
			text,
			"2023\n\
			 \x20   202399:R:1   Year 2023     R (1)   sum\n\
			 *   202302:R:1   Autumn 2023   R (1)   in sum\n\
			 \x20   202301:R:1   Spring 2023   R (1)   in sum\n\
			 \x20   202300:B:1   Year 2023     B (1)   yearly, budget\n\
			 \n\
			 2022\n\
			 \x20   202200:R:1   Year 2022   R (1)   yearly\n"
		);
	}

	#[test]
	fn test_links() {
		let datasets = partition(&[
			entry(2023, 2, "R", Source::Ledger),
			entry(2023, 0, "B", Source::Budget),
		]);
		let links = LinkBuilder::new("https://example.org", 1);

		let text = DatasetReporter::new(&datasets, &[]).with_links(&links).render();
		assert!(text.contains("\nLinks\n202301:R:1: https://example.org/execute/resultReport2?"));
		assert!(!text.contains("202300:B:1: "));
	}
}
