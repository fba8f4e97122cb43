/* Copyright © 2024-2025 Adam Train <adam@adamtrain.net>
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
use crate::gl::entry::LedgerEntry;
use crate::gl::links::LinkBuilder;
use crate::util::date::Period;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Accounts that never appear on reports: the equity adjustment account and
/// the suspense account.
pub const DEFAULT_EXCLUDED_ACCOUNTS: [i64; 2] = [8960, 9999];

/// The part of the year a dataset covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Bucket {
	/// Rows booked on the year as a whole (month 0)
	Year,
	FirstHalf,
	SecondHalf,
	/// Synthesized sum of the other buckets of one year
	Sum,
}

impl Bucket {
	/// Out-of-range months are tolerated so that every row lands in exactly
	/// one bucket: anything from 7 up is the second half.
	pub fn from_month(month: i64) -> Self {
		match month {
			0 => Bucket::Year,
			m if m < 7 => Bucket::FirstHalf,
			_ => Bucket::SecondHalf,
		}
	}

	/// The code appended to the year in dataset keys. The sum code is far
	/// from the others so it can never be produced by a real row.
	pub fn code(&self) -> i64 {
		match self {
			Bucket::Year => 0,
			Bucket::FirstHalf => 1,
			Bucket::SecondHalf => 2,
			Bucket::Sum => 99,
		}
	}

	fn label(&self) -> &'static str {
		match self {
			Bucket::FirstHalf => "Spring",
			Bucket::SecondHalf => "Autumn",
			Bucket::Year | Bucket::Sum => "Year",
		}
	}

	fn period(&self, year: i64) -> Period {
		match self {
			Bucket::FirstHalf => Period::first_half(year),
			Bucket::SecondHalf => Period::second_half(year),
			Bucket::Year | Bucket::Sum => Period::whole_year(year),
		}
	}
}

/// Identifies a dataset. The text form is the period (year and bucket code,
/// zero padded to six digits for years 0 to 9999) followed by type and
/// version, delimited by `:`. A `:` or `\` inside type or version is
/// escaped with a backslash, so two different datasets never share a key.
/// Keys order by period first and text second, which for years in that
/// range is the same as ordering the text.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatasetKey {
	year: i64,
	code: i64,
	text: String,
}

impl DatasetKey {
	pub fn new(year: i64, bucket: Bucket, entry_type: &str, version: &str) -> Self {
		Self {
			year,
			code: bucket.code(),
			text: format!(
				"{:04}{:02}:{}:{}",
				year,
				bucket.code(),
				escape(entry_type),
				escape(version)
			),
		}
	}

	pub fn as_str(&self) -> &str {
		&self.text
	}
}

fn escape(part: &str) -> String {
	part.replace('\\', "\\\\").replace(':', "\\:")
}

impl Serialize for DatasetKey {
	fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
		s.serialize_str(&self.text)
	}
}

impl fmt::Display for DatasetKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.text)
	}
}

/// Decides whether a ledger row belongs to a dataset. This is a plain
/// predicate over the row, so it also accepts rows that did not exist when
/// the dataset was found.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DatasetFilter {
	pub year: i64,
	pub entry_type: String,
	pub version: String,
	pub bucket: Bucket,
}

impl DatasetFilter {
	pub fn accepts(&self, entry: &LedgerEntry) -> bool {
		entry.year == self.year
			&& entry.entry_type == self.entry_type
			&& entry.version == self.version
			&& (self.bucket == Bucket::Sum
				|| Bucket::from_month(entry.month) == self.bucket)
	}
}

/// One column group on the report: a comparable period of one type and
/// version of figures, e.g. the accounts for spring 2023 as exported on a
/// given date, or a budget revision.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dataset {
	pub key: DatasetKey,
	pub description1: String,
	pub description2: String,
	#[serde(skip)]
	pub filter: DatasetFilter,
	pub period: Period,
	pub is_yearly: bool,
	pub is_sum: bool,
	/// Set on datasets that a synthesized sum dataset adds up
	pub has_child_sum: bool,
	/// Whether the figures come from the accounting system, in which case
	/// they can be linked back to it
	pub is_from_primary_source: bool,
}

/// Which datasets to show on a report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatasetSelection {
	All,
	Keys(Vec<String>),
}

impl Dataset {
	fn new(
		year: i64,
		bucket: Bucket,
		entry_type: &str,
		version: &str,
		is_from_primary_source: bool,
	) -> Self {
		Self {
			key: DatasetKey::new(year, bucket, entry_type, version),
			description1: format!("{} {}", bucket.label(), year),
			description2: format!("{} ({})", entry_type, version),
			filter: DatasetFilter {
				year,
				entry_type: entry_type.to_string(),
				version: version.to_string(),
				bucket,
			},
			period: bucket.period(year),
			is_yearly: matches!(bucket, Bucket::Year | Bucket::Sum),
			is_sum: bucket == Bucket::Sum,
			has_child_sum: false,
			is_from_primary_source,
		}
	}

	pub fn from_entry(entry: &LedgerEntry) -> Self {
		Self::new(
			entry.year,
			Bucket::from_month(entry.month),
			&entry.entry_type,
			&entry.version,
			entry.is_from_primary_source(),
		)
	}

	pub fn year(&self) -> i64 {
		self.filter.year
	}

	pub fn accepts(&self, entry: &LedgerEntry) -> bool {
		self.filter.accepts(entry)
	}

	/// Link to the result report of the accounting system for this period.
	/// None for figures that do not come from the accounting system.
	pub fn result_report_link(
		&self,
		links: &LinkBuilder,
		department_id: Option<i64>,
		project_id: Option<i64>,
		include_subprojects: bool,
	) -> Option<String> {
		self.is_from_primary_source.then(|| {
			links.result_report(
				&self.period,
				department_id,
				project_id,
				include_subprojects,
			)
		})
	}

	/// Link to the postings on one account in the accounting system.
	pub fn ledger_link(
		&self,
		links: &LinkBuilder,
		department_id: i64,
		project_id: i64,
		account_number: i64,
	) -> Option<String> {
		self.is_from_primary_source.then(|| {
			links.ledger(&self.period, department_id, project_id, account_number)
		})
	}
}

impl DatasetSelection {
	/// Picks the selected datasets, keeping the order of the full list.
	pub fn apply(&self, datasets: &[Dataset]) -> Vec<Dataset> {
		match self {
			DatasetSelection::All => datasets.to_vec(),
			DatasetSelection::Keys(keys) => {
				for key in keys {
					if !datasets.iter().any(|d| d.key.as_str() == key) {
						warn!("no dataset with key {}", key);
					}
				}

				datasets
					.iter()
					.filter(|d| keys.iter().any(|k| k == d.key.as_str()))
					.cloned()
					.collect()
			},
		}
	}
}

/// Drops rows on accounts that are never reported on.
pub fn exclude_accounts(
	entries: Vec<LedgerEntry>,
	excluded: &[i64],
) -> Vec<LedgerEntry> {
	entries
		.into_iter()
		.filter(|e| !excluded.contains(&e.account_number))
		.collect()
}

/// Finds every dataset present in the ledger, adds a sum dataset for each
/// year/type/version that is split over more than one dataset, and returns
/// them all with the most recent first.
pub fn partition(entries: &[LedgerEntry]) -> Vec<Dataset> {
	let mut found: BTreeMap<DatasetKey, Dataset> = BTreeMap::new();

	for entry in entries {
		let key = DatasetKey::new(
			entry.year,
			Bucket::from_month(entry.month),
			&entry.entry_type,
			&entry.version,
		);

		// first row wins; later rows only ever match its filter
		found.entry(key).or_insert_with(|| Dataset::from_entry(entry));
	}

	// (year, type, version) -> keys of the datasets sharing it
	let mut groups: BTreeMap<(i64, String, String), Vec<DatasetKey>> =
		BTreeMap::new();
	for dataset in found.values() {
		groups
			.entry((
				dataset.filter.year,
				dataset.filter.entry_type.clone(),
				dataset.filter.version.clone(),
			))
			.or_default()
			.push(dataset.key.clone());
	}

	for ((year, entry_type, version), members) in groups {
		if members.len() < 2 {
			continue;
		}

		let mut is_from_primary_source = false;
		for key in &members {
			if let Some(member) = found.get_mut(key) {
				member.has_child_sum = true;
				is_from_primary_source |= member.is_from_primary_source;
			}
		}

		let sum = Dataset::new(
			year,
			Bucket::Sum,
			&entry_type,
			&version,
			is_from_primary_source,
		);
		found.insert(sum.key.clone(), sum);
	}

	found.into_values().rev().collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::gl::entry::Source;

	fn entry(year: i64, month: i64, entry_type: &str, version: &str) -> LedgerEntry {
		let mut e = LedgerEntry::new(Source::Ledger);
		e.year = year;
		e.month = month;
		e.entry_type = entry_type.to_string();
		e.version = version.to_string();
		e
	}

	fn keys(datasets: &[Dataset]) -> Vec<&str> {
		datasets.iter().map(|d| d.key.as_str()).collect()
	}

	#[test]
	fn test_buckets() {
		assert_eq!(Bucket::from_month(0), Bucket::Year);
		assert_eq!(Bucket::from_month(1), Bucket::FirstHalf);
		assert_eq!(Bucket::from_month(6), Bucket::FirstHalf);
		assert_eq!(Bucket::from_month(7), Bucket::SecondHalf);
		assert_eq!(Bucket::from_month(12), Bucket::SecondHalf);
		assert_eq!(Bucket::from_month(13), Bucket::SecondHalf);
		assert_eq!(Bucket::from_month(-1), Bucket::FirstHalf);
	}

	#[test]
	fn test_key_format() {
		let key = DatasetKey::new(2023, Bucket::FirstHalf, "R", "1");
		assert_eq!(key.as_str(), "202301:R:1");
		let sum = DatasetKey::new(2023, Bucket::Sum, "R", "1");
		assert_eq!(sum.as_str(), "202399:R:1");
	}

	#[test]
	fn test_keys_do_not_collide() {
		// plain concatenation would render both as "2023" + "1" + ...
		let a = DatasetKey::new(2023, Bucket::FirstHalf, "R", "1");
		let b = DatasetKey::new(202, Bucket::Year, "31R", "1");
		assert_ne!(a, b);
	}

	#[test]
	fn test_separator_inside_type_or_version() {
		let entries = vec![entry(2023, 2, "R:1", "2"), entry(2023, 2, "R", "1:2")];
		let datasets = partition(&entries);

		assert_eq!(keys(&datasets), vec!["202301:R\\:1:2", "202301:R:1\\:2"]);
		for e in &entries {
			let matching: Vec<&Dataset> = datasets
				.iter()
				.filter(|d| !d.is_sum && d.accepts(e))
				.collect();
			assert_eq!(matching.len(), 1);
			assert_eq!(matching[0].filter.entry_type, e.entry_type);
		}
	}

	#[test]
	fn test_years_outside_four_digits_keep_order() {
		let datasets = partition(&[
			entry(-1, 3, "R", "1"),
			entry(20231, 3, "R", "1"),
			entry(2023, 3, "R", "1"),
			entry(9999, 9, "R", "1"),
		]);

		assert_eq!(
			keys(&datasets),
			vec!["2023101:R:1", "999902:R:1", "202301:R:1", "-00101:R:1"]
		);
	}

	#[test]
	fn test_single_dataset() {
		let datasets = partition(&[entry(2023, 3, "R", "1"), entry(2023, 5, "R", "1")]);

		assert_eq!(keys(&datasets), vec!["202301:R:1"]);
		let d = &datasets[0];
		assert_eq!(d.description1, "Spring 2023");
		assert_eq!(d.description2, "R (1)");
		assert!(!d.is_yearly);
		assert!(!d.is_sum);
		assert!(!d.has_child_sum);
		assert_eq!(d.period, Period::first_half(2023));
	}

	#[test]
	fn test_sorted_most_recent_first() {
		let datasets = partition(&[
			entry(2022, 8, "Regnskap", "1"),
			entry(2024, 2, "Regnskap", "1"),
			entry(2023, 0, "Budsjett", "A"),
		]);

		assert_eq!(
			keys(&datasets),
			vec!["202401:Regnskap:1", "202300:Budsjett:A", "202202:Regnskap:1"]
		);
	}

	#[test]
	fn test_sum_dataset_for_split_year() {
		let datasets = partition(&[
			entry(2023, 2, "R", "1"),
			entry(2023, 9, "R", "1"),
			entry(2023, 9, "B", "1"),
		]);

		assert_eq!(
			keys(&datasets),
			vec!["202399:R:1", "202302:R:1", "202302:B:1", "202301:R:1"]
		);

		let sum = &datasets[0];
		assert!(sum.is_sum);
		assert!(sum.is_yearly);
		assert!(!sum.has_child_sum);
		assert_eq!(sum.description1, "Year 2023");
		assert_eq!(sum.period, Period::whole_year(2023));

		let flagged: Vec<&str> = datasets
			.iter()
			.filter(|d| d.has_child_sum)
			.map(|d| d.key.as_str())
			.collect();
		assert_eq!(flagged, vec!["202302:R:1", "202301:R:1"]);
	}

	#[test]
	fn test_no_sum_for_different_versions() {
		let datasets =
			partition(&[entry(2023, 2, "R", "1"), entry(2023, 9, "R", "2")]);
		assert!(datasets.iter().all(|d| !d.is_sum && !d.has_child_sum));
	}

	#[test]
	fn test_every_entry_in_exactly_one_primary_dataset() {
		let entries = vec![
			entry(2023, 0, "R", "1"),
			entry(2023, 1, "R", "1"),
			entry(2023, 6, "R", "1"),
			entry(2023, 7, "R", "1"),
			entry(2023, 12, "B", "1"),
			entry(2024, 4, "R", "1"),
		];
		let datasets = partition(&entries);

		for e in &entries {
			let matching: Vec<&Dataset> = datasets
				.iter()
				.filter(|d| !d.is_sum && d.accepts(e))
				.collect();
			assert_eq!(matching.len(), 1);
			let d = matching[0];
			assert_eq!(d.year(), e.year);
			assert_eq!(d.filter.bucket, Bucket::from_month(e.month));
		}
	}

	#[test]
	fn test_sum_accepts_union_of_contributors() {
		let entries = vec![
			entry(2023, 0, "R", "1"),
			entry(2023, 4, "R", "1"),
			entry(2023, 10, "R", "1"),
			entry(2023, 10, "R", "2"),
			entry(2022, 10, "R", "1"),
		];
		let datasets = partition(&entries);
		let sum = datasets.iter().find(|d| d.is_sum).unwrap();
		let contributors: Vec<&Dataset> =
			datasets.iter().filter(|d| d.has_child_sum).collect();
		assert_eq!(contributors.len(), 3);

		for e in &entries {
			let in_union = contributors.iter().any(|d| d.accepts(e));
			assert_eq!(sum.accepts(e), in_union);
		}
	}

	#[test]
	fn test_sum_links_follow_sources() {
		let mut budget = entry(2023, 2, "B", "1");
		budget.source = Source::Budget;
		let mut budget2 = entry(2023, 8, "B", "1");
		budget2.source = Source::Budget;

		let datasets = partition(&[budget, budget2]);
		assert!(datasets.iter().all(|d| !d.is_from_primary_source));
	}

	#[test]
	fn test_exclude_accounts() {
		let mut a = entry(2023, 1, "R", "1");
		a.account_number = 8960;
		let mut b = entry(2023, 1, "R", "1");
		b.account_number = 3000;
		let mut c = entry(2023, 1, "R", "1");
		c.account_number = 9999;

		let kept = exclude_accounts(vec![a, b, c], &DEFAULT_EXCLUDED_ACCOUNTS);
		assert_eq!(kept.len(), 1);
		assert_eq!(kept[0].account_number, 3000);
	}

	#[test]
	fn test_selection() {
		let datasets = partition(&[
			entry(2023, 2, "R", "1"),
			entry(2023, 9, "R", "1"),
		]);

		let all = DatasetSelection::All.apply(&datasets);
		assert_eq!(all.len(), 3);

		let picked = DatasetSelection::Keys(vec![
			"202301:R:1".to_string(),
			"202399:R:1".to_string(),
			"bogus".to_string(),
		])
		.apply(&datasets);
		assert_eq!(keys(&picked), vec!["202399:R:1", "202301:R:1"]);
	}
}
