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
use crate::util::number::{lenient_float, lenient_int};
use std::collections::BTreeMap;

/// Where a ledger row came from. Rows exported from the accounting system
/// can be linked back into it; budget rows cannot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
	Ledger,
	Budget,
}

/// One posted line, aggregated per month, department, project and account
/// by the exporter. Values that did not parse are already coerced to zero
/// and references are kept as given; resolution against the department and
/// project tables happens when the ledger is indexed.
#[derive(Clone, Debug, PartialEq)]
pub struct LedgerEntry {
	pub department_number: i64,
	pub account_number: i64,
	pub project_number: i64, // 0 means no project
	/// System id of the project, only present in exports that carry it
	pub project_id: Option<i64>,
	pub year: i64,
	pub month: i64, // 0 means the row covers the whole year
	pub entry_type: String,
	pub version: String,
	pub amount_in: f64,
	pub amount_out: f64,
	pub source: Source,

	/// Any columns not listed in Column, e.g. descriptions on budget rows
	pub extra: BTreeMap<String, String>,
}

/// The columns of the ledger export with a fixed meaning. Headers are
/// matched on either the Norwegian names the exporter writes or their
/// English equivalents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
	DepartmentNumber,
	AccountNumber,
	ProjectNumber,
	ProjectId,
	Year,
	Month,
	Type,
	Version,
	AmountIn,
	AmountOut,
}

impl Column {
	pub fn from_header(header: &str) -> Option<Self> {
		match header.trim() {
			"Avdelingsnummer" | "DepartmentNumber" => {
				Some(Column::DepartmentNumber)
			},
			"Kontonummer" | "AccountNumber" => Some(Column::AccountNumber),
			"Prosjektnummer" | "ProjectNumber" => Some(Column::ProjectNumber),
			"ProsjektId" | "ProjectId" => Some(Column::ProjectId),
			"År" | "Year" => Some(Column::Year),
			"Måned" | "Month" => Some(Column::Month),
			"Type" => Some(Column::Type),
			"Versjon" | "Version" => Some(Column::Version),
			"BeløpInn" | "AmountIn" => Some(Column::AmountIn),
			"BeløpUt" | "AmountOut" => Some(Column::AmountOut),
			_ => None,
		}
	}
}

impl LedgerEntry {
	pub fn new(source: Source) -> Self {
		Self {
			department_number: 0,
			account_number: 0,
			project_number: 0,
			project_id: None,
			year: 0,
			month: 0,
			entry_type: String::new(),
			version: String::new(),
			amount_in: 0.0,
			amount_out: 0.0,
			source,
			extra: BTreeMap::new(),
		}
	}

	/// Stores a raw field value under its column, converting it to the type
	/// the column carries.
	pub fn set(&mut self, column: Column, raw: &str) {
		match column {
			Column::DepartmentNumber => self.department_number = lenient_int(raw),
			Column::AccountNumber => self.account_number = lenient_int(raw),
			Column::ProjectNumber => self.project_number = lenient_int(raw),
			Column::ProjectId => {
				self.project_id = Some(lenient_int(raw)).filter(|id| *id != 0)
			},
			Column::Year => self.year = lenient_int(raw),
			Column::Month => self.month = lenient_int(raw),
			Column::Type => self.entry_type = raw.to_string(),
			Column::Version => self.version = raw.to_string(),
			Column::AmountIn => self.amount_in = lenient_float(raw),
			Column::AmountOut => self.amount_out = lenient_float(raw),
		}
	}

	pub fn is_from_primary_source(&self) -> bool {
		self.source == Source::Ledger
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_headers_in_both_languages() {
		assert_eq!(
			Column::from_header("Avdelingsnummer"),
			Some(Column::DepartmentNumber)
		);
		assert_eq!(
			Column::from_header("DepartmentNumber"),
			Some(Column::DepartmentNumber)
		);
		assert_eq!(Column::from_header("År"), Some(Column::Year));
		assert_eq!(Column::from_header(" BeløpUt "), Some(Column::AmountOut));
		assert_eq!(Column::from_header("Beskrivelse"), None);
	}

	#[test]
	fn test_set_converts_types() {
		let mut entry = LedgerEntry::new(Source::Ledger);
		entry.set(Column::Year, "2023");
		entry.set(Column::Month, "garbage");
		entry.set(Column::AmountIn, "-150.5");
		entry.set(Column::Type, "Regnskap");

		assert_eq!(entry.year, 2023);
		assert_eq!(entry.month, 0);
		assert_eq!(entry.amount_in, -150.5);
		assert_eq!(entry.entry_type, "Regnskap");
	}

	#[test]
	fn test_zero_project_id_means_absent() {
		let mut entry = LedgerEntry::new(Source::Budget);
		entry.set(Column::ProjectId, "0");
		assert_eq!(entry.project_id, None);
		entry.set(Column::ProjectId, "17");
		assert_eq!(entry.project_id, Some(17));
	}

	#[test]
	fn test_primary_source() {
		assert!(LedgerEntry::new(Source::Ledger).is_from_primary_source());
		assert!(!LedgerEntry::new(Source::Budget).is_from_primary_source());
	}
}
