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
use crate::gl::department::{Departments, NO_DEPARTMENT};
use crate::gl::entry::LedgerEntry;
use crate::gl::project::{ProjectTree, ROOT_ID};
use std::collections::BTreeMap;
use tracing::warn;

/// account number -> rows, in the order they were read
type AccountRows = BTreeMap<i64, Vec<LedgerEntry>>;

/// The general ledger indexed for reporting: department number -> project
/// id -> account number -> rows.
///
/// Every reference is resolved while indexing. Rows on a department that is
/// not in the table end up under NO_DEPARTMENT and rows on an unknown
/// project under the root, so every row is reachable from the report.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ledger {
	departments: BTreeMap<i64, BTreeMap<i64, AccountRows>>,
}

impl Ledger {
	/// When datasets are given, only rows that at least one of them accepts
	/// are indexed.
	pub fn index(
		entries: &[LedgerEntry],
		departments: &Departments,
		projects: &ProjectTree,
		datasets: Option<&[Dataset]>,
	) -> Self {
		let mut ledger = Self::default();

		for entry in entries {
			if let Some(datasets) = datasets {
				if !datasets.iter().any(|d| d.accepts(entry)) {
					continue;
				}
			}

			let department = departments.resolve(entry.department_number);
			let project = match projects.resolve(entry) {
				Some(id) => id,
				None => {
					warn!(
						"lookup of project failed: number {}{}",
						entry.project_number,
						entry
							.project_id
							.map(|id| format!(", id {}", id))
							.unwrap_or_default()
					);
					ROOT_ID
				},
			};

			ledger
				.departments
				.entry(department)
				.or_default()
				.entry(project)
				.or_default()
				.entry(entry.account_number)
				.or_default()
				.push(entry.clone());
		}

		ledger
	}

	pub fn has_department(&self, department: i64) -> bool {
		self.departments.contains_key(&department)
	}

	/// Whether anything was posted without a (known) department.
	pub fn has_unassigned_department(&self) -> bool {
		self.has_department(NO_DEPARTMENT)
	}

	/// Account numbers with rows on the project within the department.
	pub fn accounts(&self, department: i64, project: i64) -> Vec<i64> {
		self.rows_by_account(department, project)
			.map(|rows| rows.keys().copied().collect())
			.unwrap_or_default()
	}

	/// Rows on one account of a project within a department.
	pub fn account_entries(
		&self,
		department: i64,
		project: i64,
		account: i64,
	) -> &[LedgerEntry] {
		self.rows_by_account(department, project)
			.and_then(|rows| rows.get(&account))
			.map(|rows| rows.as_slice())
			.unwrap_or(&[])
	}

	/// Rows on a project within a department across all accounts, ordered
	/// by account and then by input order.
	pub fn entries_for(
		&self,
		department: i64,
		project: i64,
	) -> impl Iterator<Item = &LedgerEntry> {
		self.rows_by_account(department, project)
			.into_iter()
			.flat_map(|rows| rows.values().flatten())
	}

	/// Rows on a project regardless of department.
	pub fn entries_for_all_departments(
		&self,
		project: i64,
	) -> impl Iterator<Item = &LedgerEntry> {
		self.departments
			.values()
			.filter_map(move |projects| projects.get(&project))
			.flat_map(|rows| rows.values().flatten())
	}

	/// Total number of indexed rows.
	pub fn len(&self) -> usize {
		self.departments
			.values()
			.flat_map(|projects| projects.values())
			.flat_map(|rows| rows.values())
			.map(|rows| rows.len())
			.sum()
	}

	fn rows_by_account(&self, department: i64, project: i64) -> Option<&AccountRows> {
		self.departments
			.get(&department)
			.and_then(|projects| projects.get(&project))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::gl::dataset::partition;
	use crate::gl::department::Department;
	use crate::gl::entry::Source;
	use crate::gl::project::ProjectRecord;

	fn tree() -> ProjectTree {
		ProjectTree::build(vec![
			ProjectRecord {
				id: 1,
				parent: 0,
				number: Some(10),
				title: "Alpha".to_string(),
			},
			ProjectRecord {
				id: 2,
				parent: 10,
				number: Some(20),
				title: "Beta".to_string(),
			},
		])
	}

	fn departments() -> Departments {
		Departments::new(vec![
			Department {
				id: 101,
				number: 1,
				name: "Bar".to_string(),
			},
			Department {
				id: 102,
				number: 2,
				name: "Kafe".to_string(),
			},
		])
	}

	fn entry(department: i64, project: i64, account: i64, amount: f64) -> LedgerEntry {
		let mut e = LedgerEntry::new(Source::Ledger);
		e.department_number = department;
		e.project_number = project;
		e.account_number = account;
		e.year = 2023;
		e.month = 3;
		e.entry_type = "R".to_string();
		e.version = "1".to_string();
		e.amount_in = amount;
		e
	}

	#[test]
	fn test_index_resolves_references() {
		let entries = vec![
			entry(1, 10, 3000, 1.0),
			entry(2, 20, 3000, 2.0),
			entry(9, 10, 3000, 3.0), // unknown department
			entry(1, 77, 4000, 4.0), // unknown project
			entry(1, 0, 4000, 5.0),
		];
		let ledger = Ledger::index(&entries, &departments(), &tree(), None);

		assert_eq!(ledger.len(), entries.len());
		assert_eq!(ledger.accounts(1, 1), vec![3000]);
		assert_eq!(ledger.accounts(2, 2), vec![3000]);
		assert_eq!(ledger.accounts(NO_DEPARTMENT, 1), vec![3000]);
		assert!(ledger.has_unassigned_department());

		let unassigned: Vec<f64> =
			ledger.entries_for(1, ROOT_ID).map(|e| e.amount_in).collect();
		assert_eq!(unassigned, vec![4.0, 5.0]);
	}

	#[test]
	fn test_input_order_kept_within_bucket() {
		let entries = vec![
			entry(1, 10, 3000, 3.0),
			entry(1, 10, 3000, 1.0),
			entry(1, 10, 3000, 2.0),
		];
		let ledger = Ledger::index(&entries, &departments(), &tree(), None);

		let amounts: Vec<f64> = ledger
			.account_entries(1, 1, 3000)
			.iter()
			.map(|e| e.amount_in)
			.collect();
		assert_eq!(amounts, vec![3.0, 1.0, 2.0]);
		assert!(ledger.account_entries(1, 1, 9999).is_empty());
	}

	#[test]
	fn test_dataset_filtering() {
		let mut old = entry(1, 10, 3000, 1.0);
		old.year = 2020;
		let current = entry(1, 10, 3000, 2.0);

		let datasets = partition(std::slice::from_ref(&current));
		let ledger = Ledger::index(
			&[old.clone(), current.clone()],
			&departments(),
			&tree(),
			Some(datasets.as_slice()),
		);
		assert_eq!(ledger.len(), 1);

		let historical =
			Ledger::index(&[old, current], &departments(), &tree(), None);
		assert_eq!(historical.len(), 2);
	}

	#[test]
	fn test_collapsed_departments() {
		let single = Departments::new(vec![Department {
			id: 101,
			number: 1,
			name: "Bar".to_string(),
		}])
		.collapse_if_single();

		let ledger =
			Ledger::index(&[entry(1, 10, 3000, 1.0)], &single, &tree(), None);
		assert!(!ledger.has_department(1));
		assert_eq!(ledger.accounts(NO_DEPARTMENT, 1), vec![3000]);
	}

	#[test]
	fn test_all_departments() {
		let entries = vec![entry(1, 10, 3000, 1.0), entry(2, 10, 4000, 2.0)];
		let ledger = Ledger::index(&entries, &departments(), &tree(), None);

		assert_eq!(ledger.entries_for_all_departments(1).count(), 2);
		assert_eq!(ledger.entries_for_all_departments(2).count(), 0);
		assert_eq!(ledger.len(), 2);
	}
}
