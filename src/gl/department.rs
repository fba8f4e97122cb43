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
use std::collections::BTreeMap;

/// Department number used for rows without a (known) department.
pub const NO_DEPARTMENT: i64 = 0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Department {
	pub id: i64,
	pub number: i64,
	pub name: String,
}

/// The department table, keyed by department number.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Departments {
	by_number: BTreeMap<i64, Department>,
}

impl Department {
	/// Stand-in for rows that carry no department, created only when such
	/// rows exist.
	pub fn unassigned() -> Self {
		Self {
			id: 0,
			number: NO_DEPARTMENT,
			name: "No department".to_string(),
		}
	}
}

impl Departments {
	pub fn new(departments: Vec<Department>) -> Self {
		Self {
			by_number: departments.into_iter().map(|d| (d.number, d)).collect(),
		}
	}

	/// A single department adds nothing to a report but an extra level, so
	/// in that case the whole dimension is dropped and every row falls
	/// under NO_DEPARTMENT.
	pub fn collapse_if_single(self) -> Self {
		if self.by_number.len() == 1 {
			Self::default()
		} else {
			self
		}
	}

	pub fn contains(&self, number: i64) -> bool {
		self.by_number.contains_key(&number)
	}

	pub fn is_empty(&self) -> bool {
		self.by_number.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Department> {
		self.by_number.values()
	}

	/// Maps a department number from a ledger row to the bucket it belongs
	/// in; unknown numbers become NO_DEPARTMENT.
	pub fn resolve(&self, number: i64) -> i64 {
		if self.contains(number) {
			number
		} else {
			NO_DEPARTMENT
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn department(id: i64, number: i64, name: &str) -> Department {
		Department {
			id,
			number,
			name: name.to_string(),
		}
	}

	#[test]
	fn test_resolve_unknown() {
		let departments = Departments::new(vec![
			department(11, 1, "Bar"),
			department(12, 2, "Kafe"),
		]);
		assert_eq!(departments.resolve(2), 2);
		assert_eq!(departments.resolve(7), NO_DEPARTMENT);
	}

	#[test]
	fn test_collapse_single() {
		let single = Departments::new(vec![department(11, 1, "Bar")]);
		assert!(single.collapse_if_single().is_empty());

		let two = Departments::new(vec![
			department(11, 1, "Bar"),
			department(12, 2, "Kafe"),
		]);
		assert_eq!(two.collapse_if_single().iter().count(), 2);
	}

	#[test]
	fn test_iteration_in_number_order() {
		let departments = Departments::new(vec![
			department(12, 20, "Kafe"),
			department(11, 10, "Bar"),
		]);
		let numbers: Vec<i64> = departments.iter().map(|d| d.number).collect();
		assert_eq!(numbers, vec![10, 20]);
	}
}
