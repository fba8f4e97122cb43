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
use crate::gl::dataset::{Dataset, DatasetKey};
use crate::gl::department::{Departments, NO_DEPARTMENT};
use crate::gl::entry::LedgerEntry;
use crate::gl::ledger::Ledger;
use crate::gl::project::{Project, ProjectTree};
use anyhow::{bail, Error};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::AddAssign;

/// Amounts accumulated over a number of ledger rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Sum {
	#[serde(rename = "in")]
	pub amount_in: f64,
	#[serde(rename = "out")]
	pub amount_out: f64,
	pub count: u64,
}

/// The sums for one project within one dataset and department. `total`
/// includes every project below this one, `own` only what was posted on
/// the project itself.
///
/// Summers of a run live in one arena and point at their parent by index,
/// so that a row added to a project reaches the totals of every ancestor in
/// one pass up the chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Summer {
	pub total: Sum,
	#[serde(rename = "self")]
	pub own: Sum,
	#[serde(skip)]
	parent: Option<usize>,
}

/// project id -> dataset key -> sums
pub type ProjectSums = BTreeMap<i64, BTreeMap<DatasetKey, Summer>>;

/// The aggregate cache: sums for every project and visible dataset, per
/// department and for all departments combined.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Totals {
	#[serde(rename = "all")]
	pub combined: ProjectSums,
	pub departments: BTreeMap<i64, ProjectSums>,
}

impl Sum {
	/// Adds up the given rows.
	pub fn of<'e>(entries: impl IntoIterator<Item = &'e LedgerEntry>) -> Self {
		let mut sum = Self::default();
		for entry in entries {
			sum.add(entry);
		}
		sum
	}

	fn add(&mut self, entry: &LedgerEntry) {
		self.amount_in += entry.amount_in;
		self.amount_out += entry.amount_out;
		self.count += 1;
	}

	/// Income as shown on reports; it is booked as negative amounts in.
	pub fn income(&self) -> f64 {
		-self.amount_in
	}

	pub fn cost(&self) -> f64 {
		self.amount_out
	}

	pub fn result(&self) -> f64 {
		-self.amount_in - self.amount_out
	}

	fn approx_eq(&self, other: &Sum) -> bool {
		fn close(a: f64, b: f64) -> bool {
			(a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
		}

		self.count == other.count
			&& close(self.amount_in, other.amount_in)
			&& close(self.amount_out, other.amount_out)
	}
}

impl AddAssign for Sum {
	fn add_assign(&mut self, other: Self) {
		self.amount_in += other.amount_in;
		self.amount_out += other.amount_out;
		self.count += other.count;
	}
}

impl Summer {
	fn new(parent: Option<usize>) -> Self {
		Self {
			parent,
			..Default::default()
		}
	}

	/// Indirect rows were posted on a project further down, so they only
	/// count towards the total.
	pub fn add(&mut self, entry: &LedgerEntry, indirect: bool) {
		self.total.add(entry);
		if !indirect {
			self.own.add(entry);
		}
	}

	pub fn is_empty(&self) -> bool {
		self.total.count == 0
	}
}

/// Adds a row to the summer at `slot` and to the totals of all its
/// ancestors.
fn propagate(arena: &mut [Summer], slot: usize, entry: &LedgerEntry) {
	arena[slot].add(entry, false);

	let mut cursor = arena[slot].parent;
	while let Some(parent) = cursor {
		arena[parent].add(entry, true);
		cursor = arena[parent].parent;
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scope {
	Department(i64),
	Combined,
}

/// One pre-order pass over the project tree for one scope.
struct Walk<'a> {
	datasets: &'a [Dataset],
	tree: &'a ProjectTree,
	ledger: &'a Ledger,
	scope: Scope,

	arena: Vec<Summer>,
	/// (project id, dataset index, arena slot) in creation order
	cells: Vec<(i64, usize, usize)>,
}

impl<'a> Walk<'a> {
	fn new(
		datasets: &'a [Dataset],
		tree: &'a ProjectTree,
		ledger: &'a Ledger,
		scope: Scope,
	) -> Self {
		Self {
			datasets,
			tree,
			ledger,
			scope,
			arena: Vec::with_capacity(tree.len() * datasets.len()),
			cells: Vec::with_capacity(tree.len() * datasets.len()),
		}
	}

	fn run(mut self) -> ProjectSums {
		let tree = self.tree;
		self.visit(tree.root(), None);

		let mut sums = ProjectSums::new();
		for (project, dataset, slot) in self.cells {
			sums.entry(project)
				.or_default()
				.insert(self.datasets[dataset].key.clone(), self.arena[slot]);
		}

		sums
	}

	/// A project's own rows are added before any of its children are
	/// visited, so each parent chain is complete when a row is propagated.
	fn visit(&mut self, project: &'a Project, parents: Option<&[usize]>) {
		let mut slots = Vec::with_capacity(self.datasets.len());
		for dataset in 0..self.datasets.len() {
			let slot = self.arena.len();
			self.arena.push(Summer::new(parents.map(|p| p[dataset])));
			self.cells.push((project.id, dataset, slot));
			slots.push(slot);
		}

		let ledger = self.ledger;
		let entries: Box<dyn Iterator<Item = &'a LedgerEntry> + 'a> =
			match self.scope {
				Scope::Department(department) => {
					Box::new(ledger.entries_for(department, project.id))
				},
				Scope::Combined => {
					Box::new(ledger.entries_for_all_departments(project.id))
				},
			};

		for entry in entries {
			for (index, dataset) in self.datasets.iter().enumerate() {
				if dataset.accepts(entry) {
					propagate(&mut self.arena, slots[index], entry);
				}
			}
		}

		let tree = self.tree;
		for child in tree.children(project) {
			self.visit(child, Some(slots.as_slice()));
		}
	}
}

impl Totals {
	/// Aggregates the indexed ledger for every department in the table, the
	/// "no department" bucket if anything landed there, and all departments
	/// combined.
	pub fn from_ledger(
		datasets: &[Dataset],
		tree: &ProjectTree,
		departments: &Departments,
		ledger: &Ledger,
	) -> Self {
		let mut numbers: Vec<i64> = departments.iter().map(|d| d.number).collect();
		if ledger.has_unassigned_department() && !numbers.contains(&NO_DEPARTMENT)
		{
			numbers.push(NO_DEPARTMENT);
		}

		let departments = numbers
			.into_iter()
			.map(|number| {
				let sums =
					Walk::new(datasets, tree, ledger, Scope::Department(number))
						.run();
				(number, sums)
			})
			.collect();

		Self {
			combined: Walk::new(datasets, tree, ledger, Scope::Combined).run(),
			departments,
		}
	}

	/// The sums of one department, or of all departments combined.
	pub fn scope(&self, department: Option<i64>) -> Option<&ProjectSums> {
		match department {
			Some(number) => self.departments.get(&number),
			None => Some(&self.combined),
		}
	}

	pub fn cell(
		&self,
		department: Option<i64>,
		project: i64,
		key: &DatasetKey,
	) -> Option<&Summer> {
		self.scope(department)
			.and_then(|sums| sums.get(&project))
			.and_then(|cells| cells.get(key))
	}

	/// Checks that every total is the project's own sum plus the totals of
	/// its children. Counts must match exactly; amounts may differ by float
	/// rounding only.
	pub fn verify(&self, tree: &ProjectTree) -> Result<(), Error> {
		let scopes = std::iter::once((None, &self.combined)).chain(
			self.departments
				.iter()
				.map(|(number, sums)| (Some(*number), sums)),
		);

		for (department, sums) in scopes {
			let scope_name = match department {
				Some(number) => format!("department {}", number),
				None => "all departments".to_string(),
			};

			for (_, project) in tree.walk() {
				let Some(cells) = sums.get(&project.id) else {
					bail!("No sums for project {} in {}", project.id, scope_name);
				};

				for (key, summer) in cells {
					if summer.total.count < summer.own.count {
						bail!(
							"Project {} in {} has fewer rows in total than \
							 on itself for {}",
							project.id,
							scope_name,
							key
						);
					}

					let mut expected = summer.own;
					for child in tree.children(project) {
						match sums.get(&child.id).and_then(|c| c.get(key)) {
							Some(c) => expected += c.total,
							None => bail!(
								"No sums for project {} in {} for {}",
								child.id,
								scope_name,
								key
							),
						}
					}

					if !summer.total.approx_eq(&expected) {
						bail!(
							"Total of project {} in {} for {} does not add up: \
							 {:?} vs {:?}",
							project.id,
							scope_name,
							key,
							summer.total,
							expected
						);
					}
				}
			}
		}

		Ok(())
	}
}
