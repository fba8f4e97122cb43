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
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// System id of the synthetic root, which doubles as "no project".
pub const ROOT_ID: i64 = 0;

const ROOT_TITLE: &str = "* No project assigned";

/// A project line as read from the export, before it is placed in the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectRecord {
	pub id: i64,
	/// Project number of the parent, 0 for top level projects
	pub parent: i64,
	/// None when the export had no usable project number
	pub number: Option<i64>,
	pub title: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Project {
	/// System id in the accounting system; the key of the tree
	pub id: i64,
	/// Project number that ledger rows are posted against
	pub number: i64,
	/// None only for the root
	pub parent: Option<i64>,
	pub title: String,
	children: Vec<i64>,
}

/// The project hierarchy. Built once from the flat project list and never
/// changed afterwards. Every project is reachable from the root, and the
/// children of each project are ordered by title.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectTree {
	projects: BTreeMap<i64, Project>,
	ids_by_number: BTreeMap<i64, i64>,
}

/// Selects part of the ledger by project, as offered next to the report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectFilter {
	/// Rows posted without any project
	Unassigned,
	/// Rows posted on the project with this system id or any descendant
	Subtree(i64),
}

impl Project {
	fn root() -> Self {
		Self {
			id: ROOT_ID,
			number: 0,
			parent: None,
			title: ROOT_TITLE.to_string(),
			children: vec![],
		}
	}

	pub fn is_root(&self) -> bool {
		self.id == ROOT_ID
	}
}

impl ProjectTree {
	/// Builds the tree in two passes: all projects are indexed by id first,
	/// and only then wired to their parents, in title order so that every
	/// list of children comes out sorted. Records name their parent by
	/// project number, which is translated to a system id in between.
	pub fn build(records: Vec<ProjectRecord>) -> Self {
		let mut projects = BTreeMap::new();
		projects.insert(ROOT_ID, Project::root());
		let mut parent_numbers = BTreeMap::new();

		for record in records {
			if record.id == ROOT_ID {
				debug!("project '{}' uses the reserved id 0", record.title);
				continue;
			}

			let number = record.number.unwrap_or_else(|| {
				warn!(
					"project '{}' is missing its project number, ledger \
					 rows for it cannot be matched",
					record.title
				);
				-record.id
			});

			parent_numbers.insert(record.id, record.parent);
			let project = Project {
				id: record.id,
				number,
				parent: Some(ROOT_ID),
				title: record.title,
				children: vec![],
			};

			if projects.insert(project.id, project).is_some() {
				debug!("project id {} listed twice, keeping the last", record.id);
			}
		}

		let ids_by_number: BTreeMap<i64, i64> = projects
			.values()
			.filter(|p| !p.is_root())
			.map(|p| (p.number, p.id))
			.collect();

		for project in projects.values_mut().filter(|p| !p.is_root()) {
			let parent_number =
				parent_numbers.get(&project.id).copied().unwrap_or(0);
			if parent_number == 0 {
				continue;
			}

			match ids_by_number.get(&parent_number) {
				Some(id) => project.parent = Some(*id),
				None => debug!(
					"project {} has unknown parent {}, placing it at the top",
					project.number, parent_number
				),
			}
		}

		Self::break_cycles(&mut projects);

		let mut order: Vec<i64> = projects.keys().copied().collect();
		order.sort_by(|a, b| {
			let (pa, pb) = (&projects[a], &projects[b]);
			pa.title
				.to_lowercase()
				.cmp(&pb.title.to_lowercase())
				.then_with(|| pa.title.cmp(&pb.title))
				.then_with(|| a.cmp(b))
		});

		for id in order {
			if id == ROOT_ID {
				continue;
			}
			let parent = projects[&id].parent.unwrap_or(ROOT_ID);
			if let Some(p) = projects.get_mut(&parent) {
				p.children.push(id);
			}
		}

		Self {
			projects,
			ids_by_number,
		}
	}

	/// Attaches the project where a parent chain loops back on itself to
	/// the root, a project that is its own parent included.
	fn break_cycles(projects: &mut BTreeMap<i64, Project>) {
		let ids: Vec<i64> = projects.keys().copied().collect();
		for start in ids {
			let mut seen = HashSet::from([start]);
			let mut cursor = projects[&start].parent;
			while let Some(current) = cursor {
				if current == ROOT_ID {
					break;
				}
				if current == start {
					debug!("project {} is part of a parent cycle", start);
					if let Some(p) = projects.get_mut(&start) {
						p.parent = Some(ROOT_ID);
					}
					break;
				}
				if !seen.insert(current) {
					// a cycle further up that this project is not part of;
					// it is broken when one of its members comes up
					break;
				}
				cursor = projects[&current].parent;
			}
		}
	}

	pub fn root(&self) -> &Project {
		&self.projects[&ROOT_ID]
	}

	pub fn get(&self, id: i64) -> Option<&Project> {
		self.projects.get(&id)
	}

	pub fn contains(&self, id: i64) -> bool {
		self.projects.contains_key(&id)
	}

	/// Number of projects, including the root.
	pub fn len(&self) -> usize {
		self.projects.len()
	}

	pub fn children<'a>(
		&'a self,
		project: &'a Project,
	) -> impl Iterator<Item = &'a Project> + 'a {
		project
			.children
			.iter()
			.filter_map(move |id| self.projects.get(id))
	}

	pub fn id_for_number(&self, number: i64) -> Option<i64> {
		self.ids_by_number.get(&number).copied()
	}

	/// Finds the project a ledger row is posted on. A system id on the row
	/// wins over the project number. Returns None for references that do
	/// not exist in the tree; rows without any project resolve to the root.
	pub fn resolve(&self, entry: &LedgerEntry) -> Option<i64> {
		if let Some(id) = entry.project_id {
			return self.contains(id).then_some(id);
		}

		if entry.project_number == 0 {
			return Some(ROOT_ID);
		}

		self.id_for_number(entry.project_number)
	}

	/// All projects in pre-order, with their depth below the root.
	pub fn walk(&self) -> Vec<(usize, &Project)> {
		let mut out = Vec::with_capacity(self.projects.len());
		let mut stack = vec![(0, self.root())];

		while let Some((depth, project)) = stack.pop() {
			out.push((depth, project));
			for child in self.children(project).collect::<Vec<_>>().into_iter().rev()
			{
				stack.push((depth + 1, child));
			}
		}

		out
	}

	/// System ids of the project and every project below it.
	pub fn subtree_ids(&self, id: i64) -> HashSet<i64> {
		let mut ids = HashSet::new();
		let mut stack: Vec<i64> = vec![id];

		while let Some(current) = stack.pop() {
			if let Some(project) = self.get(current) {
				if ids.insert(current) {
					stack.extend(project.children.iter().copied());
				}
			}
		}

		ids
	}

	/// The chain of projects from the top of the tree down to the given
	/// one, not including the root.
	pub fn path(&self, id: i64) -> Vec<&Project> {
		let mut path = vec![];
		let mut cursor = self.get(id);

		while let Some(project) = cursor {
			if project.is_root() {
				break;
			}
			path.push(project);
			cursor = project.parent.and_then(|p| self.projects.get(&p));
		}

		path.reverse();
		path
	}
}

/// Keeps the rows matching the filter, in their original order. Rows on
/// projects missing from the tree count as posted on no project when
/// filtering a subtree, the same way they are bucketed for the report.
pub fn filter_ledger_by_project(
	entries: &[LedgerEntry],
	projects: &ProjectTree,
	filter: ProjectFilter,
) -> Vec<LedgerEntry> {
	match filter {
		ProjectFilter::Unassigned => entries
			.iter()
			.filter(|e| e.project_number == 0 && e.project_id.is_none())
			.cloned()
			.collect(),
		ProjectFilter::Subtree(id) => {
			let ids = projects.subtree_ids(id);
			entries
				.iter()
				.filter(|e| {
					ids.contains(&projects.resolve(e).unwrap_or(ROOT_ID))
				})
				.cloned()
				.collect()
		},
	}
}
