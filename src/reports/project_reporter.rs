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
use crate::gl::account::Account;
use crate::gl::department::{Department, NO_DEPARTMENT};
use crate::gl::project::Project;
use crate::gl::report::Report;
use crate::gl::total::{Sum, Summer};
use crate::reports::table::Table;
use crate::util::amount::format_cell;
use anyhow::{anyhow, Error};
use std::fmt::Write;

const UNSPECIFIED: &str = "Unspecified";
const INDENT: &str = "  ";

/// Which part of the cache a run of rows is read from.
#[derive(Clone, Copy, Debug)]
struct Section {
	/// Department number, None for all departments combined
	number: Option<i64>,
	/// Department id for links, None when departments are not reported
	link_id: Option<i64>,
	/// Indentation of the top level projects
	offset: usize,
}

/// Rows of the result table, plus the links that go with their result
/// cells.
struct Rows {
	table: Table,
	links: Vec<String>,
}

/// The result report: income, cost and result per visible dataset, for
/// every department and project that has anything posted in them.
pub struct ProjectReporter<'a> {
	report: &'a Report,
	show_accounts: bool,
	max_depth: Option<usize>,
	show_links: bool,
}

impl<'a> ProjectReporter<'a> {
	pub fn new(report: &'a Report) -> Self {
		Self {
			report,
			show_accounts: false,
			max_depth: None,
			show_links: false,
		}
	}

	/// Lists the accounts under each project.
	pub fn with_accounts(mut self, show: bool) -> Self {
		self.show_accounts = show;
		self
	}

	/// Projects deeper than this are only counted in their ancestors.
	pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
		self.max_depth = depth;
		self
	}

	/// Adds the links behind each result cell below the table.
	pub fn with_links(mut self, show: bool) -> Self {
		self.show_links = show;
		self
	}

	/// The aggregate cache, for consumption by other tools.
	pub fn render_json(&self) -> Result<String, Error> {
		serde_json::to_string_pretty(&self.report.totals)
			.map_err(|e| anyhow!("failed to serialize totals: {}", e))
	}

	pub fn render(&self) -> String {
		let mut out = String::new();
		let _ = writeln!(out, "Result report");
		if let Some(filter) = self.report.filter_description() {
			let _ = writeln!(out, "Filtered by project: {}", filter);
		}
		let _ = writeln!(out);

		let datasets = &self.report.visible;
		if datasets.is_empty() {
			let _ = writeln!(out, "Select one or more datasets to show the report.");
			return out;
		}

		let column_count = 1 + 3 * datasets.len();
		let mut rows = Rows {
			table: Table::new(column_count),
			links: vec![],
		};
		rows.table
			.right_align(&(1..column_count).collect::<Vec<usize>>());
		self.add_headers(&mut rows.table);

		if self.report.departments.is_empty() {
			let section = Section {
				number: None,
				link_id: None,
				offset: 0,
			};
			self.add_project(&mut rows, section, self.report.tree.root(), 0);
		} else {
			let mut departments: Vec<Department> =
				self.report.departments.iter().cloned().collect();
			if !self.report.departments.contains(NO_DEPARTMENT) {
				departments.push(Department::unassigned());
			}

			for department in departments {
				self.add_department(&mut rows, &department);
			}
		}

		rows.table
			.add_partial_separator(&(1..column_count).collect::<Vec<usize>>());
		self.add_sum_row(&mut rows, "Sum", None, None, None);

		out.push_str(&rows.table.render());

		if self.show_links && !rows.links.is_empty() {
			let _ = writeln!(out, "\nLinks");
			for link in rows.links {
				let _ = writeln!(out, "{}", link);
			}
		}

		out
	}

	fn add_headers(&self, table: &mut Table) {
		let name = if self.report.departments.is_empty() {
			"Project"
		} else {
			"Department / project"
		};

		let mut first = vec![name.to_string()];
		let mut second = vec![String::new()];
		let mut third = vec![String::new()];
		for dataset in &self.report.visible {
			first.extend([dataset.description1.clone(), String::new(), String::new()]);
			second.extend([dataset.description2.clone(), String::new(), String::new()]);
			third.extend(["Income".to_string(), "Cost".to_string(), "Result".to_string()]);
		}

		table.add_header(first);
		table.add_header(second);
		table.add_header(third);
		table.add_separator();
	}

	/// A summary row for the department followed by its projects. Skipped
	/// when nothing was posted on the department.
	fn add_department(&self, rows: &mut Rows, department: &Department) {
		let has_data = self
			.report
			.totals
			.scope(Some(department.number))
			.map(|sums| {
				sums.values()
					.any(|cells| cells.values().any(|s| !s.is_empty()))
			})
			.unwrap_or(false);
		if !has_data {
			return;
		}

		let root = self.report.tree.root();
		self.add_sum_row(
			rows,
			&department.name,
			Some(department.number),
			Some(department.id),
			Some(root),
		);

		let section = Section {
			number: Some(department.number),
			link_id: Some(department.id),
			offset: 1,
		};
		self.add_project(rows, section, root, 0);
	}

	/// Totals of the whole tree, for a department or for everything.
	fn add_sum_row(
		&self,
		rows: &mut Rows,
		label: &str,
		number: Option<i64>,
		link_id: Option<i64>,
		project: Option<&Project>,
	) {
		let root = project.unwrap_or_else(|| self.report.tree.root());
		let sums: Vec<Sum> = self
			.cells(number, root)
			.iter()
			.map(|summer| summer.total)
			.collect();

		rows.table.add_row(Self::row(label.to_string(), &sums));
		for dataset in &self.report.visible {
			if let Some(link) =
				dataset.result_report_link(&self.report.links, link_id, None, false)
			{
				rows.links.push(format!("{} [{}]: {}", label, dataset.key, link));
			}
		}
	}

	fn add_project(
		&self,
		rows: &mut Rows,
		section: Section,
		project: &Project,
		depth: usize,
	) {
		let cells = self.cells(section.number, project);
		if cells.iter().all(|summer| summer.is_empty()) {
			return;
		}

		let has_own_data = cells.iter().any(|s| s.own.count > 0);
		let has_subproject_data = cells.iter().any(|s| s.own.count != s.total.count);
		let expand = project.is_root()
			|| self.max_depth.map(|max| depth < max).unwrap_or(true);

		if !project.is_root() {
			let label = format!("{} {}", project.title, project.number);
			let totals: Vec<Sum> = cells.iter().map(|s| s.total).collect();
			rows.table.add_row(Self::row(
				Self::indented(section.offset + depth - 1, &label),
				&totals,
			));

			let only_own = has_own_data && !has_subproject_data;
			self.push_project_links(rows, section, project, &label, !only_own);

			if expand && !has_subproject_data {
				self.add_accounts(rows, section, project, section.offset + depth);
			}
		}

		if !expand {
			return;
		}

		let tree = &self.report.tree;
		for child in tree.children(project) {
			self.add_project(rows, section, child, depth + 1);
		}

		if (project.is_root() || has_subproject_data) && has_own_data {
			let own: Vec<Sum> = cells.iter().map(|s| s.own).collect();
			rows.table.add_row(Self::row(
				Self::indented(section.offset + depth, UNSPECIFIED),
				&own,
			));

			let label = format!("{} ({})", UNSPECIFIED, project.title);
			self.push_project_links(rows, section, project, &label, false);
			self.add_accounts(rows, section, project, section.offset + depth + 1);
		}
	}

	/// One row per account posted on the project itself.
	fn add_accounts(
		&self,
		rows: &mut Rows,
		section: Section,
		project: &Project,
		level: usize,
	) {
		if !self.show_accounts {
			return;
		}

		let ledger = &self.report.ledger;
		let department = section.number.unwrap_or(NO_DEPARTMENT);

		for account in ledger.accounts(department, project.id) {
			let entries = ledger.account_entries(department, project.id, account);
			let sums: Vec<Sum> = self
				.report
				.visible
				.iter()
				.map(|dataset| Sum::of(entries.iter().filter(|e| dataset.accepts(e))))
				.collect();

			let label = Account::label(&self.report.accounts, account);
			rows.table
				.add_row(Self::row(Self::indented(level, &label), &sums));

			for dataset in &self.report.visible {
				if let Some(link) = dataset.ledger_link(
					&self.report.links,
					section.link_id.unwrap_or(-1),
					project.id,
					account,
				) {
					rows.links.push(format!(
						"{} / {} [{}]: {}",
						project.title, label, dataset.key, link
					));
				}
			}
		}
	}

	fn push_project_links(
		&self,
		rows: &mut Rows,
		section: Section,
		project: &Project,
		label: &str,
		include_subprojects: bool,
	) {
		for dataset in &self.report.visible {
			if let Some(link) = dataset.result_report_link(
				&self.report.links,
				section.link_id,
				Some(project.id),
				include_subprojects,
			) {
				rows.links.push(format!("{} [{}]: {}", label, dataset.key, link));
			}
		}
	}

	/// The project's sums for every visible dataset, in column order.
	/// Projects missing from the cache count as empty.
	fn cells(&self, number: Option<i64>, project: &Project) -> Vec<Summer> {
		self.report
			.visible
			.iter()
			.map(|dataset| {
				self.report
					.totals
					.cell(number, project.id, &dataset.key)
					.copied()
					.unwrap_or_default()
			})
			.collect()
	}

	/// Income and cost are left blank when zero; the result shows whenever
	/// any rows went into it.
	fn row(label: String, sums: &[Sum]) -> Vec<String> {
		let mut row = Vec::with_capacity(1 + 3 * sums.len());
		row.push(label);
		for sum in sums {
			row.push(format_cell(sum.income(), false));
			row.push(format_cell(sum.cost(), false));
			row.push(format_cell(sum.result(), sum.count > 0));
		}
		row
	}

	fn indented(level: usize, label: &str) -> String {
		format!("{}{}", INDENT.repeat(level), label)
	}
}
