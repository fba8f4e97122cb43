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
use crate::gl::account::Accounts;
use crate::gl::dataset::{
	exclude_accounts, partition, Dataset, DatasetSelection,
	DEFAULT_EXCLUDED_ACCOUNTS,
};
use crate::gl::department::Departments;
use crate::gl::entry::{LedgerEntry, Source};
use crate::gl::ledger::Ledger;
use crate::gl::links::{LinkBuilder, DEFAULT_BASE_URL};
use crate::gl::project::{filter_ledger_by_project, ProjectFilter, ProjectTree};
use crate::gl::total::Totals;
use crate::parsing::filesystem::Inputs;
use crate::parsing::parser::Parser;
use anyhow::{bail, Error};
use tracing::debug;

/// How the user picks a project to narrow the report to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectSelector {
	Unassigned,
	Number(i64),
}

#[derive(Clone, Debug)]
pub struct Options {
	pub excluded_accounts: Vec<i64>,
	pub selection: DatasetSelection,
	pub project: Option<ProjectSelector>,
	/// Index every row, not only those in the visible datasets, so accounts
	/// that were used in earlier periods still show up
	pub historical: bool,
	pub base_url: String,
	/// Used when the exports carry no context id
	pub context_id: Option<i64>,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			excluded_accounts: DEFAULT_EXCLUDED_ACCOUNTS.to_vec(),
			selection: DatasetSelection::All,
			project: None,
			historical: false,
			base_url: DEFAULT_BASE_URL.to_string(),
			context_id: None,
		}
	}
}

/// Everything derived from one set of exports, computed from scratch.
#[derive(Debug)]
pub struct Report {
	pub accounts: Accounts,
	pub departments: Departments,
	pub tree: ProjectTree,
	/// Every row that is not on an excluded account, ledger rows first
	pub entries: Vec<LedgerEntry>,
	/// Every dataset in the exports, most recent first
	pub datasets: Vec<Dataset>,
	/// The datasets shown as report columns
	pub visible: Vec<Dataset>,
	pub project_filter: Option<ProjectFilter>,
	pub ledger: Ledger,
	pub totals: Totals,
	pub links: LinkBuilder,
}

impl Report {
	pub fn build(inputs: &Inputs, options: &Options) -> Result<Self, Error> {
		let parser = Parser::new();

		let accounts = parser.accounts(&inputs.accounts);
		let departments =
			Departments::new(parser.departments(&inputs.departments))
				.collapse_if_single();
		let tree = ProjectTree::build(parser.projects(&inputs.projects));

		let mut entries = parser.ledger(&inputs.ledger, Source::Ledger);
		entries.extend(parser.ledger(&inputs.budget, Source::Budget));
		let entries = exclude_accounts(entries, &options.excluded_accounts);
		debug!(
			"read {} accounts, {} projects and {} ledger rows",
			accounts.len(),
			tree.len(),
			entries.len()
		);

		let datasets = partition(&entries);
		let visible = options.selection.apply(&datasets);

		let project_filter = match options.project {
			None => None,
			Some(ProjectSelector::Unassigned) => Some(ProjectFilter::Unassigned),
			Some(ProjectSelector::Number(number)) => {
				match tree.id_for_number(number) {
					Some(id) => Some(ProjectFilter::Subtree(id)),
					None => bail!("No project with number {}", number),
				}
			},
		};

		let ledger = {
			let filtered = match project_filter {
				Some(filter) => filter_ledger_by_project(&entries, &tree, filter),
				None => entries.clone(),
			};
			let by_dataset = (!options.historical).then_some(visible.as_slice());
			Ledger::index(&filtered, &departments, &tree, by_dataset)
		};

		let totals = Totals::from_ledger(&visible, &tree, &departments, &ledger);

		let links = LinkBuilder::new(
			&options.base_url,
			inputs.context_id.or(options.context_id).unwrap_or_default(),
		);

		Ok(Self {
			accounts,
			departments,
			tree,
			entries,
			datasets,
			visible,
			project_filter,
			ledger,
			totals,
			links,
		})
	}

	/// The active project filter in words, e.g. `Parent -> Child (12)`.
	pub fn filter_description(&self) -> Option<String> {
		match self.project_filter? {
			ProjectFilter::Unassigned => Some(self.tree.root().title.clone()),
			ProjectFilter::Subtree(id) => {
				let path = self.tree.path(id);
				let last = path.last()?;
				let titles: Vec<&str> =
					path.iter().map(|p| p.title.as_str()).collect();
				Some(format!("{} ({})", titles.join(" -> "), last.number))
			},
		}
	}
}
