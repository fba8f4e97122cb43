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
use crate::config::config_file::Config;
use crate::gl::dataset::DatasetSelection;
use crate::gl::report::{Options, ProjectSelector, Report};
use crate::parsing::filesystem::Filesystem;
use crate::reports::dataset_reporter::DatasetReporter;
use crate::reports::project_reporter::ProjectReporter;
use crate::reports::tree_reporter::{render_accounts, render_tree};
use crate::util::logging::init_tracing;
use anyhow::{bail, Error};
use clap::{Parser, ValueEnum};
use std::path::Path;
use tracing::debug;

mod config;
mod gl;
mod parsing;
mod reports;
mod util;

#[derive(Parser)]
#[command(
	name = "hovedbok",
	version = "0.1",
	about = "Project and department result reports from accounting exports"
)]
struct Cli {
	// ----------------
	// -- POSITIONAL --
	// ----------------
	/// The command to execute
	command: Directive,

	// -----------
	// -- FLAGS --
	// -----------
	/// Directory holding the exported files
	#[arg(short, long)]
	dir: String,

	/// Custom config file location (default: ~/.config/hovedbok/config.toml)
	#[arg(long)]
	config: Option<String>,

	/// Dataset to show as a report column, repeatable; "all" shows every one
	#[arg(short, long)]
	show: Vec<String>,

	/// Only report on this project number and its subprojects; "none" for
	/// rows without a project
	#[arg(short, long)]
	project: Option<String>,

	/// Keep rows outside the shown datasets when listing accounts
	#[arg(long)]
	historical: bool,

	/// Print the aggregated totals as JSON instead of a table
	#[arg(long)]
	json: bool,

	/// Condense projects nested below this depth
	#[arg(long)]
	depth: Option<usize>,

	/// Show a row per account under each project
	#[arg(long)]
	accounts: bool,

	/// Print links into the accounting system
	#[arg(long)]
	links: bool,

	/// Log diagnostics about the input data
	#[arg(short, long)]
	verbose: bool,
}

impl Cli {
	const ALL_DATASETS: &'static str = "all";
	const NO_PROJECT: &'static str = "none";

	/// Extra validations on top of what clap does
	fn validate(&self) -> Result<(), Error> {
		self.project_selector()?;

		if self.depth == Some(0) {
			bail!("Depth must be at least 1");
		}

		if self.json && self.command != Directive::Report {
			bail!("--json only applies to the report command");
		}

		Ok(())
	}

	fn project_selector(&self) -> Result<Option<ProjectSelector>, Error> {
		let Some(project) = &self.project else {
			return Ok(None);
		};

		if project.eq_ignore_ascii_case(Cli::NO_PROJECT) {
			return Ok(Some(ProjectSelector::Unassigned));
		}

		match project.parse::<i64>() {
			Ok(number) => Ok(Some(ProjectSelector::Number(number))),
			Err(_) => bail!(
				"Invalid project '{}': expected a project number or '{}'",
				project,
				Cli::NO_PROJECT
			),
		}
	}

	/// Datasets from the command line win over the config; with neither,
	/// every dataset is shown.
	fn selection(&self, config: &Config) -> DatasetSelection {
		let keys: Vec<String> = if self.show.is_empty() {
			config.show().map(|s| s.to_vec()).unwrap_or_default()
		} else {
			self.show.clone()
		};

		if keys.is_empty() || keys.iter().any(|k| k == Cli::ALL_DATASETS) {
			DatasetSelection::All
		} else {
			DatasetSelection::Keys(keys)
		}
	}
}

#[derive(ValueEnum, Clone, PartialEq)]
enum Directive {
	Datasets, // datasets found in the exports
	Tree,     // project hierarchy
	Report,   // result report per department and project
	Accounts, // chart of accounts

	Check, // run everything and verify the totals add up
}

fn main() -> Result<(), Error> {
	let args = Cli::parse();
	args.validate()?;
	init_tracing(args.verbose);

	let fs = Filesystem::new(Path::new(&args.dir));
	let config = fs.get_config(args.config.as_ref())?;
	let inputs = fs.read_inputs()?;

	let options = Options {
		excluded_accounts: config.excluded_accounts(),
		selection: args.selection(&config),
		project: args.project_selector()?,
		historical: args.historical,
		base_url: config.base_url().to_string(),
		context_id: config.context_id(),
	};
	let report = Report::build(&inputs, &options)?;
	debug!(
		"{} datasets, {} shown, {} rows indexed",
		report.datasets.len(),
		report.visible.len(),
		report.ledger.len()
	);

	match args.command {
		Directive::Datasets => {
			let mut reporter =
				DatasetReporter::new(&report.datasets, &report.visible);
			if args.links {
				reporter = reporter.with_links(&report.links);
			}
			reporter.print();
		},
		Directive::Tree => {
			print!("{}", render_tree(&report.tree, args.depth));
		},
		Directive::Report => {
			let reporter = ProjectReporter::new(&report)
				.with_accounts(args.accounts)
				.with_max_depth(args.depth)
				.with_links(args.links);
			if args.json {
				println!("{}", reporter.render_json()?);
			} else {
				print!("{}", reporter.render());
			}
		},
		Directive::Accounts => {
			print!("{}", render_accounts(&report.accounts));
		},
		Directive::Check => {
			report.totals.verify(&report.tree)?;
			// simple log; warnings occur dynamically throughout processing
			println!("Done");
		},
	}

	Ok(())
}
