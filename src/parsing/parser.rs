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
use crate::gl::account::{Account, Accounts};
use crate::gl::department::Department;
use crate::gl::entry::{Column, LedgerEntry, Source};
use crate::gl::project::ProjectRecord;
use crate::util::number::{int_prefix, lenient_int};
use regex::Regex;
use tracing::debug;

const DELIMITER: char = ';';

/// Reads the semicolon separated exports into typed records. Lines that do
/// not have the expected shape are skipped; none of these methods fail.
pub struct Parser {
	project_regex: Regex,
}

impl Parser {
	pub fn new() -> Self {
		Self {
			project_regex: Regex::new(r"^(\S+);(\S*);(\S+);(\S.+)$").unwrap(),
		}
	}

	/// `number;name;type;active`, where active is `1` or anything else.
	pub fn accounts(&self, text: &str) -> Accounts {
		let mut accounts = Accounts::new();

		for (i, line) in lines(text) {
			let fields: Vec<&str> = line.split(DELIMITER).collect();
			if fields.len() < 4 {
				debug!("skipping malformed account (line {}): {}", i + 1, line);
				continue;
			}

			let account = Account {
				number: lenient_int(fields[0]),
				name: fields[1].to_string(),
				account_type: fields[2].to_string(),
				active: fields[3].trim() == "1",
			};
			accounts.insert(account.number, account);
		}

		accounts
	}

	/// `id;number;name`. The name may itself contain the delimiter.
	pub fn departments(&self, text: &str) -> Vec<Department> {
		let mut departments = vec![];

		for (i, line) in lines(text) {
			let fields: Vec<&str> = line.splitn(3, DELIMITER).collect();
			if fields.len() < 3 {
				debug!("skipping malformed department (line {}): {}", i + 1, line);
				continue;
			}

			departments.push(Department {
				id: lenient_int(fields[0]),
				number: lenient_int(fields[1]),
				name: fields[2].to_string(),
			});
		}

		departments
	}

	/// `systemId;parentProjectNumber;projectNumber;title`, the parent being
	/// empty for top level projects.
	pub fn projects(&self, text: &str) -> Vec<ProjectRecord> {
		let mut records = vec![];

		for (i, line) in lines(text) {
			let Some(caps) = self.project_regex.captures(line) else {
				debug!("skipping malformed project (line {}): {}", i + 1, line);
				continue;
			};

			let id = match int_prefix(&caps[1]) {
				Some(id) if id != 0 => id,
				_ => {
					debug!("skipping project without id (line {}): {}", i + 1, line);
					continue;
				},
			};

			records.push(ProjectRecord {
				id,
				parent: lenient_int(&caps[2]),
				number: int_prefix(&caps[3]).filter(|n| *n != 0),
				title: caps[4].to_string(),
			});
		}

		records
	}

	/// A header line naming the columns, then one row per line. Missing
	/// trailing fields keep their defaults and fields beyond the header are
	/// dropped.
	pub fn ledger(&self, text: &str, source: Source) -> Vec<LedgerEntry> {
		let mut rows = lines(text);
		let headers: Vec<(String, Option<Column>)> = match rows.next() {
			Some((_, header)) => header
				.trim_start_matches('\u{feff}')
				.split(DELIMITER)
				.map(|h| (h.trim().to_string(), Column::from_header(h)))
				.collect(),
			None => return vec![],
		};

		let mut entries = vec![];
		for (i, line) in rows {
			let mut entry = LedgerEntry::new(source);

			for (index, raw) in line.split(DELIMITER).enumerate() {
				match headers.get(index) {
					Some((_, Some(column))) => entry.set(*column, raw),
					Some((name, None)) => {
						entry.extra.insert(name.clone(), raw.to_string());
					},
					None => {
						debug!(
							"ignoring field {} beyond the header (line {})",
							index + 1,
							i + 1
						);
					},
				}
			}

			entries.push(entry);
		}

		entries
	}
}

/// Non-blank lines, trimmed, with their zero-based line index.
fn lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
	text.lines()
		.map(str::trim)
		.enumerate()
		.filter(|(_, line)| !line.is_empty())
}
