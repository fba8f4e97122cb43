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
use std::fmt;

/// An account in the chart of accounts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
	pub number: i64,
	pub name: String,
	pub account_type: String,
	pub active: bool,
}

/// account number -> account
pub type Accounts = BTreeMap<i64, Account>;

impl Account {
	/// Label used next to per-account rows on reports.
	pub fn label(accounts: &Accounts, number: i64) -> String {
		match accounts.get(&number) {
			Some(account) => format!("{} {}", account.number, account.name),
			None => "No account selected".to_string(),
		}
	}
}

/// Tab separated, so the list can be pasted straight into a spreadsheet
/// alongside the chart of accounts.
impl fmt::Display for Account {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}\t{}\t{}\t{}",
			self.number,
			self.name,
			self.account_type,
			if self.active { "1" } else { "0" }
		)
	}
}
