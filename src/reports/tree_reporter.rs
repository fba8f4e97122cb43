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
use crate::gl::account::Accounts;
use crate::gl::project::ProjectTree;

const LEVEL_PREFIX: &str = ".. ";

/// Prints every project below the root, one per line, each level of
/// nesting marked with a `.. ` prefix. Project numbers are what -p takes.
pub fn render_tree(tree: &ProjectTree, max_depth: Option<usize>) -> String {
	let mut out = String::new();

	for (depth, project) in tree.walk() {
		if project.is_root() || max_depth.is_some_and(|max| depth > max) {
			continue;
		}

		out.push_str(&LEVEL_PREFIX.repeat(depth - 1));
		out.push_str(&format!("{} ({})\n", project.title, project.number));
	}

	out
}

/// The chart of accounts in a form that pastes into a spreadsheet.
pub fn render_accounts(accounts: &Accounts) -> String {
	accounts.values().map(|a| format!("{}\n", a)).collect()
}
