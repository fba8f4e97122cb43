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
use anyhow::{anyhow, Error};
use dirs::home_dir;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const ACCOUNTS_FILE: &str = "accounts.txt";
pub const DEPARTMENTS_FILE: &str = "departments.txt";
pub const PROJECTS_FILE: &str = "projects.txt";
pub const LEDGER_FILE: &str = "aggregated.txt";
pub const BUDGET_FILE: &str = "budget.txt";
pub const CONTEXT_ID_FILE: &str = "context_id.txt";

/// The raw text of every export the report is built from.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Inputs {
	pub accounts: String,
	pub departments: String,
	pub projects: String,
	pub ledger: String,
	/// Empty when there is no budget
	pub budget: String,
	pub context_id: Option<i64>,
}

/// Reads the exports from one directory.
pub struct Filesystem {
	dir: PathBuf,
}

impl Filesystem {
	pub fn new(dir: &Path) -> Self {
		Self {
			dir: dir.to_path_buf(),
		}
	}

	/// Reads all exports. Only a missing or unreadable required file is an
	/// error; the budget and the context id are optional.
	pub fn read_inputs(&self) -> Result<Inputs, Error> {
		Ok(Inputs {
			accounts: self.read_required(ACCOUNTS_FILE)?,
			departments: self.read_required(DEPARTMENTS_FILE)?,
			projects: self.read_required(PROJECTS_FILE)?,
			ledger: self.read_required(LEDGER_FILE)?,
			budget: self.read_optional(BUDGET_FILE)?.unwrap_or_default(),
			context_id: self.read_context_id()?,
		})
	}

	fn read_required(&self, name: &str) -> Result<String, Error> {
		let path = self.dir.join(name);
		fs::read_to_string(&path)
			.map_err(|e| anyhow!("Unable to read {}: {}", path.display(), e))
	}

	fn read_optional(&self, name: &str) -> Result<Option<String>, Error> {
		let path = self.dir.join(name);
		if !path.exists() {
			debug!("{} not present, skipping", path.display());
			return Ok(None);
		}

		self.read_required(name).map(Some)
	}

	fn read_context_id(&self) -> Result<Option<i64>, Error> {
		let Some(raw) = self.read_optional(CONTEXT_ID_FILE)? else {
			return Ok(None);
		};

		match raw.trim().parse::<i64>() {
			Ok(id) => Ok(Some(id)),
			Err(_) => {
				warn!("ignoring invalid context id: {}", raw.trim());
				Ok(None)
			},
		}
	}

	/// Fetches the config from the given path, or default path if none. A
	/// missing file at the default path means the defaults.
	pub fn get_config(
		&self,
		custom_config_path: Option<&String>,
	) -> Result<Config, Error> {
		let config_path = match &custom_config_path {
			None => home_dir()
				.ok_or_else(|| anyhow!("Unable to determine home directory"))?
				.join(".config/hovedbok/config.toml"),
			Some(p) => PathBuf::from(p),
		};

		if !config_path.exists() && custom_config_path.is_none() {
			debug!("no config at {}, using defaults", config_path.display());
			return Ok(Config::default());
		}

		let content = fs::read_to_string(&config_path).map_err(|e| {
			anyhow!("Unable to read config {}: {}", config_path.display(), e)
		})?;
		let config: Config = toml::from_str(&content)
			.map_err(|e| anyhow!("failed to parse config: {}", e))?;

		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn case(name: &str) -> Filesystem {
		Filesystem::new(
			&Path::new(env!("CARGO_MANIFEST_DIR"))
				.join("tests/test_data")
				.join(name),
		)
	}

	#[test]
	fn test_read_inputs() {
		let inputs = case("sample").read_inputs().unwrap();
		assert!(inputs.accounts.contains("Salgsinntekt"));
		assert!(inputs.ledger.starts_with("Avdelingsnummer"));
		assert!(inputs.budget.is_empty());
		assert_eq!(inputs.context_id, None);
	}

	#[test]
	fn test_optional_files() {
		let inputs = case("departments").read_inputs().unwrap();
		assert!(!inputs.budget.is_empty());
		assert_eq!(inputs.context_id, Some(2845076));
	}

	#[test]
	fn test_missing_required_file() {
		let err = case("does_not_exist").read_inputs().unwrap_err();
		assert!(err.to_string().contains(ACCOUNTS_FILE));
	}

	#[test]
	fn test_custom_config() {
		let fs = case("departments");
		let path = Path::new(env!("CARGO_MANIFEST_DIR"))
			.join("tests/test_data/departments/config.toml")
			.to_string_lossy()
			.to_string();

		let config = fs.get_config(Some(&path)).unwrap();
		assert_eq!(config.base_url(), "https://example.org");

		let missing = "tests/test_data/departments/nope.toml".to_string();
		assert!(fs.get_config(Some(&missing)).is_err());
	}
}
