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
use crate::gl::dataset::DEFAULT_EXCLUDED_ACCOUNTS;
use crate::gl::links::DEFAULT_BASE_URL;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
	pub report: Option<ReportConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportConfig {
	/// Address of the accounting system, for links
	pub base_url: Option<String>,

	/// Used when the input directory has no context_id.txt
	pub context_id: Option<i64>,

	pub excluded_accounts: Option<Vec<i64>>,

	/// Dataset keys to show when none are given on the command line
	pub show: Option<Vec<String>>,
}

impl Config {
	pub fn base_url(&self) -> &str {
		self.report
			.as_ref()
			.and_then(|r| r.base_url.as_deref())
			.unwrap_or(DEFAULT_BASE_URL)
	}

	pub fn context_id(&self) -> Option<i64> {
		self.report.as_ref().and_then(|r| r.context_id)
	}

	pub fn excluded_accounts(&self) -> Vec<i64> {
		self.report
			.as_ref()
			.and_then(|r| r.excluded_accounts.clone())
			.unwrap_or_else(|| DEFAULT_EXCLUDED_ACCOUNTS.to_vec())
	}

	pub fn show(&self) -> Option<&[String]> {
		self.report.as_ref().and_then(|r| r.show.as_deref())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config: Config = toml::from_str("").unwrap();
		assert_eq!(config.base_url(), DEFAULT_BASE_URL);
		assert_eq!(config.context_id(), None);
		assert_eq!(config.excluded_accounts(), vec![8960, 9999]);
		assert!(config.show().is_none());
	}

	#[test]
	fn test_report_section() {
		let config: Config = toml::from_str(
			r#"
			[report]
			base_url = "https://example.org"
			context_id = 123
			excluded_accounts = [1500]
			show = ["202301:R:1"]
			"#,
		)
		.unwrap();

		assert_eq!(config.base_url(), "https://example.org");
		assert_eq!(config.context_id(), Some(123));
		assert_eq!(config.excluded_accounts(), vec![1500]);
		assert_eq!(config.show(), Some(&["202301:R:1".to_string()][..]));
	}
}
