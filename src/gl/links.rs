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
use crate::util::date::Period;

pub const DEFAULT_BASE_URL: &str = "https://tripletex.no";

/// Builds links into the accounting system the figures were exported from.
/// Pure string building; nothing here talks to the network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkBuilder {
	base_url: String,
	context_id: i64,
}

impl LinkBuilder {
	pub fn new(base_url: &str, context_id: i64) -> Self {
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
			context_id,
		}
	}

	/// The result report for a period, optionally narrowed to a department
	/// and project. The system takes -1 to mean "any".
	pub fn result_report(
		&self,
		period: &Period,
		department_id: Option<i64>,
		project_id: Option<i64>,
		include_subprojects: bool,
	) -> String {
		format!(
			"{}/execute/resultReport2?javaClass=no.tripletex.tcp.web.ResultReport2Form\
			&documentationComponent=133&isExpandedFilter=true\
			&period.startDate={}&period.endOfPeriodDate={}\
			&selectedDepartmentId={}&selectedProjectId={}\
			&viewAccountingPeriods=true&contextId={}\
			&includeSubProjectsOfSelectedProject={}",
			self.base_url,
			period.from,
			period.to,
			department_id.unwrap_or(-1),
			project_id.unwrap_or(-1),
			self.context_id,
			include_subprojects
		)
	}

	/// The postings on one account for a period, department and project.
	pub fn ledger(
		&self,
		period: &Period,
		department_id: i64,
		project_id: i64,
		account_number: i64,
	) -> String {
		format!(
			"{}/execute/ledger?javaClass=no.tripletex.tcp.web.LedgerForm\
			&documentationComponent=140&contextId={}\
			&isExpandedFilter=false&onlyOpenPostings=false\
			&period.startDate={}&period.endOfPeriodDate={}\
			&period.periodType=0&openPostingsDateBefore=&accountId=-1\
			&startNumber={}&endNumber={}\
			&selectedCustomerId=-1&selectedVendorId=-1&selectedEmployeeId=-1\
			&selectedDepartmentId={}&selectedProjectId={}\
			&includeSubProjectsOfSelectedProject=false\
			&selectedProductId=-1&selectedVatId=-1\
			&minAmountString=&maxAmountString=&amountType=2&orderBy=0\
			&postingCount=500&viewCustomer=true&viewVendor=true\
			&viewEmployee=false&viewDepartment=false&viewProject=false\
			&viewProduct=false",
			self.base_url,
			self.context_id,
			period.from,
			period.to,
			account_number,
			account_number,
			department_id,
			project_id
		)
	}
}
