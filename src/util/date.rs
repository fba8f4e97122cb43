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

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub struct Date {
	year: i64,
	month: u8,
	day: u8,
}

/// An inclusive range of calendar dates, as the accounting system expects
/// it in report and ledger queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Period {
	pub from: Date,
	pub to: Date,
}

impl Date {
	/// Callers are trusted to pass a real calendar date; the only dates
	/// built in this crate are half-year and year boundaries.
	pub fn new(year: i64, month: u8, day: u8) -> Self {
		Self { year, month, day }
	}
}

impl Period {
	pub fn first_half(year: i64) -> Self {
		Self {
			from: Date::new(year, 1, 1),
			to: Date::new(year, 6, 30),
		}
	}

	pub fn second_half(year: i64) -> Self {
		Self {
			from: Date::new(year, 7, 1),
			to: Date::new(year, 12, 31),
		}
	}

	pub fn whole_year(year: i64) -> Self {
		Self {
			from: Date::new(year, 1, 1),
			to: Date::new(year, 12, 31),
		}
	}
}

impl PartialOrd for Date {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Date {
	fn cmp(&self, other: &Self) -> Ordering {
		(self.year, self.month, self.day).cmp(&(
			other.year,
			other.month,
			other.day,
		))
	}
}

impl fmt::Display for Date {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
	}
}

impl Serialize for Date {
	fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
		s.collect_str(self)
	}
}
