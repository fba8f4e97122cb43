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
use regex::Regex;
use std::sync::LazyLock;

// Exports from spreadsheets and the accounting system are not always clean,
// so numbers are read from the longest numeric prefix of a field, and
// anything without one is zero.
static INT_PREFIX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[+-]?\d+").unwrap());
static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?").unwrap()
});

/// The integer a field starts with, if any.
pub fn int_prefix(raw: &str) -> Option<i64> {
	INT_PREFIX
		.find(raw.trim())
		.and_then(|m| m.as_str().parse::<i64>().ok())
}

pub fn lenient_int(raw: &str) -> i64 {
	int_prefix(raw).unwrap_or(0)
}

/// A decimal comma is read as a decimal point.
pub fn lenient_float(raw: &str) -> f64 {
	let normalized = raw.trim().replace(',', ".");
	FLOAT_PREFIX
		.find(&normalized)
		.and_then(|m| m.as_str().parse::<f64>().ok())
		.filter(|f| f.is_finite())
		.unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_ints() {
		assert_eq!(lenient_int("42"), 42);
		assert_eq!(lenient_int(" -7 "), -7);
		assert_eq!(lenient_int("12abc"), 12);
		assert_eq!(lenient_int("abc"), 0);
		assert_eq!(lenient_int(""), 0);
		assert_eq!(lenient_int("99999999999999999999"), 0);
		assert_eq!(int_prefix("x1"), None);
		assert_eq!(int_prefix("0"), Some(0));
	}

	#[test]
	fn test_floats() {
		assert_eq!(lenient_float("100"), 100.0);
		assert_eq!(lenient_float("-150.25"), -150.25);
		assert_eq!(lenient_float("1,5"), 1.5);
		assert_eq!(lenient_float(".5"), 0.5);
		assert_eq!(lenient_float("3e2"), 300.0);
		assert_eq!(lenient_float("12.5kr"), 12.5);
		assert_eq!(lenient_float("NaN"), 0.0);
		assert_eq!(lenient_float(""), 0.0);
	}
}
