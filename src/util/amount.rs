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

/// Renders an amount the way the accounting system prints it on its own
/// reports: rounded to whole units, digits grouped by three with a space.
pub fn format_amount(value: f64) -> String {
	let rounded = value.round();
	if rounded == 0.0 || !rounded.is_finite() {
		return "0".to_string();
	}

	let digits = format!("{:.0}", rounded.abs());
	let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
	for (i, c) in digits.chars().enumerate() {
		if i > 0 && (digits.len() - i) % 3 == 0 {
			grouped.push(' ');
		}
		grouped.push(c);
	}

	if rounded < 0.0 {
		format!("-{}", grouped)
	} else {
		grouped
	}
}

/// Like format_amount, but zero renders as an empty cell unless forced.
pub fn format_cell(value: f64, force: bool) -> String {
	if value == 0.0 && !force {
		String::new()
	} else {
		format_amount(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_small_amounts() {
		assert_eq!(format_amount(0.0), "0");
		assert_eq!(format_amount(5.0), "5");
		assert_eq!(format_amount(999.0), "999");
		assert_eq!(format_amount(-42.0), "-42");
	}

	#[test]
	fn test_grouping() {
		assert_eq!(format_amount(1000.0), "1 000");
		assert_eq!(format_amount(123456.0), "123 456");
		assert_eq!(format_amount(-1234567.0), "-1 234 567");
	}

	#[test]
	fn test_rounding() {
		assert_eq!(format_amount(1234.6), "1 235");
		assert_eq!(format_amount(-0.4), "0");
		assert_eq!(format_amount(0.5), "1");
	}

	#[test]
	fn test_cells() {
		assert_eq!(format_cell(0.0, false), "");
		assert_eq!(format_cell(-0.0, false), "");
		assert_eq!(format_cell(0.0, true), "0");
		assert_eq!(format_cell(2500.0, false), "2 500");
	}
}
