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
use std::sync::Once;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Diagnostics about the input data (unknown projects, records without a
/// project number, skipped lines) go to stderr so that stdout carries only
/// the report itself. RUST_LOG overrides the default level.
pub fn init_tracing(verbose: bool) {
	TRACING_INIT.call_once(|| {
		let default_level = if verbose {
			LevelFilter::DEBUG
		} else {
			LevelFilter::WARN
		};

		let filter = EnvFilter::builder()
			.with_default_directive(default_level.into())
			.from_env_lossy();

		fmt()
			.with_env_filter(filter)
			.with_writer(std::io::stderr)
			.with_target(false)
			.init();
	});
}
