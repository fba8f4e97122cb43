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
use std::fs;
use std::process::{Command, Output};

/// Each case is a directory of exports, plus the expected output of the
/// commands run against it.
fn case_dir(case: &str) -> String {
	format!("{}/{}", "tests/test_data", case)
}

/// Cases that carry their own config are run with it, so a config in the
/// home directory cannot change the outcome.
fn run(case: &str, cmd: &str, args: Vec<&str>) -> Output {
	let dir = case_dir(case);
	let config = format!("{}/config.toml", dir);

	let mut all_args = vec!["run", "--", "-d", dir.as_str(), cmd];
	if fs::metadata(&config).is_ok() {
		all_args.extend(["--config", config.as_str()]);
	}
	all_args.extend(args);

	Command::new("cargo")
		.args(all_args)
		.output()
		.expect("Failed to execute process")
}

fn execute(case: &str, cmd: &str, args: Vec<&str>, expected_output_file: &str) {
	println!("running {} for {}...", cmd, case);

	let output = run(case, cmd, args);

	assert!(
		output.status.success(),
		"{} failed processing: {}",
		case,
		String::from_utf8_lossy(&output.stderr)
	);

	let stdout = String::from_utf8_lossy(&output.stdout);

	let expected_output = fs::read_to_string(format!(
		"{}/{}",
		case_dir(case),
		expected_output_file
	))
	.expect("Failed to read expected output file");

	assert_eq!(
		stdout.trim(),
		expected_output.trim(),
		"Output did not match for {}; expected:\n{}\ngot:\n{}",
		case,
		expected_output.trim(),
		stdout.trim()
	);
}

#[test]
fn test_integration_tree() {
	execute("sample", "tree", vec![], "tree_out.txt");
}

#[test]
fn test_integration_tree_depth() {
	execute("sample", "tree", vec!["--depth", "1"], "tree_depth_out.txt");
}

#[test]
fn test_integration_accounts() {
	execute("sample", "accounts", vec![], "accounts_out.txt");
}

#[test]
fn test_integration_datasets() {
	execute("sample", "datasets", vec!["-s", "all"], "datasets_out.txt");
}

#[test]
fn test_integration_datasets_with_budget_and_links() {
	execute("departments", "datasets", vec!["--links"], "datasets_out.txt");
}

#[test]
fn test_integration_report_with_accounts() {
	execute(
		"sample",
		"report",
		vec!["-s", "202399:R:1", "--accounts"],
		"report_out.txt",
	);
}

#[test]
fn test_integration_report_by_project() {
	execute(
		"sample",
		"report",
		vec!["-s", "202399:R:1", "-p", "100"],
		"report_project_out.txt",
	);
}

#[test]
fn test_integration_report_by_department() {
	execute("departments", "report", vec![], "report_out.txt");
}

#[test]
fn test_integration_check() {
	execute("sample", "check", vec![], "check_out.txt");
	execute("departments", "check", vec![], "check_out.txt");
}

#[test]
fn test_integration_json() {
	let output = run("departments", "report", vec!["--json"]);
	assert!(
		output.status.success(),
		"json report failed: {}",
		String::from_utf8_lossy(&output.stderr)
	);

	let value: serde_json::Value =
		serde_json::from_slice(&output.stdout).expect("Output is not JSON");

	// project 0 is the root, 11 is Festival
	assert_eq!(value["all"]["0"]["202400:R:1"]["total"]["count"], 4);
	assert_eq!(value["all"]["0"]["202400:B:1"]["total"]["out"], 2500.0);
	assert_eq!(value["all"]["11"]["202400:R:1"]["self"]["in"], -5000.0);
	assert_eq!(value["departments"]["2"]["0"]["202400:R:1"]["self"]["out"], 700.0);
	assert_eq!(value["departments"]["0"]["11"]["202400:R:1"]["self"]["count"], 0);
}

#[test]
fn test_integration_should_fail() {
	let failures: Vec<(&str, &str, Vec<&str>)> = vec![
		("does_not_exist", "report", vec![]),
		("sample", "report", vec!["-p", "abc"]),
		("sample", "report", vec!["-p", "12345"]),
		("sample", "tree", vec!["--json"]),
	];

	for (case, cmd, args) in failures {
		let output = run(case, cmd, args.clone());
		assert!(
			!output.status.success(),
			"{} {} {:?} unexpectedly succeeded!",
			case,
			cmd,
			args
		);
	}
}
