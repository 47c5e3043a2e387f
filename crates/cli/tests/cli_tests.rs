// End-to-end tests for the `rollbook` binary.
//
// Each test writes its inputs to a temp dir, runs the binary, and checks
// exit code, stdout, and any files written.
//
// Run with: cargo test -p rollbook-cli --test cli_tests

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn rollbook() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rollbook"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("ROLLBOOK_RULES");
    cmd.env_remove("ROLLBOOK_CORRECTIONS");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run(args: &[&str]) -> Output {
    rollbook().args(args).output().expect("run rollbook")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_exit(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "stdout:\n{}\nstderr:\n{}",
        stdout(output),
        stderr(output)
    );
}

fn recon_fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../recon/tests/fixtures")
        .join(name)
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn s(path: &Path) -> &str {
    path.to_str().unwrap()
}

const MASTERLIST_CSV: &str = "\
Masterlist updated 2025-08-11,,,,,,
No,ID,Official Name,Korean Name,English Name,Grade,Gender
1,1085,\"Park, Gahyun\",박가현,Katie,11,F
2,1111,\"Kyung, Seryn\",경세린,Seryn,6,F
3,NEW,\"Lee, Minji\",이민지,,8,F
4,2001,\"Cho, Hana\",조하나,Hannah,4,F
5,1050,\"An, Sua\",안수아,Sua,7,F
6,1208,\"Dantis, Ayra Mari\",,,9,F
,1299,\"Kim, Minho WITHDRAWN\",김민호,,8,M
8,1300,\"Yoon, Jiho\",윤지호,,8,M
";

const CORRECTIONS: &str = r#"
[[safe_updates]]
id = "82f42c8d-4dd5-4ccf-aaca-5e9ac1668167"
full_name = "Seryn Kyung"
english_name = "Seryn"

[id_map]
"eb8c255b-c7a9-4145-b0b8-2777fa1de738" = "1085"
"82f42c8d-4dd5-4ccf-aaca-5e9ac1668167" = "1111"
"00000000-0000-0000-0000-000000000000" = "9999"

[student_emails]
"Seryn Kyung" = "seryn.kyung@example.edu"
"Ayra Mari Dantis" = ""
"Gahyun Park" = "gahyun.park@example.edu"

[[teachers]]
name = "Stephen Ward"
email = "stephenw@example.edu"

[principal]
full_name = "Head O'Principal"
english_name = "Head"
email = "principal@example.edu"
grade = "12"
"#;

// ===========================================================================
// rollbook masterlist
// ===========================================================================

#[test]
fn masterlist_writes_secondary_students() {
    let dir = TempDir::new().unwrap();
    let csv = write(&dir, "masterlist.csv", MASTERLIST_CSV);
    let out = dir.path().join("masterlist.json");

    let output = run(&["masterlist", s(&csv), "-o", s(&out)]);
    assert_exit(&output, 0);
    assert!(stdout(&output).is_empty(), "masterlist writes nothing to stdout");

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let entries = json.as_array().expect("array of entries");

    // NEW id and grade 4 are skipped, the WITHDRAWN marker ends the list.
    let ids: Vec<&str> = entries.iter().map(|e| e["student_id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["1085", "1111", "1050", "1208"]);

    assert_eq!(entries[0]["full_name"], "Gahyun Park");
    assert_eq!(entries[0]["official_name"], "Park, Gahyun");
    assert_eq!(entries[0]["korean_name"], "박가현");
    assert_eq!(entries[0]["english_name"], "Katie");
    assert_eq!(entries[3]["full_name"], "Ayra Mari Dantis");
}

#[test]
fn masterlist_missing_file_exits_read() {
    let output = run(&["masterlist", "/nonexistent/masterlist.csv", "-o", "/tmp/never.json"]);
    assert_exit(&output, 3);
    assert!(stderr(&output).contains("error:"));
}

#[test]
fn masterlist_without_header_exits_parse() {
    let dir = TempDir::new().unwrap();
    let csv = write(&dir, "banner_only.csv", "Masterlist updated 2025-08-11");
    let out = dir.path().join("masterlist.json");

    let output = run(&["masterlist", s(&csv), "-o", s(&out)]);
    assert_exit(&output, 5);
    assert!(stderr(&output).contains("hint:"));
    assert!(!out.exists());
}

// ===========================================================================
// rollbook compare
// ===========================================================================

#[test]
fn compare_json_is_single_document() {
    let output = run(&[
        "compare",
        s(&recon_fixture("masterlist.json")),
        s(&recon_fixture("db.json")),
        "--json",
    ]);
    assert_exit(&output, 0);

    let value: serde_json::Value = serde_json::from_str(stdout(&output).trim())
        .unwrap_or_else(|e| panic!("stdout must be JSON: {e}\n{}", stdout(&output)));
    let summary = &value["summary"];
    assert_eq!(summary["source_records"], 9);
    assert_eq!(summary["target_records"], 9);
    assert_eq!(summary["matches"], 5);
    assert_eq!(summary["reordered_matches"], 2);
    assert_eq!(summary["name_mismatches"], 3);
    assert_eq!(summary["not_in_target"], 1);
    assert_eq!(summary["orphans"], 1);
    assert_eq!(value["meta"]["duplicate_policy"], "last_wins");
    assert_eq!(value["not_in_target"][0]["full_name"], "Sua An");
}

#[test]
fn compare_human_report_goes_to_stderr() {
    let output = run(&[
        "compare",
        s(&recon_fixture("masterlist.json")),
        s(&recon_fixture("db.json")),
    ]);
    assert_exit(&output, 0);
    assert!(stdout(&output).is_empty());

    let err = stderr(&output);
    assert!(err.contains("REORDERED NAMES"));
    assert!(err.contains("Park Gahyun [eb8c255b-c7a9-4145-b0b8-2777fa1de738] grade 11"));
    assert!(err.contains("NAME MISMATCHES"));
    assert!(err.contains("NOT IN DATABASE"));
    assert!(err.contains("Grade 7: 1 students"));
    assert!(err.contains("ONLY IN DATABASE"));
    assert!(err.contains("Song Sam Dong (Dennis)"));
}

#[test]
fn compare_strict_needs_review() {
    let output = run(&[
        "compare",
        s(&recon_fixture("masterlist.json")),
        s(&recon_fixture("db.json")),
        "--strict",
    ]);
    assert_exit(&output, 7);
    assert!(stderr(&output).contains("needs review"));
}

#[test]
fn compare_strict_clean_run_succeeds() {
    let db = recon_fixture("db.json");
    let output = run(&["compare", s(&db), s(&db), "--strict"]);
    assert_exit(&output, 0);
}

#[test]
fn compare_rules_set_duplicate_policy() {
    let dir = TempDir::new().unwrap();
    let rules = write(&dir, "rules.toml", "[matching]\nduplicate_policy = \"first_wins\"\n");

    let output = run(&[
        "compare",
        s(&recon_fixture("masterlist.json")),
        s(&recon_fixture("db.json")),
        "--rules",
        s(&rules),
        "--json",
    ]);
    assert_exit(&output, 0);
    let value: serde_json::Value = serde_json::from_str(stdout(&output).trim()).unwrap();
    assert_eq!(value["meta"]["duplicate_policy"], "first_wins");
}

#[test]
fn compare_invalid_rules_exit_config() {
    let dir = TempDir::new().unwrap();
    let rules = write(&dir, "rules.toml", "[roster]\nmin_len = 60\nmax_len = 50\n");

    let output = run(&[
        "compare",
        s(&recon_fixture("masterlist.json")),
        s(&recon_fixture("db.json")),
        "--rules",
        s(&rules),
    ]);
    assert_exit(&output, 6);
    assert!(stderr(&output).contains("min_len"));
}

#[test]
fn compare_malformed_json_exits_parse() {
    let dir = TempDir::new().unwrap();
    let bad = write(&dir, "db.json", "[{\"id\": ");

    let output = run(&["compare", s(&recon_fixture("masterlist.json")), s(&bad)]);
    assert_exit(&output, 5);
}

// ===========================================================================
// rollbook roster
// ===========================================================================

fn attendance(rows: &[&str]) -> String {
    let mut html = String::from("<html><body><table>\n<tr><td>Student Name</td><td>Notes</td></tr>\n");
    for row in rows {
        html.push_str(&format!("<tr><td>{row}</td><td>present</td></tr>\n"));
    }
    html.push_str("</table></body></html>\n");
    html
}

fn roster_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "Chess Club.html",
        &attendance(&["Taegeon(Eden) 9th", "Ayra Mari Dantis 9th", "Woojin Ko"]),
    );
    write(
        &dir,
        "Yearbook.html",
        &attendance(&["Ayra Mari Dantis", "Manuel B. Nablo Jr. (Junno)", "Coach"]),
    );
    write(&dir, "notes.txt", "not an export");
    dir
}

#[test]
fn roster_markdown_to_stdout() {
    let dir = roster_dir();
    let output = run(&["roster", s(dir.path())]);
    assert_exit(&output, 0);

    let md = stdout(&output);
    assert!(md.starts_with("# All Students Roster"));
    assert!(md.contains("| Ayra Mari Dantis |  | Grade 9 | Chess Club, Yearbook |"));
    assert!(md.contains("| Taegeon | Eden | Grade 9 | Chess Club |"));
    assert!(md.contains("- **Total unique students:** 4"));
    assert!(!md.contains("Coach"));
    assert!(stderr(&output).contains("2 documents"));
}

#[test]
fn roster_json_only_keeps_stdout_empty() {
    let dir = roster_dir();
    let json_path = dir.path().join("roster.json");

    let output = run(&["roster", s(dir.path()), "--json", s(&json_path)]);
    assert_exit(&output, 0);
    assert!(stdout(&output).is_empty());

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value["total_students"], 4);
    assert_eq!(value["students"].as_array().unwrap().len(), 4);
}

#[test]
fn roster_missing_dir_exits_read() {
    let output = run(&["roster", "/nonexistent/exports"]);
    assert_exit(&output, 3);
}

// ===========================================================================
// rollbook sql
// ===========================================================================

#[test]
fn sql_updates_from_comparison() {
    let dir = TempDir::new().unwrap();
    let comparison = dir.path().join("comparison.json");
    let corrections = write(&dir, "corrections.toml", CORRECTIONS);

    let output = run(&[
        "compare",
        s(&recon_fixture("masterlist.json")),
        s(&recon_fixture("db.json")),
        "-o",
        s(&comparison),
    ]);
    assert_exit(&output, 0);

    let output = run(&["sql", "updates", s(&comparison), "--corrections", s(&corrections)]);
    assert_exit(&output, 0);
    let sql = stdout(&output);

    assert!(sql.contains(
        "UPDATE students SET full_name = 'Seryn Kyung', english_name = 'Seryn' \
         WHERE id = '82f42c8d-4dd5-4ccf-aaca-5e9ac1668167';"
    ));
    assert!(sql.contains("-- Add missing students from masterlist"));
    assert!(sql.contains("-- Grade 7"));
    assert!(sql.contains("'Sua An'"));
    assert!(sql.contains("-- KEEP: Song Sam Dong (Dennis) - Grade"));
    assert!(stderr(&output).contains("1 updates, 1 inserts, 1 kept"));
}

#[test]
fn sql_final_to_file() {
    let dir = TempDir::new().unwrap();
    let csv = write(&dir, "masterlist.csv", MASTERLIST_CSV);
    let corrections = write(&dir, "corrections.toml", CORRECTIONS);
    let out = dir.path().join("sql/final_update_students.sql");

    let output = run(&[
        "sql",
        "final",
        s(&csv),
        "--corrections",
        s(&corrections),
        "-o",
        s(&out),
    ]);
    assert_exit(&output, 0);
    assert!(stdout(&output).is_empty());

    let sql = std::fs::read_to_string(&out).unwrap();
    assert!(sql.contains(
        "UPDATE students SET full_name = 'Gahyun Park', english_name = 'Katie', grade = '11' \
         WHERE id = 'eb8c255b-c7a9-4145-b0b8-2777fa1de738';"
    ));
    // Mapped ids are not inserted again; the unknown mapping is skipped.
    assert!(!sql.contains("INSERT INTO students (full_name, english_name, grade) VALUES ('Gahyun Park'"));
    assert!(sql.contains("'Sua An'"));
    assert!(sql.contains("'Ayra Mari Dantis'"));
    assert!(stderr(&output).contains("2 updates, 2 inserts, 0 kept, 1 skipped"));
}

#[test]
fn sql_emails_with_distribution_list() {
    let dir = TempDir::new().unwrap();
    let corrections = write(&dir, "corrections.toml", CORRECTIONS);
    let list = write(
        &dir,
        "list.txt",
        "Seryn Kyung <SERYN.KYUNG@example.edu>, stephenw@example.edu;\n",
    );

    let output = rollbook()
        .args(["sql", "emails", "--corrections", s(&corrections), "--email-list", s(&list)])
        .env("RUST_LOG", "warn")
        .output()
        .unwrap();
    assert_exit(&output, 0);

    let sql = stdout(&output);
    let seryn = sql.find("'seryn.kyung@example.edu'").unwrap();
    let gahyun = sql.find("'gahyun.park@example.edu'").unwrap();
    assert!(seryn < gahyun, "emails keep file order");
    assert!(!sql.contains("Ayra Mari Dantis"));
    assert!(sql.contains("INSERT INTO teachers (name, email) VALUES ('Stephen Ward', 'stephenw@example.edu');"));
    assert!(sql.contains("'Head O''Principal'"));

    let err = stderr(&output);
    assert!(err.contains("gahyun.park@example.edu is not in the email list"));
    assert!(!err.contains("seryn.kyung@example.edu is not"));
}

#[test]
fn sql_corrections_from_env() {
    let dir = TempDir::new().unwrap();
    let corrections = write(&dir, "corrections.toml", CORRECTIONS);

    let output = rollbook()
        .args(["sql", "emails"])
        .env("ROLLBOOK_CORRECTIONS", &corrections)
        .output()
        .unwrap();
    assert_exit(&output, 0);
    assert!(stdout(&output).contains("-- Add principal account"));
}

#[test]
fn sql_bad_corrections_exit_config() {
    let dir = TempDir::new().unwrap();
    let corrections = write(
        &dir,
        "corrections.toml",
        "[[safe_updates]]\nid = \"a\"\nfull_name = \"X\"\nenglish_name = \"\"\n\
         [[safe_updates]]\nid = \"a\"\nfull_name = \"Y\"\nenglish_name = \"\"\n",
    );

    let output = run(&["sql", "emails", "--corrections", s(&corrections)]);
    assert_exit(&output, 6);
}

// ===========================================================================
// rollbook check
// ===========================================================================

#[test]
fn check_reports_valid_files() {
    let dir = TempDir::new().unwrap();
    let rules = write(&dir, "rules.toml", "");
    let corrections = write(&dir, "corrections.toml", CORRECTIONS);

    let output = run(&["check", "--rules", s(&rules), "--corrections", s(&corrections)]);
    assert_exit(&output, 0);
    let err = stderr(&output);
    assert!(err.contains("valid: rules"));
    assert!(err.contains("duplicate_policy = last_wins"));
    assert!(err.contains("1 safe updates, 3 id mappings, 3 student emails, 1 teachers, principal: yes"));
}

#[test]
fn check_without_files_is_usage_error() {
    let output = run(&["check"]);
    assert_exit(&output, 2);
}

#[test]
fn version_flag() {
    let output = run(&["--version"]);
    assert_exit(&output, 0);
    assert!(stdout(&output).starts_with("rollbook "));
}
