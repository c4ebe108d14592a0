//! End-to-end tests: session files on disk through to the annual summary.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use neovate_wrapped::{collect, summarize, OfflineNames};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn at(y: i32, m: u32, d: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn message(role: &str, when: DateTime<Local>, extra: &str) -> String {
    format!(
        r#"{{"type":"message","role":"{role}","timestamp":"{}"{extra}}}"#,
        when.to_rfc3339()
    )
}

fn write_session(root: &Path, project: &str, session: &str, lines: &[String]) {
    let dir = root.join(project);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{session}.jsonl")), lines.join("\n")).unwrap();
}

#[test]
fn test_partial_corruption_keeps_the_rest() {
    let root = TempDir::new().unwrap();
    let usage = r#","model":"anthropic/claude-3","usage":{"input_tokens":100,"output_tokens":50}"#;
    write_session(
        root.path(),
        "project-a",
        "session-1",
        &[
            message("user", at(2025, 4, 2), r#","content":"refactor this""#),
            message("assistant", at(2025, 4, 2), usage),
            r#"{"type":"message","role":"assis"#.to_string(),
            message("assistant", at(2025, 4, 2), usage),
        ],
    );
    // A directory where a session file is expected cannot be read as text
    fs::create_dir_all(root.path().join("project-b").join("session-2.jsonl")).unwrap();

    let corpus = collect(root.path()).unwrap();
    let summary = summarize(&corpus, 2025, &OfflineNames, at(2025, 4, 2));

    assert_eq!(summary.total_sessions, 1);
    assert_eq!(summary.total_messages, 3);
    assert_eq!(summary.total_projects, 2);
    assert_eq!(summary.total_input_tokens, 200);
    assert_eq!(summary.total_output_tokens, 100);
    assert_eq!(summary.total_tokens, 300);

    assert_eq!(summary.top_models.len(), 1);
    let model = &summary.top_models[0];
    assert_eq!(model.id, "claude-3");
    assert_eq!(model.provider_id, "anthropic");
    assert_eq!(model.count, 2);
    assert_eq!(summary.top_providers[0].id, "anthropic");
}

#[test]
fn test_streaks_from_disk() {
    let root = TempDir::new().unwrap();
    let days = [1, 2, 3, 10, 11, 12];
    let lines: Vec<String> = days
        .iter()
        .map(|&d| message("user", at(2025, 1, d), ""))
        .collect();
    write_session(root.path(), "project", "session", &lines);

    let corpus = collect(root.path()).unwrap();
    let summary = summarize(&corpus, 2025, &OfflineNames, at(2025, 1, 13));

    assert_eq!(summary.max_streak, 3);
    assert_eq!(
        summary.max_streak_days,
        vec![
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
        ]
    );
    // Nothing on the 13th yet, so the run ending yesterday still counts
    assert_eq!(summary.current_streak, 3);

    let later = summarize(&corpus, 2025, &OfflineNames, at(2025, 1, 20));
    assert_eq!(later.current_streak, 0);
}

#[test]
fn test_other_years_are_excluded_from_totals() {
    let root = TempDir::new().unwrap();
    write_session(
        root.path(),
        "project",
        "old",
        &[message("user", at(2024, 12, 31), "")],
    );
    write_session(
        root.path(),
        "project",
        "new",
        &[
            message("user", at(2025, 1, 1), ""),
            message(
                "assistant",
                at(2025, 1, 1),
                r#","content":[{"type":"tool_use","name":"bash"}]"#,
            ),
        ],
    );

    let corpus = collect(root.path()).unwrap();
    let summary = summarize(&corpus, 2025, &OfflineNames, at(2025, 6, 1));

    assert_eq!(summary.total_sessions, 1);
    assert_eq!(summary.total_messages, 2);
    assert_eq!(summary.total_tool_calls, 1);
    assert_eq!(summary.top_tools[0].name, "bash");
    assert_eq!(summary.first_session_date, Some(at(2024, 12, 31)));
    // Daily activity spans the whole corpus
    assert_eq!(summary.daily_activity.len(), 2);
}

#[test]
fn test_missing_root_is_an_error() {
    let root = TempDir::new().unwrap();
    assert!(collect(&root.path().join("does-not-exist")).is_err());
}

#[test]
fn test_summary_json_shape() {
    let root = TempDir::new().unwrap();
    write_session(
        root.path(),
        "project",
        "s",
        &[message("user", at(2025, 3, 7), "")],
    );
    let corpus = collect(root.path()).unwrap();
    let summary = summarize(&corpus, 2025, &OfflineNames, at(2025, 3, 7));

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["year"], 2025);
    assert_eq!(json["totalMessages"], 1);
    assert_eq!(json["mostActiveDay"]["formattedDate"], "Mar 7");
    assert_eq!(json["maxStreak"], 1);
}

#[test]
fn test_stray_list_entries_keep_the_valid_tools() {
    let root = TempDir::new().unwrap();
    write_session(
        root.path(),
        "project",
        "s",
        &[message(
            "assistant",
            at(2025, 5, 5),
            r#","tool_calls":[{"name":"bash"},null],"content":[{"type":"tool_use","name":"read"},"stray"]"#,
        )],
    );
    let corpus = collect(root.path()).unwrap();
    let summary = summarize(&corpus, 2025, &OfflineNames, at(2025, 5, 5));

    assert_eq!(summary.total_tool_calls, 2);
    let tools: Vec<_> = summary.top_tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tools, vec!["bash", "read"]);
}
