//! Log collector: walks the data root and parses every session file.
//!
//! Layout on disk:
//!
//! ```text
//! <root>/<project>/<session>.jsonl
//! ```
//!
//! Failure is scoped to the smallest unit: an unlistable project, an
//! unreadable file, or an undecodable line is skipped on its own. Only an
//! unlistable root fails the scan.

use crate::error::{Error, Result};
use crate::record::{MessageRecord, ProjectRecord, RawRecord, SessionRecord};
use log::{debug, info};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

pub const LOG_EXTENSION: &str = ".jsonl";

/// Everything read from one data root, regardless of year.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub projects: Vec<ProjectRecord>,
    pub sessions: Vec<SessionRecord>,
    pub messages: Vec<MessageRecord>,
}

/// Parsed contents of one session file.
struct SessionLog {
    session: Option<SessionRecord>,
    messages: Vec<MessageRecord>,
}

struct ProjectScan {
    project: ProjectRecord,
    logs: Vec<SessionLog>,
}

/// Whether the data root can be listed at all.
pub fn data_root_exists(root: &Path) -> bool {
    fs::read_dir(root).is_ok()
}

/// A session file name ends in `.jsonl` and carries no path separator.
#[inline]
pub fn is_session_file(name: &str) -> bool {
    name.ends_with(LOG_EXTENSION) && !name.contains('/') && !name.contains('\\')
}

pub fn collect(root: &Path) -> Result<Corpus> {
    let entries = fs::read_dir(root).map_err(|source| Error::DataRoot {
        path: root.to_path_buf(),
        source,
    })?;

    // Sorted so the merged corpus does not depend on directory order
    let mut top_entries: Vec<(String, PathBuf)> = entries
        .flatten()
        .map(|e| (e.file_name().to_string_lossy().into_owned(), e.path()))
        .collect();
    top_entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));

    let scans: Vec<ProjectScan> = top_entries
        .par_iter()
        .filter_map(|(name, path)| scan_project(name, path))
        .collect();

    let mut corpus = Corpus::default();
    for scan in scans {
        corpus.projects.push(scan.project);
        for log in scan.logs {
            corpus.sessions.extend(log.session);
            corpus.messages.extend(log.messages);
        }
    }

    info!(
        "Scanned {}: {} projects, {} sessions, {} messages",
        root.display(),
        corpus.projects.len(),
        corpus.sessions.len(),
        corpus.messages.len()
    );
    Ok(corpus)
}

fn scan_project(id: &str, path: &Path) -> Option<ProjectScan> {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Skipping {}: {}", path.display(), e);
            return None;
        }
    };

    let mut files: Vec<String> = entries
        .flatten()
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| is_session_file(name))
        .collect();
    files.sort_unstable();

    let logs = files
        .par_iter()
        .filter_map(|name| read_session(&path.join(name), name, id))
        .collect();

    Some(ProjectScan {
        project: ProjectRecord {
            id: id.into(),
            path: path.to_path_buf(),
        },
        logs,
    })
}

fn read_session(path: &Path, file_name: &str, project_id: &str) -> Option<SessionLog> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Skipping unreadable session {}: {}", path.display(), e);
            return None;
        }
    };

    let session_id = file_name.strip_suffix(LOG_EXTENSION).unwrap_or(file_name);
    let messages = parse_session_bytes(&bytes, session_id);
    let session = SessionRecord::from_messages(session_id, project_id, &messages);
    Some(SessionLog { session, messages })
}

/// Decode every line on its own; undecodable lines and non-message kinds are
/// dropped without affecting the rest of the file.
pub fn parse_session_log(content: &str, session_id: &str) -> Vec<MessageRecord> {
    content
        .lines()
        .filter_map(|line| parse_line(line, session_id))
        .collect()
}

/// Raw file bytes. Lines that are not valid UTF-8 (a torn multibyte write at
/// the tail, say) are dropped on their own like any other undecodable line.
pub fn parse_session_bytes(bytes: &[u8], session_id: &str) -> Vec<MessageRecord> {
    bytes
        .split(|&b| b == b'\n')
        .filter_map(|line| std::str::from_utf8(line).ok())
        .filter_map(|line| parse_line(line, session_id))
        .collect()
}

#[inline]
fn parse_line(line: &str, session_id: &str) -> Option<MessageRecord> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    serde_json::from_str::<RawRecord>(line)
        .ok()?
        .into_message(session_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const USER: &str = r#"{"type":"message","role":"user","timestamp":"2025-05-01T10:00:00Z","content":"hi"}"#;
    const ASSISTANT: &str = r#"{"type":"message","role":"assistant","model":"openai/gpt-4o","timestamp":"2025-05-01T10:00:05Z","usage":{"input_tokens":10,"output_tokens":5}}"#;
    const META: &str = r#"{"type":"config","timestamp":"2025-05-01T09:59:59Z"}"#;

    #[test]
    fn test_is_session_file() {
        assert!(is_session_file("abc.jsonl"));
        assert!(!is_session_file("abc.json"));
        assert!(!is_session_file("nested/abc.jsonl"));
        assert!(!is_session_file("abc.jsonl.bak"));
    }

    #[test]
    fn test_parse_counts_only_decodable_messages() {
        // 7 lines: 2 undecodable, 2 non-message, 3 messages
        let content = [USER, "{not json", ASSISTANT, META, "42", META, USER].join("\n");
        let messages = parse_session_log(&content, "s");
        assert_eq!(messages.len(), 7 - 2 - 2);
    }

    #[test]
    fn test_parse_ignores_blank_lines_and_trailing_newline() {
        let content = format!("\n{USER}\n\n{ASSISTANT}\n");
        assert_eq!(parse_session_log(&content, "s").len(), 2);
    }

    #[test]
    fn test_invalid_utf8_costs_only_that_line() {
        let mut bytes = format!("{USER}\r\n{ASSISTANT}\n").into_bytes();
        bytes.extend_from_slice(br#"{"type":"message","role":"user","content":"price "#);
        bytes.extend_from_slice(&[0xe2, 0x82]);
        assert_eq!(parse_session_bytes(&bytes, "s").len(), 2);

        let dir = TempDir::new().unwrap();
        let project = dir.path().join("alpha");
        fs::create_dir(&project).unwrap();
        fs::write(project.join("torn.jsonl"), &bytes).unwrap();

        let corpus = collect(dir.path()).unwrap();
        assert_eq!(corpus.messages.len(), 2);
        assert_eq!(corpus.sessions.len(), 1);
        assert_eq!(corpus.sessions[0].message_count, 2);
    }

    #[test]
    fn test_collect_walks_projects() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        let alpha = root.join("alpha");
        fs::create_dir(&alpha).unwrap();
        fs::write(alpha.join("s1.jsonl"), format!("{USER}\n{ASSISTANT}\n")).unwrap();
        fs::write(alpha.join("s2.jsonl"), format!("{META}\n")).unwrap();
        fs::write(alpha.join("notes.txt"), USER).unwrap();

        let beta = root.join("beta");
        fs::create_dir(&beta).unwrap();
        fs::create_dir(beta.join("broken.jsonl")).unwrap();

        fs::write(root.join("stray.jsonl"), USER).unwrap();

        let corpus = collect(root).unwrap();
        let ids: Vec<_> = corpus.projects.iter().map(|p| &*p.id).collect();
        assert_eq!(ids, vec!["alpha", "beta"]);
        assert_eq!(corpus.sessions.len(), 1);
        assert_eq!(&*corpus.sessions[0].id, "s1");
        assert_eq!(&*corpus.sessions[0].project_id, "alpha");
        assert_eq!(corpus.sessions[0].message_count, 2);
        assert_eq!(corpus.messages.len(), 2);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(!data_root_exists(&missing));
        assert!(matches!(collect(&missing), Err(Error::DataRoot { .. })));
    }

    #[test]
    fn test_empty_root() {
        let dir = TempDir::new().unwrap();
        assert!(data_root_exists(dir.path()));
        let corpus = collect(dir.path()).unwrap();
        assert!(corpus.projects.is_empty());
        assert!(corpus.messages.is_empty());
    }
}
