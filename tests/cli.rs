//! Integration tests for the personctl binary against a scripted repository

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

/// Minimal HTTP/1.1 responder answering one scripted reply per connection
struct FakeRepository {
    base_url: String,
    handle: JoinHandle<Vec<String>>,
}

impl FakeRepository {
    fn start(replies: Vec<(u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let mut seen = Vec::new();
            for (status, body) in replies {
                let (mut stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());

                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                seen.push(request_line.trim_end().to_string());

                // Drain headers
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).unwrap();
                    if line == "\r\n" || line.is_empty() {
                        break;
                    }
                }

                let reason = if status < 300 { "OK" } else { "Error" };
                write!(
                    stream,
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                )
                .unwrap();
                stream.flush().unwrap();
            }
            seen
        });

        Self { base_url, handle }
    }

    /// Request lines seen, in order
    fn requests(self) -> Vec<String> {
        self.handle.join().unwrap()
    }
}

/// Isolated config location so the user's real config is never read
struct TestEnv {
    temp_dir: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    fn config_path(&self) -> String {
        self.temp_dir
            .path()
            .join("config.toml")
            .to_str()
            .unwrap()
            .to_string()
    }

    fn write_config(&self, content: &str) {
        fs::write(self.config_path(), content).unwrap();
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("personctl").unwrap();
        cmd.env_remove("RUST_LOG").args(["--config", &self.config_path()]);
        cmd
    }
}

// =============================================================================
// Editors
// =============================================================================

#[test]
fn test_alias_add_reloads() {
    let env = TestEnv::new();
    let repo = FakeRepository::start(vec![(200, "Alias added.")]);

    env.cmd()
        .args(["--base-url", &repo.base_url, "alias", "add", "p1", "Ada Lovelace"])
        .assert()
        .success()
        .stdout(predicate::eq("reload\n"));

    let requests = repo.requests();
    assert_eq!(
        requests,
        vec!["GET /action/Person/add_alias?person=p1&alias=Ada+Lovelace HTTP/1.1".to_string()]
    );
}

#[test]
fn test_alias_use_navigates() {
    let env = TestEnv::new();
    let repo = FakeRepository::start(vec![(200, "ok")]);

    env.cmd()
        .args([
            "--base-url",
            &repo.base_url,
            "alias",
            "use",
            "p1",
            "Ada",
            "--navigate",
            "/action/Person/show?person=p1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "navigate /action/Person/show?person=p1",
        ));

    assert_eq!(repo.requests().len(), 1);
}

#[test]
fn test_server_error_is_reported() {
    let env = TestEnv::new();
    let repo = FakeRepository::start(vec![(404, "No person with ID p9.")]);

    env.cmd()
        .args(["--base-url", &repo.base_url, "alias", "remove", "p9", "Bob"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("reload").not())
        .stderr(predicate::str::contains(
            "error: failed to remove 'Bob' as alias for p9",
        ));

    repo.requests();
}

#[test]
fn test_malformed_metadata_sends_nothing() {
    let env = TestEnv::new();
    // Nothing listens here; the command must not try to connect
    env.cmd()
        .args([
            "--base-url",
            "http://127.0.0.1:9",
            "metadata",
            "add",
            "p1",
            "no separator",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "format of metadata values must be NAME : VALUE",
        ));
}

#[test]
fn test_metadata_add_uses_config_base_url() {
    let env = TestEnv::new();
    let repo = FakeRepository::start(vec![(200, "ok")]);
    env.write_config(&format!("base_url = \"{}\"\n", repo.base_url));

    env.cmd()
        .args(["metadata", "add", "p1", " title : R&D lead ", "--stay"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(
        repo.requests(),
        vec![
            "GET /action/Person/add_metadata?person=p1&name=title&value=R%26D+lead HTTP/1.1"
                .to_string()
        ]
    );
}

#[test]
fn test_show_excluded_rejects_unknown_kind() {
    let env = TestEnv::new();
    env.cmd()
        .args(["--base-url", "http://127.0.0.1:9", "excluded", "p1", "photos"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_missing_base_url() {
    let env = TestEnv::new();
    env.cmd()
        .args(["note", "p1", "met at the conference"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--base-url"));
}

// =============================================================================
// Email discovery and pictures
// =============================================================================

#[test]
fn test_email_discover_json() {
    let env = TestEnv::new();
    let repo = FakeRepository::start(vec![(200, "ada@example.com\r\nlovelace@example.org\r\n")]);

    let output = env
        .cmd()
        .args(["--base-url", &repo.base_url, "--json", "email", "discover", "p1", "d1"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["ok"], serde_json::json!(true));
    assert_eq!(
        report["addresses"],
        serde_json::json!(["ada@example.com", "lovelace@example.org"])
    );
    assert!(report["elements"]["d1-emailbutton"]
        .as_str()
        .unwrap()
        .contains("Hide email addresses"));

    let requests = repo.requests();
    assert!(requests[0].starts_with("GET /action/Person/look_for_email_address?person=p1&doc_id=d1 "));
}

#[test]
fn test_email_discover_no_results() {
    let env = TestEnv::new();
    let repo = FakeRepository::start(vec![(200, "")]);

    env.cmd()
        .args(["--base-url", &repo.base_url, "email", "discover", "p1", "d1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No email addresses found."));

    repo.requests();
}

#[test]
fn test_pictures_add_falls_back_to_backup() {
    let env = TestEnv::new();
    let repo = FakeRepository::start(vec![(500, "fetch failed"), (200, "doc-9"), (200, "ok")]);

    env.cmd()
        .args([
            "--base-url",
            &repo.base_url,
            "pictures",
            "add",
            "p1",
            "--title",
            "Ada",
            "--url",
            "http://images.example/ada.jpg",
            "--backup-url",
            "http://thumbs.example/ada.jpg",
            "--canonical",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("document doc-9").and(predicate::str::contains("reload")));

    let requests = repo.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].contains("URL=http%3A%2F%2Fimages.example%2Fada.jpg"));
    assert!(requests[1].contains("URL=http%3A%2F%2Fthumbs.example%2Fada.jpg"));
    assert!(requests[2].starts_with("GET /action/Person/make_canonical_photo?person=p1&doc_id=doc-9 "));
}

#[test]
fn test_pictures_add_json_report() {
    let env = TestEnv::new();
    let repo = FakeRepository::start(vec![(200, "doc-9")]);

    let output = env
        .cmd()
        .args([
            "--base-url",
            &repo.base_url,
            "--json",
            "pictures",
            "add",
            "p1",
            "--title",
            "Ada",
            "--url",
            "http://images.example/ada.jpg",
            "--backup-url",
            "http://thumbs.example/ada.jpg",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    // The whole of stdout is one JSON document
    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["ok"], serde_json::json!(true));
    assert_eq!(report["document"], serde_json::json!("doc-9"));
    // Closing the session flushes the reload owed for the attached picture
    assert_eq!(report["events"], serde_json::json!([{ "event": "reload" }]));
    assert!(report.get("addresses").is_none());

    assert_eq!(repo.requests().len(), 1);
}

#[test]
fn test_pictures_search_prints_panel() {
    let env = TestEnv::new();
    let repo = FakeRepository::start(vec![(200, "<table><tr><td>result</td></tr></table>")]);

    env.cmd()
        .args(["--base-url", &repo.base_url, "pictures", "search", "p1"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--- PicturesSearchPanel")
                .and(predicate::str::contains("<td>result</td>")),
        );

    let requests = repo.requests();
    assert!(requests[0].starts_with("GET /action/Person/look_for_pictures?headless=true&person=p1 "));
}
