// ABOUTME: Integration tests for the podcast-cli binary.
// ABOUTME: Covers local parsing, stdin input, remote queries and exit status on failure.

use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>CLI Show</title>
    <itunes:author>Terminal Host</itunes:author>
    <item>
      <title>Pilot</title>
      <guid>pilot</guid>
      <pubDate>Mon, 01 Apr 2024 10:00:00 GMT</pubDate>
      <enclosure url="https://cdn.example.com/pilot.mp3" type="audio/mpeg"/>
      <itunes:duration>125</itunes:duration>
    </item>
    <item>
      <title>Sequel</title>
      <guid>sequel</guid>
      <pubDate>Mon, 08 Apr 2024 10:00:00 GMT</pubDate>
      <enclosure url="https://cdn.example.com/sequel.mp3" type="audio/mpeg"/>
    </item>
  </channel>
</rss>"#;

fn cli_cmd() -> Command {
    let mut cmd = Command::cargo_bin("podcast-cli").unwrap();
    cmd.env_remove("RSS_FEED_URL")
        .env_remove("FEED_TIMEOUT_SECS")
        .env("RUST_LOG", "warn");
    cmd
}

#[test]
fn parse_local_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("feed.xml");
    fs::write(&path, FEED).unwrap();

    cli_cmd()
        .arg("parse")
        .arg(&path)
        .arg("--compact")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""title":"CLI Show""#))
        .stdout(predicate::str::contains(r#""duration":"2:05""#))
        .stdout(predicate::str::contains(r#""id":"sequel""#));
}

#[test]
fn parse_stdin() {
    cli_cmd()
        .args(["parse", "-"])
        .write_stdin(FEED)
        .assert()
        .success()
        .stdout(predicate::str::contains("Terminal Host"));
}

#[test]
fn parse_missing_file_fails() {
    cli_cmd()
        .args(["parse", "/definitely/not/here.xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn parse_malformed_fails() {
    cli_cmd()
        .args(["parse", "-"])
        .write_stdin("<rss><channel>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse"));
}

#[test]
fn episodes_from_remote_feed() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/feed.xml");
        then.status(200)
            .header("content-type", "application/rss+xml")
            .body(FEED);
    });

    cli_cmd()
        .arg("episodes")
        .arg("--feed-url")
        .arg(server.url("/feed.xml"))
        .args(["--limit", "1", "--compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""success":true"#))
        .stdout(predicate::str::contains(r#""hasMore":true"#))
        .stdout(predicate::str::contains("Sequel"))
        .stdout(predicate::str::contains("Pilot").not());

    mock.assert();
}

#[test]
fn info_reads_feed_url_from_env() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/feed.xml");
        then.status(200).body(FEED);
    });

    cli_cmd()
        .env("RSS_FEED_URL", server.url("/feed.xml"))
        .args(["info", "--compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""author":"Terminal Host""#));
}

#[test]
fn info_without_feed_url_exits_nonzero() {
    cli_cmd()
        .arg("info")
        .assert()
        .failure()
        .stdout(predicate::str::contains("RSS feed URL not configured"));
}

#[test]
fn episodes_upstream_error_exits_nonzero() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/feed.xml");
        then.status(404);
    });

    cli_cmd()
        .arg("episodes")
        .arg("--feed-url")
        .arg(server.url("/feed.xml"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("Failed to fetch episodes"))
        .stdout(predicate::str::contains("HTTP 404: Not Found"));
}
