//! End-to-end batch runs against a mock T2A endpoint.

use std::fs;
use std::path::Path;

use chrono::Local;
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;
use tempfile::TempDir;

use minimax_tts::input::InputError;
use minimax_tts::synthesizer::SynthesisError;
use minimax_tts::{Config, PipelineError, Workspace};

const GROUP_ID: &str = "test-group";
const API_KEY: &str = "sk-test-0123456789";

struct Fixture {
    _tmp: TempDir,
    server: ServerGuard,
    config: Config,
    workspace: Workspace,
}

impl Fixture {
    fn new(input: Option<&str>) -> Self {
        let tmp = TempDir::new().unwrap();
        let server = Server::new();
        let config = Config::new(API_KEY, GROUP_ID, &server.url());
        let workspace = Workspace::new(tmp.path(), Local::now());
        workspace.prepare().unwrap();
        if let Some(text) = input {
            fs::write(&workspace.input_file, text).unwrap();
        }
        Self {
            _tmp: tmp,
            server,
            config,
            workspace,
        }
    }

    fn mock_line(&mut self, text: &str, status: usize, content_type: &str, body: String) -> Mock {
        self.mock_line_hits(text, status, content_type, body, 1)
    }

    fn mock_line_hits(
        &mut self,
        text: &str,
        status: usize,
        content_type: &str,
        body: String,
        hits: usize,
    ) -> Mock {
        self.server
            .mock("POST", Matcher::Regex("^/v1/t2a_v2".to_string()))
            .match_query(Matcher::UrlEncoded("GroupId".into(), GROUP_ID.into()))
            .match_header("authorization", format!("Bearer {}", API_KEY).as_str())
            .match_body(Matcher::PartialJson(json!({ "text": text })))
            .with_status(status)
            .with_header("content-type", content_type)
            .with_body(body)
            .expect(hits)
            .create()
    }

    fn mock_audio(&mut self, text: &str, bytes: &[u8]) -> Mock {
        self.mock_audio_hits(text, bytes, 1)
    }

    fn mock_audio_hits(&mut self, text: &str, bytes: &[u8], hits: usize) -> Mock {
        let body = json!({
            "data": { "audio": hex::encode(bytes), "status": 2 },
            "extra_info": { "audio_length": 900, "audio_sample_rate": 32000, "audio_size": bytes.len() },
            "base_resp": { "status_code": 0, "status_msg": "success" }
        });
        self.mock_line_hits(text, 200, "application/json", body.to_string(), hits)
    }

    fn mock_status(&mut self, text: &str, status: usize) -> Mock {
        let body = json!({ "base_resp": { "status_code": 1004, "status_msg": "denied" } });
        self.mock_line(text, status, "application/json", body.to_string())
    }

    fn run(&self) -> Result<minimax_tts::RunReport, PipelineError> {
        minimax_tts::run(&self.config, &self.workspace, "korean")
    }

    fn summary(&self) -> String {
        fs::read_to_string(self.workspace.output_dir.join("summary.txt")).unwrap()
    }
}

fn mp3_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".mp3"))
        .collect();
    names.sort();
    names
}

#[test]
fn forbidden_line_is_skipped_and_next_line_still_runs() {
    let mut fx = Fixture::new(Some("first line\n\n   second line  \nthird line\n"));
    let first = fx.mock_audio("first line", b"ID3-one");
    let second = fx.mock_status("second line", 403);
    let third = fx.mock_audio("third line", b"ID3-three");

    let report = fx.run().unwrap();

    first.assert();
    second.assert();
    third.assert();
    assert_eq!(report.total, 3);
    assert_eq!(report.succeeded, 2);

    let summary = fx.summary();
    assert!(summary.contains("Processed lines: 2/3"));
    assert!(summary.contains("Language: korean"));
    assert!(summary.contains("1. [SUCCESS] first line\n"));
    assert!(summary.contains("2. [FAILURE] second line\n"));
    assert!(summary.contains("3. [SUCCESS] third line\n"));

    let out = &fx.workspace.output_dir;
    assert_eq!(mp3_files(out), vec!["output_1.mp3", "output_3.mp3"]);
    assert_eq!(fs::read(out.join("output_1.mp3")).unwrap(), b"ID3-one");
    assert_eq!(fs::read(out.join("output_3.mp3")).unwrap(), b"ID3-three");
}

#[test]
fn unauthorized_stops_the_batch_immediately() {
    let mut fx = Fixture::new(Some("alpha\nbeta\ngamma\n"));
    let alpha = fx.mock_audio("alpha", b"a");
    let beta = fx.mock_status("beta", 401);
    let gamma = fx.mock_audio_hits("gamma", b"c", 0);

    let err = fx.run().unwrap_err();

    alpha.assert();
    beta.assert();
    gamma.assert();
    assert!(matches!(
        err,
        PipelineError::Fatal {
            line: 2,
            source: SynthesisError::Unauthorized
        }
    ));
    assert!(!fx.workspace.output_dir.join("summary.txt").exists());
}

#[test]
fn rate_limit_stops_the_batch_immediately() {
    let mut fx = Fixture::new(Some("one\ntwo\n"));
    let one = fx.mock_status("one", 429);
    let two = fx.mock_audio_hits("two", b"2", 0);

    let err = fx.run().unwrap_err();

    one.assert();
    two.assert();
    assert!(matches!(
        err,
        PipelineError::Fatal {
            line: 1,
            source: SynthesisError::RateLimited
        }
    ));
    assert!(mp3_files(&fx.workspace.output_dir).is_empty());
}

#[test]
fn bad_payloads_mark_lines_failed() {
    let mut fx = Fixture::new(Some("plain\nnot hex\nno data\nbroken json\nserver error\nfine\n"));
    let _plain = fx.mock_line("plain", 200, "text/plain", "hello".to_string());
    let _hex = fx.mock_line(
        "not hex",
        200,
        "application/json",
        json!({ "data": { "audio": "zzzz" } }).to_string(),
    );
    let _data = fx.mock_line(
        "no data",
        200,
        "application/json",
        json!({ "data": null, "base_resp": { "status_code": 1008, "status_msg": "insufficient balance" } })
            .to_string(),
    );
    let _json = fx.mock_line("broken json", 200, "application/json", "{\"data\":".to_string());
    let _server_error = fx.mock_status("server error", 500);
    let _fine = fx.mock_audio("fine", &[0xff, 0xfb]);

    let report = fx.run().unwrap();

    assert_eq!(report.total, 6);
    assert_eq!(report.succeeded, 1);
    assert_eq!(mp3_files(&fx.workspace.output_dir), vec!["output_6.mp3"]);

    let summary = fx.summary();
    assert_eq!(summary.matches("[FAILURE]").count(), 5);
    assert_eq!(summary.matches("[SUCCESS]").count(), 1);
    assert!(summary.contains("6. [SUCCESS] fine\n"));
}

#[test]
fn odd_typed_log_fields_do_not_fail_the_line() {
    let mut fx = Fixture::new(Some("hola\n"));
    let body = json!({
        "data": { "audio": "fffb" },
        "extra_info": "n/a",
        "base_resp": { "status_code": "0", "status_msg": 7 }
    });
    let hola = fx.mock_line("hola", 200, "application/json", body.to_string());

    let report = fx.run().unwrap();

    hola.assert();
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.output_dir, fx.workspace.output_dir);
    assert_eq!(
        fs::read(fx.workspace.output_dir.join("output_1.mp3")).unwrap(),
        vec![0xff, 0xfb]
    );
    assert!(fx.summary().contains("1. [SUCCESS] hola\n"));
}

#[test]
fn long_text_is_capped_before_sending() {
    let long = "x".repeat(5200);
    let mut fx = Fixture::new(Some(&long));
    let capped = fx.mock_audio(&"x".repeat(5000), b"long");

    let report = fx.run().unwrap();

    capped.assert();
    assert_eq!(report.succeeded, 1);
    assert!(fx.summary().contains(&format!("1. [SUCCESS] {}...\n", "x".repeat(100))));
}

#[test]
fn missing_input_is_created_and_no_request_is_sent() {
    let mut fx = Fixture::new(None);
    let any = fx
        .server
        .mock("POST", Matcher::Any)
        .with_status(200)
        .expect(0)
        .create();

    let err = fx.run().unwrap_err();

    any.assert();
    assert!(matches!(err, PipelineError::Input(InputError::Created(_))));
    assert!(fx.workspace.input_file.exists());
    assert!(mp3_files(&fx.workspace.output_dir).is_empty());
}

#[test]
fn blank_input_is_no_input() {
    let mut fx = Fixture::new(Some("\n  \n\n"));
    let any = fx
        .server
        .mock("POST", Matcher::Any)
        .with_status(200)
        .expect(0)
        .create();

    let err = fx.run().unwrap_err();

    any.assert();
    assert!(matches!(err, PipelineError::Input(InputError::Empty(_))));
    assert!(mp3_files(&fx.workspace.output_dir).is_empty());
}

#[test]
fn unreachable_host_fails_each_line_but_writes_summary() {
    let tmp = TempDir::new().unwrap();
    let workspace = Workspace::new(tmp.path(), Local::now());
    workspace.prepare().unwrap();
    fs::write(&workspace.input_file, "uno\ndos\n").unwrap();
    let config = Config::new(API_KEY, GROUP_ID, "http://127.0.0.1:1");

    let report = minimax_tts::run(&config, &workspace, "SPANISH").unwrap();

    assert_eq!(report.succeeded, 0);
    assert_eq!(report.total, 2);
    let summary = fs::read_to_string(report.summary_path).unwrap();
    assert!(summary.contains("Processed lines: 0/2"));
    assert!(summary.contains("1. [FAILURE] uno\n"));
    assert!(summary.contains("2. [FAILURE] dos\n"));
}
