//! HttpParaphraser とサービス全体の結合テスト。
//!
//! 外部サービスの代わりに、1接続だけ応答する tokio の TCP スタブを立てる。

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use phraser_core::domain::settings::PhraserSettings;
use phraser_core::domain::types::{Dialect, Tone};
use phraser_core::infra::output::OutputRouter;
use phraser_core::infra::rewriter::{
    HttpParaphraser, RewriteContext, RewriteError, Rewriter,
};
use phraser_core::usecase::{PhraserService, RewriteOutcome};

#[derive(Debug)]
struct CapturedRequest {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body should be JSON")
    }
}

enum StubReply {
    Respond { status: u16, body: &'static str },
    Hang,
}

/// 1リクエストだけ受け付けるスタブサーバー
async fn stub_server(reply: StubReply) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];

        let header_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let mut lines = head.split("\r\n").filter(|l| !l.is_empty());
        let request_line = lines.next().unwrap_or_default().to_string();
        let headers: Vec<(String, String)> = lines
            .filter_map(|l| l.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        let content_length = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

        match reply {
            StubReply::Respond { status, body: reply_body } => {
                let response = format!(
                    "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{reply_body}",
                    reply_body.len()
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.ok();
            }
            StubReply::Hang => {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }

        CapturedRequest {
            request_line,
            headers,
            body,
        }
    });

    (base_url, handle)
}

fn settings_for(base_url: &str) -> PhraserSettings {
    PhraserSettings {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        ..Default::default()
    }
}

fn ctx(tone: Tone) -> RewriteContext {
    RewriteContext {
        tone,
        dialect: Dialect::British,
    }
}

#[tokio::test]
async fn formal_rewrite_round_trip() {
    let (base_url, server) = stub_server(StubReply::Respond {
        status: 200,
        body: r#"{"result": "Hello there."}"#,
    })
    .await;
    let settings = settings_for(&base_url);
    let rewriter = Arc::new(HttpParaphraser::from_settings(&settings).unwrap());
    let service = PhraserService::new(&settings, rewriter, OutputRouter::new());

    service.on_text_edit("hello there");
    let outcome = service.on_tone_selected_and_wait(Tone::Formal).await.unwrap();

    assert_eq!(outcome, RewriteOutcome::Applied("Hello there.".to_string()));
    let snap = service.snapshot();
    assert_eq!(snap.result, "Hello there.");
    assert!(!snap.busy);

    let captured = server.await.unwrap();
    assert_eq!(captured.request_line, "POST /api/Parapharser HTTP/1.1");
    assert_eq!(captured.header("content-type"), Some("application/json"));
    assert_eq!(
        captured.json(),
        serde_json::json!({"tone": "Formal", "sentence": "hello there"})
    );
}

#[tokio::test]
async fn paste_sends_current_tone_without_dialect() {
    let (base_url, server) = stub_server(StubReply::Respond {
        status: 200,
        body: r#"{"result": "A brisk jotting."}"#,
    })
    .await;
    let settings = PhraserSettings {
        default_tone: Tone::Creative,
        ..settings_for(&base_url)
    };
    let rewriter = Arc::new(HttpParaphraser::from_settings(&settings).unwrap());
    let service = PhraserService::new(&settings, rewriter, OutputRouter::new());

    service.on_paste_and_wait("quick note").await.unwrap();

    let captured = server.await.unwrap();
    assert_eq!(
        captured.json(),
        serde_json::json!({"tone": "Creative", "sentence": "quick note"})
    );
    assert_eq!(service.snapshot().result, "A brisk jotting.");
}

#[tokio::test]
async fn non_success_status_is_failure() {
    let (base_url, server) = stub_server(StubReply::Respond {
        status: 502,
        body: r#"{"error": "upstream"}"#,
    })
    .await;
    let rewriter = HttpParaphraser::from_settings(&settings_for(&base_url)).unwrap();

    let err = rewriter.rewrite("hello", ctx(Tone::Standard)).await.unwrap_err();

    match err {
        RewriteError::Status { status, body } => {
            assert_eq!(status, 502);
            assert!(body.contains("upstream"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn missing_result_field_is_malformed() {
    let (base_url, server) = stub_server(StubReply::Respond {
        status: 200,
        body: r#"{"output": "Hello."}"#,
    })
    .await;
    let settings = settings_for(&base_url);
    let rewriter = Arc::new(HttpParaphraser::from_settings(&settings).unwrap());
    let service = PhraserService::new(&settings, rewriter, OutputRouter::new());
    service.session().update(|s| s.set_result("earlier"));

    let err = service.on_paste_and_wait("hello").await.unwrap_err();

    assert!(matches!(err, RewriteError::MalformedResponse(_)));
    assert_eq!(service.snapshot().result, "earlier");
    assert!(!service.snapshot().busy);
    assert_eq!(service.get_metrics().error_counts.malformed, 1);
    server.await.unwrap();
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    // ポートを確保してすぐ閉じる
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let settings = settings_for(&format!("http://{addr}"));
    let rewriter = Arc::new(HttpParaphraser::from_settings(&settings).unwrap());
    let service = PhraserService::new(&settings, rewriter, OutputRouter::new());

    service.on_text_edit("hello");
    let err = service.on_submit_and_wait().await.unwrap_err();

    assert!(matches!(err, RewriteError::Transport(_)));
    assert!(!service.snapshot().busy);
    assert_eq!(service.snapshot().result, "");
}

#[tokio::test]
async fn transport_timeout_is_reported() {
    let (base_url, _server) = stub_server(StubReply::Hang).await;
    let rewriter = HttpParaphraser::new(
        format!("{base_url}/api/Parapharser"),
        Duration::from_millis(200),
    )
    .unwrap();

    let err = rewriter.rewrite("hello", ctx(Tone::Simple)).await.unwrap_err();

    assert!(matches!(err, RewriteError::Timeout));
}
