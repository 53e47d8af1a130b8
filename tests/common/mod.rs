//! Scripted prediction service on a local socket, plus a recording render target.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use pitwall::model::Alternative;
use pitwall::render::RenderFrame;
use pitwall::status::StatusIndicator;
use pitwall::ui::RenderTarget;

#[derive(Clone, Debug)]
pub enum Reply {
    Json(u16, &'static str, String),
    Hang,
}

#[derive(Clone, Debug)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub body: String,
}

pub struct Stub {
    pub addr: SocketAddr,
    pub seen: Arc<Mutex<Vec<Seen>>>,
}

impl Stub {
    pub fn base(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

/// Serves `routes` as `(method, path, reply)`; anything else is a 404.
pub async fn serve(routes: Vec<(&'static str, &'static str, Reply)>) -> Stub {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let routes = Arc::new(routes);
    let log = Arc::clone(&seen);
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else { break };
            let routes = Arc::clone(&routes);
            let log = Arc::clone(&log);
            tokio::spawn(async move { handle(stream, &routes, &log).await });
        }
    });
    Stub { addr, seen }
}

async fn handle(mut stream: TcpStream, routes: &[(&'static str, &'static str, Reply)], log: &Mutex<Vec<Seen>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|l| {
            let (k, v) = l.split_once(':')?;
            k.eq_ignore_ascii_case("content-length").then(|| v.trim().parse::<usize>().ok()).flatten()
        })
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    log.lock().unwrap().push(Seen { method: method.clone(), path: path.clone(), body });

    let reply = routes
        .iter()
        .find(|(m, p, _)| *m == method && *p == path)
        .map(|(_, _, r)| r.clone())
        .unwrap_or(Reply::Json(404, "Not Found", r#"{"detail":"Not Found"}"#.to_string()));

    match reply {
        Reply::Hang => tokio::time::sleep(Duration::from_secs(3600)).await,
        Reply::Json(code, reason, body) => {
            let resp = format!(
                "HTTP/1.1 {} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                code,
                reason,
                body.len(),
                body
            );
            let _ = stream.write_all(resp.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    }
}

pub fn ok(body: &str) -> Reply {
    Reply::Json(200, "OK", body.to_string())
}

pub const MONACO_RESULT: &str = r#"{
    "optimal_lap": 34, "confidence": 0.87, "mae": 1.2,
    "prediction_lower": 32, "prediction_upper": 36, "model_used": "single",
    "alternatives": [{"lap": 30}, {"lap": 34}, {"lap": 38}]
}"#;

pub const HEALTHY: &str = r#"{"status": "healthy"}"#;

#[derive(Default)]
pub struct Recorder {
    pub statuses: Vec<StatusIndicator>,
    pub badges: Vec<String>,
    pub busy: Vec<bool>,
    pub frames: Vec<RenderFrame>,
    pub alternatives: Vec<Vec<Alternative>>,
    pub notices: Vec<String>,
    pub lines: Vec<String>,
    pub prompts: Vec<Option<String>>,
}

impl RenderTarget for Recorder {
    fn status(&mut self, indicator: &StatusIndicator) {
        self.statuses.push(indicator.clone());
    }

    fn model_badge(&mut self, label: &str) {
        self.badges.push(label.to_string());
    }

    fn busy(&mut self, busy: bool) {
        self.busy.push(busy);
    }

    fn frame(&mut self, frame: &RenderFrame, alternatives: &[Alternative]) {
        self.frames.push(frame.clone());
        self.alternatives.push(alternatives.to_vec());
    }

    fn notice(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    fn line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn prompt(&mut self, notice: Option<&str>) {
        self.prompts.push(notice.map(str::to_string));
    }
}
