//! Shared fixtures for the integration tests: temp config/log files and a
//! loopback webhook that records what it is sent.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use eve_notify::Settings;
use tempfile::TempDir;

pub const SAMPLE_STATS: &str = r#"{"event_type":"stats","stats":{"decoder":{"pkts":100,"bytes":5000,"tcp":80,"udp":20},"app_layer":{"flow":{"http":5,"tls":3,"dns_udp":2}},"capture":{"kernel_packets":100,"kernel_drops":0},"flow":{"total":10,"tcp":8,"udp":2}}}"#;

pub const SAMPLE_PAYLOAD: &str = r#"{"traffic":{"packets":100,"bytes":5000},"protocols":{"tcp":80,"udp":20,"icmpv4":0,"icmpv6":0},"app_layers":{"http":5,"tls":3,"dns":2},"capture":{"kernel_packets":100,"kernel_drops":0},"flow":{"total":10,"tcp":8,"udp":2}}"#;

/// A config file and an EVE log inside a throwaway directory.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.json")
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.path().join("eve.json")
    }

    pub fn write_config(&self, contents: &str) -> &Self {
        write_file(&self.config_path(), contents);
        self
    }

    pub fn write_webhook_url(&self, url: &str) -> &Self {
        self.write_config(&serde_json::json!({ "TINES_WEBHOOK_URL": url }).to_string())
    }

    pub fn write_log(&self, lines: &[&str]) -> &Self {
        let mut contents = lines.join("\n");
        contents.push('\n');
        write_file(&self.log_path(), &contents);
        self
    }

    pub fn settings(&self) -> Settings {
        Settings {
            log_path: self.log_path(),
            config_path: self.config_path(),
            ..Settings::default()
        }
    }
}

fn write_file(path: &Path, contents: &str) {
    std::fs::write(path, contents).expect("failed to write fixture");
}

/// A request received by [`MockWebhook`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is not JSON")
    }
}

/// Loopback HTTP endpoint answering every request with one fixed status and body.
///
/// Runs on a background thread and stops when dropped.
pub struct MockWebhook {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    addr: SocketAddr,
    stop_flag: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl MockWebhook {
    pub fn start(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind mock webhook");
        let addr = listener.local_addr().expect("failed to get local addr");
        listener
            .set_nonblocking(true)
            .expect("failed to set non-blocking");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let stop_flag = Arc::new(AtomicBool::new(false));

        let requests_clone = Arc::clone(&requests);
        let stop_clone = Arc::clone(&stop_flag);
        let body = body.as_bytes().to_vec();
        let thread = std::thread::spawn(move || {
            serve(listener, status, body, requests_clone, stop_clone);
        });

        Self {
            requests,
            addr,
            stop_flag,
            thread: Some(thread),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/hook", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("mock webhook lock poisoned").clone()
    }
}

impl Drop for MockWebhook {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        let _ = TcpStream::connect(self.addr);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn serve(
    listener: TcpListener,
    status: u16,
    body: Vec<u8>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    stop_flag: Arc<AtomicBool>,
) {
    loop {
        if stop_flag.load(Ordering::SeqCst) {
            break;
        }

        let stream = match listener.accept() {
            Ok((stream, _)) => stream,
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(10));
                continue;
            }
            Err(_) => break,
        };
        if stop_flag.load(Ordering::SeqCst) {
            break;
        }

        // Accepted sockets can inherit non-blocking mode on some platforms.
        let _ = stream.set_nonblocking(false);
        let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));

        if let Some(request) = read_request(&stream) {
            requests
                .lock()
                .expect("mock webhook lock poisoned")
                .push(request);
        }

        let reason = match status {
            200 => "OK",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Unknown",
        };
        let head = format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        let mut writer = &stream;
        let _ = writer.write_all(head.as_bytes());
        let _ = writer.write_all(&body);
        let _ = writer.flush();
        let _ = stream.shutdown(std::net::Shutdown::Both);
    }
}

fn read_request(stream: &TcpStream) -> Option<RecordedRequest> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut headers = Vec::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            break;
        }
        if let Some((name, value)) = trimmed.split_once(':') {
            let (name, value) = (name.trim().to_string(), value.trim().to_string());
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse().unwrap_or(0);
            }
            headers.push((name, value));
        }
    }

    let mut body = vec![0u8; content_length.min(1024 * 1024)];
    reader.read_exact(&mut body).ok()?;

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

/// In-memory sink for the fmt subscriber, so tests can read back diagnostics.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    /// Runs `f` with a subscriber writing into this buffer, then returns what `f` returned.
    pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_target(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn contents(&self) -> String {
        let buf = self.buf.lock().expect("captured logs lock poisoned");
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buf
            .lock()
            .expect("captured logs lock poisoned")
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
