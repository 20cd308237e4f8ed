//! Minimal HTTP/1.1 server standing in for the conversion service.
//!
//! Answers `POST /api/convert` with a scripted JSON reply and GET requests
//! with a fixed file body, recording every request so tests can assert on
//! method, path, headers, and body. The server runs until the process exits.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Scripted reply for the conversion endpoint.
#[derive(Debug, Clone)]
pub enum ConvertReply {
    /// 200 with a download link.
    Download {
        path: String,
        title: Option<String>,
        cached: bool,
    },
    /// 400 with an `error` body, the way the backend reports bad URLs.
    Error(String),
    /// 200 with a body that is not JSON.
    Garbage,
    /// Bare status with an empty body.
    Status(u32),
}

#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub reply: ConvertReply,
    /// Body served for GET requests (the "converted" file).
    pub file_body: Vec<u8>,
    /// Status for GET requests; 404 simulates an expired link.
    pub file_status: u32,
    pub content_disposition: Option<String>,
    /// Hold the conversion reply for this long (re-entrancy tests).
    pub convert_delay: Option<Duration>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            reply: ConvertReply::Download {
                path: "/api/download?f=1".to_string(),
                title: Some("Test Track".to_string()),
                cached: false,
            },
            file_body: b"ID3-not-really-audio".to_vec(),
            file_status: 200,
            content_disposition: Some("attachment; filename=\"track.mp3\"".to_string()),
            convert_delay: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names lowercased.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

pub type RequestLog = Arc<Mutex<Vec<RecordedRequest>>>;

/// Starts the server on an ephemeral port; returns the base URL (no trailing
/// slash) and the shared request log.
pub fn start(opts: ServerOptions) -> (String, RequestLog) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let accept_log = Arc::clone(&log);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let opts = opts.clone();
            let log = Arc::clone(&accept_log);
            thread::spawn(move || handle(stream, &opts, &log));
        }
    });
    (format!("http://127.0.0.1:{}", port), log)
}

fn handle(mut stream: TcpStream, opts: &ServerOptions, log: &RequestLog) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));

    let request = match read_request(&mut stream) {
        Some(r) => r,
        None => return,
    };
    let method = request.method.clone();
    let path = request.path.clone();
    log.lock().unwrap().push(request);

    if method.eq_ignore_ascii_case("POST") && path.starts_with("/api/convert") {
        if let Some(delay) = opts.convert_delay {
            thread::sleep(delay);
        }
        let (status, body) = match &opts.reply {
            ConvertReply::Download {
                path,
                title,
                cached,
            } => {
                let title_part = title
                    .as_ref()
                    .map(|t| format!(", \"title\": \"{}\"", t))
                    .unwrap_or_default();
                (
                    "200 OK".to_string(),
                    format!(
                        "{{\"download_url\": \"{}\"{}, \"cached\": {}}}",
                        path, title_part, cached
                    ),
                )
            }
            ConvertReply::Error(message) => (
                "400 Bad Request".to_string(),
                format!("{{\"error\": \"{}\"}}", message),
            ),
            ConvertReply::Garbage => ("200 OK".to_string(), "<html>oops</html>".to_string()),
            ConvertReply::Status(code) => (format!("{} Whatever", code), String::new()),
        };
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if method.eq_ignore_ascii_case("GET") {
        if opts.file_status != 200 {
            let response = format!(
                "HTTP/1.1 {} Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                opts.file_status
            );
            let _ = stream.write_all(response.as_bytes());
            return;
        }
        let disposition = opts
            .content_disposition
            .as_ref()
            .map(|v| format!("Content-Disposition: {}\r\n", v))
            .unwrap_or_default();
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: audio/mpeg\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
            opts.file_body.len(),
            disposition
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.write_all(&opts.file_body);
        return;
    }

    let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\n\r\n");
}

/// Reads one request (headers plus Content-Length body), answering
/// `Expect: 100-continue` so libcurl sends the body without waiting.
fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        if let Some(pos) = find_header_end(&buf) {
            break pos;
        }
        match stream.read(&mut chunk) {
            Ok(0) => return None,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(_) => return None,
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.lines();
    let request_line = lines.next()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut headers = Vec::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.push((
                name.trim().to_ascii_lowercase(),
                value.trim().to_string(),
            ));
        }
    }

    let content_length: usize = headers
        .iter()
        .find(|(n, _)| n == "content-length")
        .and_then(|(_, v)| v.parse().ok())
        .unwrap_or(0);

    if headers
        .iter()
        .any(|(n, v)| n == "expect" && v.eq_ignore_ascii_case("100-continue"))
    {
        let _ = stream.write_all(b"HTTP/1.1 100 Continue\r\n\r\n");
    }

    let body_start = header_end + 4;
    while buf.len() < body_start + content_length {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(_) => break,
        }
    }
    let body = String::from_utf8_lossy(&buf[body_start..]).into_owned();

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
