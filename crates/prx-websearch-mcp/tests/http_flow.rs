use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use serde_json::Value;

fn reserve_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("reserve addr");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    addr.to_string()
}

fn wait_for_http(addr: &str) {
    for _ in 0..80 {
        if TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    panic!("http server not ready on {addr}");
}

fn send_http(addr: &str, method: &str, path: &str, body: &str) -> String {
    let mut stream = TcpStream::connect(addr).expect("connect http");
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    stream.write_all(request.as_bytes()).expect("write request");
    stream.flush().expect("flush");
    let mut buf = String::new();
    stream.read_to_string(&mut buf).expect("read response");
    buf
}

fn response_json(response: &str) -> Value {
    let body = response.split("\r\n\r\n").nth(1).unwrap_or("");
    serde_json::from_str(body).expect("json body")
}

struct Daemon(Child);

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn start_daemon() -> (Daemon, String) {
    let addr = reserve_addr();
    let child = Command::new(env!("CARGO_BIN_EXE_prx-websearchd"))
        .env("PRX_WEBSEARCHD_TRANSPORT", "http")
        .env("PRX_WEBSEARCH_HTTP_ADDR", &addr)
        .env("PRX_SEARCH_ENDPOINT", "http://127.0.0.1:1")
        .env("PRX_RERANK_ENDPOINT", "http://127.0.0.1:1")
        .env("TENCENT_SECRET_ID", "AKIDHTTP")
        .env("TENCENT_SECRET_KEY", "http-secret-key")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn prx-websearchd");
    wait_for_http(&addr);
    (Daemon(child), addr)
}

#[test]
fn health_and_mcp_endpoints_work() {
    let (_daemon, addr) = start_daemon();

    let health = send_http(&addr, "GET", "/health", "");
    assert!(health.starts_with("HTTP/1.1 200"));
    assert_eq!(response_json(&health)["status"], "ok");

    let init = send_http(
        &addr,
        "POST",
        "/mcp",
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
    );
    assert!(init.starts_with("HTTP/1.1 200"));
    let body = response_json(&init);
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["result"]["serverInfo"]["name"], "prx-websearch-mcp");

    let note = send_http(
        &addr,
        "POST",
        "/mcp",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
    );
    assert!(note.starts_with("HTTP/1.1 202"));

    let bad = send_http(&addr, "POST", "/mcp", "{");
    assert!(bad.starts_with("HTTP/1.1 400"));
    assert_eq!(response_json(&bad)["error"]["code"], -32700);
}

#[test]
fn search_route_validates_and_reports_failures() {
    let (_daemon, addr) = start_daemon();

    for body in ["{}", r#"{"query":""}"#, r#"{"query":7}"#, "nope"] {
        let res = send_http(&addr, "POST", "/search", body);
        assert!(res.starts_with("HTTP/1.1 400"), "body {body}: {res}");
        assert_eq!(response_json(&res)["error"], "Query is required");
    }

    let res = send_http(&addr, "POST", "/search", r#"{"query":"rust"}"#);
    assert!(res.starts_with("HTTP/1.1 500"), "{res}");
    let err = response_json(&res)["error"].as_str().expect("error").to_string();
    assert!(err.starts_with("search stage failed"));
    assert!(!err.contains("http-secret-key"));
}

#[test]
fn unknown_routes_and_methods() {
    let (_daemon, addr) = start_daemon();

    assert!(send_http(&addr, "GET", "/nope", "").starts_with("HTTP/1.1 404"));
    assert!(send_http(&addr, "GET", "/search", "").starts_with("HTTP/1.1 405"));
    assert!(send_http(&addr, "DELETE", "/health", "").starts_with("HTTP/1.1 405"));
}
