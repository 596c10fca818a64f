use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStdout, Command, Stdio};

use serde_json::{json, Value};

// Port 1 refuses connections, so tool calls fail fast without network access.
const UNREACHABLE: &str = "http://127.0.0.1:1";

fn spawn_daemon() -> Child {
    Command::new(env!("CARGO_BIN_EXE_prx-websearchd"))
        .env("PRX_WEBSEARCHD_TRANSPORT", "stdio")
        .env("PRX_SEARCH_ENDPOINT", UNREACHABLE)
        .env("PRX_RERANK_ENDPOINT", UNREACHABLE)
        .env("TENCENT_SECRET_ID", "AKIDSTDIO")
        .env("TENCENT_SECRET_KEY", "stdio-secret-key")
        .env("BOCHA_API_KEY", "sk-stdio")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn prx-websearchd")
}

fn read_line_json(reader: &mut BufReader<ChildStdout>) -> Value {
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    serde_json::from_str(&line).expect("parse response json")
}

#[test]
fn line_delimited_session_works() {
    let mut child = spawn_daemon();
    let mut stdin = child.stdin.take().expect("stdin");
    let mut reader = BufReader::new(child.stdout.take().expect("stdout"));

    let init = json!({"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05"}});
    writeln!(stdin, "{init}").expect("write initialize");
    let res = read_line_json(&mut reader);
    assert_eq!(res["id"], 1);
    assert_eq!(res["result"]["serverInfo"]["name"], "prx-websearch-mcp");

    // No reply expected; the next line read must belong to tools/list.
    writeln!(stdin, r#"{{"jsonrpc":"2.0","method":"notifications/initialized"}}"#)
        .expect("write notification");
    writeln!(stdin, r#"{{"jsonrpc":"2.0","id":2,"method":"tools/list"}}"#).expect("write list");
    let res = read_line_json(&mut reader);
    assert_eq!(res["id"], 2);
    assert_eq!(res["result"]["tools"][0]["name"], "search_web");

    writeln!(stdin, "not json").expect("write garbage");
    let res = read_line_json(&mut reader);
    assert_eq!(res["error"]["code"], -32700);

    let call = json!({"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"search_web","arguments":{"query":"rust"}}});
    writeln!(stdin, "{call}").expect("write call");
    let res = read_line_json(&mut reader);
    assert_eq!(res["id"], 3);
    assert_eq!(res["result"]["isError"], true);
    let text = res["result"]["content"][0]["text"].as_str().expect("text");
    assert!(text.starts_with("Error searching web:"));
    assert!(!text.contains("stdio-secret-key"));

    drop(stdin);
    let status = child.wait().expect("wait child");
    assert!(status.success());
}

fn write_framed(stdin: &mut std::process::ChildStdin, payload: &Value) {
    let body = serde_json::to_vec(payload).expect("serialize payload");
    let frame = format!("Content-Length: {}\r\n\r\n", body.len());
    stdin.write_all(frame.as_bytes()).expect("write frame header");
    stdin.write_all(&body).expect("write frame body");
    stdin.flush().expect("flush frame");
}

fn read_framed(reader: &mut BufReader<ChildStdout>) -> Value {
    let mut content_length: Option<usize> = None;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("read frame header");
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            break;
        }
        if let Some((name, value)) = trimmed.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().ok();
            }
        }
    }
    let mut body = vec![0_u8; content_length.expect("content-length")];
    reader.read_exact(&mut body).expect("read frame body");
    serde_json::from_slice(&body).expect("parse framed json")
}

#[test]
fn content_length_frames_are_answered_in_kind() {
    let mut child = spawn_daemon();
    let mut stdin = child.stdin.take().expect("stdin");
    let mut reader = BufReader::new(child.stdout.take().expect("stdout"));

    write_framed(
        &mut stdin,
        &json!({"jsonrpc":"2.0","id":"a","method":"initialize","params":{}}),
    );
    let res = read_framed(&mut reader);
    assert_eq!(res["id"], "a");
    assert_eq!(res["result"]["protocolVersion"], "2024-11-05");

    write_framed(&mut stdin, &json!({"jsonrpc":"2.0","id":"b","method":"ping"}));
    let res = read_framed(&mut reader);
    assert_eq!(res["id"], "b");
    assert_eq!(res["result"], json!({}));

    drop(stdin);
    let status = child.wait().expect("wait child");
    assert!(status.success());
}
