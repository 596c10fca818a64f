use std::io::{self, BufReader};
use std::net::{TcpListener, TcpStream};
use std::time::Instant;

use prx_websearch::{SearchAnswer, WebSearchPipeline};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::runtime::Runtime;

use crate::config::ServerConfig;
use crate::protocol::{
    JsonRpcRequest, JsonRpcResponse, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND,
    PARSE_ERROR,
};
use crate::transport::{
    next_inbound, read_http_request, write_frame, write_http_response, HttpRequest,
    HttpResponse, Inbound,
};

const DEFAULT_MCP_PROTOCOL_VERSION: &str = "2024-11-05";
const SEARCH_WEB_TOOL: &str = "search_web";
const REDACTED: &str = "[REDACTED]";

pub struct McpServer {
    pipeline: WebSearchPipeline,
    runtime: Runtime,
    secrets: Vec<String>,
}

impl McpServer {
    pub fn with_pipeline(pipeline: WebSearchPipeline) -> io::Result<Self> {
        Ok(Self {
            pipeline,
            runtime: Runtime::new()?,
            secrets: Vec::new(),
        })
    }

    pub fn from_config(config: &ServerConfig) -> io::Result<Self> {
        let pipeline = config.build_pipeline().map_err(io::Error::other)?;
        Ok(Self::with_pipeline(pipeline)?.redacting(config.secrets()))
    }

    /// Values scrubbed from every diagnostic sent to a client.
    #[must_use]
    pub fn redacting(mut self, secrets: Vec<String>) -> Self {
        self.secrets = secrets.into_iter().filter(|s| !s.is_empty()).collect();
        self
    }

    pub fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                "invalid jsonrpc version",
            ));
        }

        let is_notification = request.id.is_none();
        let id = request.id.clone().unwrap_or(Value::Null);

        if is_notification && request.method == "notifications/initialized" {
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => {
                let protocol_version = request
                    .params
                    .get("protocolVersion")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_MCP_PROTOCOL_VERSION);
                JsonRpcResponse::success(
                    id,
                    json!({
                        "protocolVersion": protocol_version,
                        "serverInfo": {
                            "name": "prx-websearch-mcp",
                            "version": env!("CARGO_PKG_VERSION")
                        },
                        "capabilities": {
                            "tools": {
                                "listChanged": false
                            }
                        }
                    }),
                )
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, tools_list_result()),
            "tools/call" => self.handle_tools_call(id, request.params),
            _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, "method not found"),
        };

        Some(response)
    }

    fn handle_tools_call(&self, id: Value, params: Value) -> JsonRpcResponse {
        let parsed: ToolsCallParams = match serde_json::from_value(params) {
            Ok(v) => v,
            Err(err) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("invalid params: {err}"));
            }
        };

        let start = Instant::now();
        let response = match parsed.name.as_str() {
            SEARCH_WEB_TOOL => self.exec_search_web(id, parsed.arguments),
            _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, "unknown tool"),
        };
        tracing::debug!(
            tool = %parsed.name,
            latency_ms = start.elapsed().as_secs_f64() * 1000.0,
            is_error = response.error.is_some(),
            "tool call finished"
        );
        response
    }

    fn exec_search_web(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let args: SearchWebInput = match parse_args(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };

        match self.search(&args.query) {
            Ok(answer) => JsonRpcResponse::success(
                id,
                json!({
                    "content": [{"type": "text", "text": render_answer_text(&answer)}],
                    "structuredContent": answer
                }),
            ),
            Err(msg) => JsonRpcResponse::success(
                id,
                json!({
                    "content": [{"type": "text", "text": format!("Error searching web: {msg}")}],
                    "isError": true
                }),
            ),
        }
    }

    /// Runs the pipeline to completion. The error string is already redacted.
    fn search(&self, query: &str) -> Result<SearchAnswer, String> {
        self.runtime
            .block_on(self.pipeline.try_answer(query))
            .map_err(|err| {
                tracing::warn!(error = %err, "web search failed");
                sanitize_sensitive(&err.to_string(), &self.secrets)
            })
    }

    pub fn serve_stdio(&self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut reader = stdin.lock();
        let mut stdout = io::stdout().lock();

        while let Some(inbound) = next_inbound(&mut reader)? {
            let (response, frame) = match inbound {
                Inbound::Malformed { reason, frame } => (
                    Some(JsonRpcResponse::error(Value::Null, PARSE_ERROR, reason)),
                    frame,
                ),
                Inbound::Message { payload, frame } => {
                    match serde_json::from_slice::<JsonRpcRequest>(&payload) {
                        Ok(request) => (self.handle_request(request), frame),
                        Err(err) => (
                            Some(JsonRpcResponse::error(
                                Value::Null,
                                PARSE_ERROR,
                                format!("parse error: {err}"),
                            )),
                            frame,
                        ),
                    }
                }
            };
            if let Some(response) = response {
                write_frame(&mut stdout, &response, frame)?;
            }
        }

        Ok(())
    }

    pub fn serve_http(&self, addr: &str) -> io::Result<()> {
        let listener = TcpListener::bind(addr)?;
        tracing::info!(addr = %listener.local_addr()?, "prx-websearch-mcp http listening");
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Err(err) = self.handle_http_connection(&stream) {
                        tracing::warn!(error = %err, "http request error");
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "http accept error");
                }
            }
        }
        Ok(())
    }

    fn handle_http_connection(&self, stream: &TcpStream) -> io::Result<()> {
        let Some(req) = read_http_request(&mut BufReader::new(stream))? else {
            return Ok(());
        };
        let response = self.dispatch_http_request(&req);
        tracing::debug!(
            method = %req.method,
            path = %req.path,
            status = response.status,
            "http request served"
        );
        write_http_response(&mut &*stream, &response)
    }

    fn dispatch_http_request(&self, req: &HttpRequest) -> HttpResponse {
        match (req.method.as_str(), req.path.as_str()) {
            ("GET", "/health") => HttpResponse::json(200, &json!({"status": "ok"})),
            ("POST", "/mcp") => self.http_mcp(&req.body),
            ("POST", "/search") => self.http_search(&req.body),
            (_, "/health" | "/mcp" | "/search") => {
                HttpResponse::json(405, &json!({"error": "method not allowed"}))
            }
            _ => HttpResponse::json(404, &json!({"error": "not found"})),
        }
    }

    fn http_mcp(&self, body: &[u8]) -> HttpResponse {
        let rpc: JsonRpcRequest = match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(err) => {
                let response =
                    JsonRpcResponse::error(Value::Null, PARSE_ERROR, format!("parse error: {err}"));
                return HttpResponse::json(400, &response);
            }
        };
        match self.handle_request(rpc) {
            Some(response) => HttpResponse::json(200, &response),
            None => HttpResponse::empty(202),
        }
    }

    fn http_search(&self, body: &[u8]) -> HttpResponse {
        let query = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|v| v.get("query").and_then(Value::as_str).map(str::to_string))
            .filter(|q| !q.trim().is_empty());
        let Some(query) = query else {
            return HttpResponse::json(400, &json!({"error": "Query is required"}));
        };

        match self.search(&query) {
            Ok(answer) => HttpResponse::json(200, &answer),
            Err(msg) => HttpResponse::json(500, &json!({"error": msg})),
        }
    }
}

/// Markdown rendering used as the tool's text content.
pub fn render_answer_text(answer: &SearchAnswer) -> String {
    let sources = answer
        .results
        .iter()
        .map(|p| format!("- [{}]({})", p.title, p.url))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n\nSources:\n{sources}", answer.summary)
}

fn tools_list_result() -> Value {
    json!({
        "tools": [{
            "name": SEARCH_WEB_TOOL,
            "description": "Search the web with a signed provider query, rerank the hits semantically, and return the relevant summaries with their sources.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    }
                },
                "required": ["query"]
            }
        }]
    })
}

fn with_id(mut response: JsonRpcResponse, id: Value) -> JsonRpcResponse {
    response.id = id;
    response
}

fn parse_args<T: for<'de> Deserialize<'de>>(
    arguments: Option<Value>,
) -> Result<T, JsonRpcResponse> {
    let Some(args) = arguments else {
        return Err(JsonRpcResponse::error(
            Value::Null,
            INVALID_PARAMS,
            "missing tool arguments",
        ));
    };

    serde_json::from_value(args).map_err(|err| {
        JsonRpcResponse::error(
            Value::Null,
            INVALID_PARAMS,
            format!("invalid tool arguments: {err}"),
        )
    })
}

#[derive(Debug, Deserialize)]
struct ToolsCallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SearchWebInput {
    query: String,
}

fn sanitize_sensitive(input: &str, secrets: &[String]) -> String {
    let mut out = input.to_string();
    for secret in secrets.iter().filter(|s| !s.is_empty()) {
        out = out.replace(secret.as_str(), REDACTED);
    }
    for marker in ["key=", "api_key=", "apikey=", "token="] {
        out = redact_query_param(&out, marker);
    }
    out
}

fn redact_query_param(input: &str, marker: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find(marker) {
        let (head, tail) = rest.split_at(pos + marker.len());
        out.push_str(head);
        out.push_str(REDACTED);
        let end = tail
            .find(['&', ' ', '"', '\'', ')', '\n'])
            .unwrap_or(tail.len());
        rest = tail.get(end..).unwrap_or_default();
    }
    out.push_str(rest);
    out
}
