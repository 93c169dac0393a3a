//! Shared test helpers for integration tests
//!
//! Commands under test talk HTTP, so each test starts a tiny canned-
//! response server on a loopback port and points the binary at it via
//! RAMS_API_URL. The server records every request for assertions.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use assert_cmd::cargo;
use assert_cmd::Command;

/// Helper to get a rams command
pub fn rams() -> Command {
    Command::new(cargo::cargo_bin!("rams"))
}

/// Command preconfigured against a stub server and work order.
pub fn rams_against(server: &StubServer) -> Command {
    let mut cmd = rams();
    cmd.env("RAMS_API_URL", server.url())
        .env("RAMS_WORK_ORDER", "WO-1001");
    cmd
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("recorded body is JSON")
    }
}

#[derive(Debug, Clone)]
pub struct Route {
    pub method: &'static str,
    pub path: String,
    pub status: u16,
    pub body: String,
}

impl Route {
    pub fn json(method: &'static str, path: &str, body: serde_json::Value) -> Self {
        Route {
            method,
            path: path.to_string(),
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn error(method: &'static str, path: &str, status: u16, body: &str) -> Self {
        Route {
            method,
            path: path.to_string(),
            status,
            body: body.to_string(),
        }
    }
}

pub struct StubServer {
    port: u16,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    /// Serve the given routes until the test process exits. Unmatched
    /// requests get a 404 with a recognizable body.
    pub fn start(routes: Vec<Route>) -> StubServer {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let port = listener.local_addr().expect("local addr").port();
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                handle_connection(stream, &routes, &recorded);
            }
        });

        StubServer { port, requests }
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// Requests matching a method + path, for payload assertions.
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == method && request.path == path)
            .collect()
    }
}

fn handle_connection(
    stream: TcpStream,
    routes: &[Route],
    recorded: &Arc<Mutex<Vec<RecordedRequest>>>,
) {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(path)) = (parts.next(), parts.next()) else {
        return;
    };
    let method = method.to_string();
    let path = path.to_string();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).is_err() || line.trim().is_empty() {
            break;
        }
        if let Some(value) = line.to_lowercase().strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }

    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        let _ = reader.read_exact(&mut body);
    }
    recorded.lock().expect("requests lock").push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let (status, payload) = routes
        .iter()
        .find(|route| route.method == method && route.path == path)
        .map(|route| (route.status, route.body.clone()))
        .unwrap_or((404, format!("no stub route for {} {}", method, path)));

    let reason = match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "OK",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status,
        reason,
        payload.len(),
        payload
    );
    let mut stream = reader.into_inner();
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

// Canned catalog fixtures matching the backend's JSON shapes.

pub fn hazard_json(id: i64, name: &str, category: &str, requires_parameter: bool) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "category": category,
        "description": format!("{} description", name),
        "default_likelihood": 3,
        "default_severity": 4,
        "requires_parameter": requires_parameter,
        "parameter_label": if requires_parameter { serde_json::json!("Load weight") } else { serde_json::Value::Null },
        "parameter_unit": if requires_parameter { serde_json::json!("kg") } else { serde_json::Value::Null },
    })
}

pub fn control_json(id: i64, name: &str, category: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "category": category,
        "description": "",
        "effectiveness": 2,
        "requires_parameter": false,
        "parameter_label": serde_json::Value::Null,
        "parameter_unit": serde_json::Value::Null,
        "reference": serde_json::Value::Null,
    })
}

pub fn band_json(label: &str, min: u8, max: u8) -> serde_json::Value {
    serde_json::json!({
        "id": serde_json::Value::Null,
        "label": label,
        "color": "#cccccc",
        "guidance": serde_json::Value::Null,
        "min_score": min,
        "max_score": max,
    })
}

pub fn standard_bands() -> serde_json::Value {
    serde_json::json!([
        band_json("LOW", 1, 5),
        band_json("MED", 6, 15),
        band_json("HIGH", 16, 25),
    ])
}

pub fn task_json(id: i64, sequence: i64, activity: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "sequence": sequence,
        "activity": activity,
        "hazard_description": serde_json::Value::Null,
        "personnel_at_risk": "",
        "existing_controls_summary": serde_json::Value::Null,
        "additional_controls_summary": serde_json::Value::Null,
        "likelihood": 3,
        "severity": 4,
        "risk_score": 12,
        "risk_category": serde_json::Value::Null,
        "controls": {"existing": [], "additional": []},
        "hazards": [],
        "target_completion_date": serde_json::Value::Null,
        "residual_likelihood": 1,
        "residual_severity": 1,
        "residual_risk_score": 1,
        "residual_risk_category": serde_json::Value::Null,
        "notes": serde_json::Value::Null,
    })
}

pub fn work_order_json(number: &str, title: &str) -> serde_json::Value {
    serde_json::json!({
        "id": 1,
        "number": number,
        "title": title,
        "description": serde_json::Value::Null,
    })
}

/// Routes for the four catalog fetches with a small standard catalog.
pub fn catalog_routes() -> Vec<Route> {
    vec![
        Route::json(
            "GET",
            "/api/catalog/hazards",
            serde_json::json!({"hazards": [
                hazard_json(1, "Manual handling", "Manual Handling", true),
                hazard_json(2, "Live electrical conductors", "Electrical", false),
            ]}),
        ),
        Route::json(
            "GET",
            "/api/catalog/controls",
            serde_json::json!({"controls": [
                control_json(10, "Lock-out tag-out", "Electrical Isolation"),
                control_json(11, "Permit to Work", "Procedural"),
            ]}),
        ),
        Route::json(
            "GET",
            "/api/catalog/personnel",
            serde_json::json!({"personnel": [
                {"id": 1, "name": "Electrician", "description": ""},
                {"id": 2, "name": "Supervisor", "description": ""},
            ]}),
        ),
        Route::json(
            "GET",
            "/api/risk-matrix",
            serde_json::json!({"risk_categories": standard_bands()}),
        ),
    ]
}
