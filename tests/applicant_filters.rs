use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tiny_http::{Method, Response, Server, StatusCode};

const TOKEN: &str = "applicants-token";

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_admitd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn admitd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().expect("result")
}

fn row_names(view: &serde_json::Value) -> Vec<String> {
    view["rows"]
        .as_array()
        .expect("rows")
        .iter()
        .map(|r| r["firstName"].as_str().expect("firstName").to_string())
        .collect()
}

fn spawn_stub() -> (String, Arc<AtomicBool>, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let base = format!("http://{}", server.server_addr());
    let done = Arc::new(AtomicBool::new(false));
    let done_thread = Arc::clone(&done);

    // One applicant per GPA band plus one with no GPA at all.
    let body = json!({
        "meta": { "page": 1, "limit": 100, "total": 5 },
        "data": [
            { "id": "a-1", "firstName": "Daniel", "lastName": "Okafor",
              "email": "daniel.okafor@example.edu", "gpa": 3.9,
              "registered": true, "cohortId": "c-1" },
            { "id": "a-2", "firstName": "Rachel", "lastName": "Lindt",
              "email": "rachel.lindt@example.edu", "gpa": 3.2,
              "registered": false, "cohortId": "c-1" },
            { "id": "a-3", "firstName": "Amanda", "lastName": "Reyes",
              "email": "amanda.reyes@example.edu", "gpa": 2.7,
              "registered": true, "cohortId": "c-2" },
            { "id": "a-4", "firstName": "Brett", "lastName": "Zane",
              "email": "brett.zane@example.edu", "gpa": 2.1,
              "registered": false },
            { "id": "a-5", "firstName": "Noor", "lastName": "Kassim",
              "email": "noor.kassim@example.edu",
              "registered": true, "cohortId": "c-2" },
        ]
    });

    let handle = thread::spawn(move || loop {
        let req = match server.recv_timeout(Duration::from_millis(100)) {
            Ok(Some(req)) => req,
            Ok(None) => {
                if done_thread.load(Ordering::Relaxed) {
                    break;
                }
                continue;
            }
            Err(_) => break,
        };

        let path = req.url().split('?').next().unwrap_or("").to_string();
        if req.method() == &Method::Get && path == "/api/admissions/applicants" {
            let _ = req.respond(Response::from_data(body.to_string().into_bytes()));
        } else {
            let _ = req.respond(Response::empty(StatusCode(404)));
        }
    });

    (base, done, handle)
}

#[test]
fn applicant_search_filters_and_stats() {
    let (base, done, handle) = spawn_stub();
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "setup-1",
        "backend.connect",
        json!({ "adminUrl": base, "newsUrl": base }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "setup-2",
        "session.login",
        json!({ "token": TOKEN, "user": { "name": "Omar", "role": "STAFF" } }),
    );

    let view = request_ok(&mut stdin, &mut reader, "1", "applicants.open", json!({}));
    assert_eq!(view["page"]["totalItems"], 5);
    assert_eq!(view["stats"]["total"], 5);
    assert_eq!(view["stats"]["registered"], 3);
    assert_eq!(view["stats"]["unregistered"], 2);
    assert_eq!(view["stats"]["gpa"]["excellent"], 1);
    assert_eq!(view["stats"]["gpa"]["good"], 1);
    assert_eq!(view["stats"]["gpa"]["average"], 1);
    assert_eq!(view["stats"]["gpa"]["belowAverage"], 1);
    assert_eq!(view["stats"]["gpa"]["unrated"], 1);

    // Substring, not prefix: "da" finds Amanda as well as Daniel.
    let view = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "applicants.search",
        json!({ "term": "da" }),
    );
    assert_eq!(row_names(&view), vec!["Daniel", "Amanda"]);

    // Dimensions stack on top of the search term.
    let view = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "applicants.filter",
        json!({ "registered": true, "cohort": "c-1" }),
    );
    assert_eq!(row_names(&view), vec!["Daniel"]);

    // "ALL" clears a dimension the same way omitting it does.
    let view = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "applicants.filter",
        json!({ "registered": "ALL" }),
    );
    assert_eq!(row_names(&view), vec!["Daniel", "Amanda"]);

    let view = request_ok(&mut stdin, &mut reader, "5", "applicants.search", json!({ "term": "" }));
    assert_eq!(view["page"]["totalItems"], 5);

    let view = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "applicants.filter",
        json!({ "registered": false }),
    );
    assert_eq!(row_names(&view), vec!["Rachel", "Brett"]);
    // Stats ignore the active filters.
    assert_eq!(view["stats"]["registered"], 3);

    let resp = request(
        &mut stdin,
        &mut reader,
        "7",
        "applicants.filter",
        json!({ "registered": 42 }),
    );
    assert_eq!(resp["error"]["code"], "bad_params");

    let resp = request(
        &mut stdin,
        &mut reader,
        "8",
        "applicants.pageSize",
        json!({ "size": 7 }),
    );
    assert_eq!(resp["error"]["code"], "bad_params");
    let message = resp["error"]["message"].as_str().expect("message");
    assert!(message.contains("itemsPerPage"), "got: {}", message);

    let resp = request(&mut stdin, &mut reader, "9", "applicants.page", json!({}));
    assert_eq!(resp["error"]["code"], "bad_params");

    drop(stdin);
    let _ = child.wait();
    done.store(true, Ordering::Relaxed);
    handle.join().expect("stub server thread");
}
