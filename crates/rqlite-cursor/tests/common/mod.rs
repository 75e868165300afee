#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use rqlite_cursor::{
    ConnectOptions, Connection, DbError, DbResult, HttpRequest, HttpResponse, Row, Transport, Value,
};

/// Replays canned response bodies in order and records every request.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<(u16, String)>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, body: &str) -> &Self {
        self.respond_with_status(200, body)
    }

    pub fn respond_with_status(&self, status: u16, body: &str) -> &Self {
        self.responses.lock().unwrap().push_back((status, body.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }

    /// Statements carried by the JSON body of a POST.
    pub fn last_statements(&self) -> Vec<String> {
        let body = self.last_request().body.expect("request has no body");
        serde_json::from_str(&body).unwrap()
    }
}

impl Transport for ScriptedTransport {
    fn fetch(&self, request: &HttpRequest) -> DbResult<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| DbError::Transport("connection refused".into()))?;
        Ok(HttpResponse {
            status,
            reason: if status == 200 { "OK" } else { "Error" }.to_string(),
            body,
        })
    }
}

pub fn connect(transport: &ScriptedTransport) -> Connection {
    connect_with(transport, ConnectOptions::default())
}

pub fn connect_with(transport: &ScriptedTransport, options: ConnectOptions) -> Connection {
    Connection::with_transport(options, Box::new(transport.clone()))
}

pub fn row(columns: &[&str], values: Vec<Value>) -> Row {
    let columns: Arc<[String]> = columns.iter().map(|c| c.to_string()).collect();
    Row::new(columns, values)
}
