use std::{fmt, io::Read, time::Duration};

use crate::error::{DbError, DbResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request against the server. `path` may carry a literal query string
/// (`/db/execute?transaction`); `query` pairs are URL-encoded by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: String) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn query_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

/// Sends a request and returns the response, whatever its status.
pub trait Transport: Send + Sync {
    fn fetch(&self, request: &HttpRequest) -> DbResult<HttpResponse>;
}

/// Blocking HTTP transport over a `ureq` agent.
pub struct HttpTransport {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, connect_timeout: Option<Duration>, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(t) = connect_timeout {
            builder = builder.timeout_connect(t);
        }
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Self {
            agent: builder.build(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, request: &HttpRequest) -> DbResult<HttpResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut req = self.agent.request(request.method.as_str(), &url);
        for (k, v) in &request.query {
            req = req.query(k, v);
        }
        for (k, v) in &request.headers {
            req = req.set(k, v);
        }

        let result = match &request.body {
            Some(body) => req.send_string(body),
            None => req.call(),
        };
        // Statement failures come back in the body; keep non-2xx responses readable.
        let response = match result {
            Ok(r) => r,
            Err(ureq::Error::Status(_, r)) => r,
            Err(ureq::Error::Transport(t)) => return Err(DbError::from(t)),
        };

        let status = response.status();
        let reason = response.status_text().to_string();
        // `into_string` caps bodies at 10 MB; result sets may be larger.
        let mut body = String::new();
        response.into_reader().read_to_string(&mut body)?;
        Ok(HttpResponse { status, reason, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_request_builders() {
        let r = HttpRequest::get("/db/query").query_param("q", "SELECT 1");
        assert_eq!(r.method, Method::Get);
        assert_eq!(r.query_value("q"), Some("SELECT 1"));
        assert_eq!(r.body, None);

        let r = HttpRequest::post("/db/execute?transaction", "[]".into())
            .header("Content-Type", "application/json");
        assert_eq!(r.method.to_string(), "POST");
        assert_eq!(r.headers, vec![("Content-Type".to_string(), "application/json".to_string())]);
    }

    #[rstest]
    fn test_base_url_trailing_slash_is_dropped() {
        let t = HttpTransport::new("http://localhost:4001/", None, None);
        assert_eq!(t.base_url(), "http://localhost:4001");
    }
}
