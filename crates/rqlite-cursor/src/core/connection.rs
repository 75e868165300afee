use std::{fmt, time::Duration};

use crate::{
    core::{
        convert::{Converter, ConverterRegistry, ParseFlags},
        cursor::Cursor,
        transport::{HttpRequest, HttpResponse, HttpTransport, Transport},
        types::Value,
    },
    error::{DbError, DbResult},
};

/// Detect-types bit: pick converters from declared column types.
pub const PARSE_DECLTYPES: u8 = 1;
/// Detect-types bit: pick converters from `name [type]` column names.
pub const PARSE_COLNAMES: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub connect_timeout: Option<Duration>,
    pub timeout: Option<Duration>,
    pub parse_decltypes: bool,
    pub parse_colnames: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            scheme: Scheme::Http,
            host: "localhost".to_string(),
            port: 4001,
            connect_timeout: None,
            timeout: None,
            parse_decltypes: false,
            parse_colnames: false,
        }
    }
}

impl ConnectOptions {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn parse_decltypes(mut self, on: bool) -> Self {
        self.parse_decltypes = on;
        self
    }

    pub fn parse_colnames(mut self, on: bool) -> Self {
        self.parse_colnames = on;
        self
    }

    /// Sets both parse flags from a `PARSE_DECLTYPES | PARSE_COLNAMES` mask.
    pub fn detect_types(mut self, flags: u8) -> Self {
        self.parse_decltypes = flags & PARSE_DECLTYPES != 0;
        self.parse_colnames = flags & PARSE_COLNAMES != 0;
        self
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme.as_str(), self.host, self.port)
    }

    pub fn parse_flags(&self) -> ParseFlags {
        ParseFlags {
            parse_decltypes: self.parse_decltypes,
            parse_colnames: self.parse_colnames,
        }
    }
}

/// A handle on one server. Cursors borrow it; it holds no per-query state.
pub struct Connection {
    options: ConnectOptions,
    transport: Box<dyn Transport>,
    converters: ConverterRegistry,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("options", &self.options)
            .field("converters", &self.converters)
            .finish_non_exhaustive()
    }
}

impl Connection {
    pub fn connect(options: ConnectOptions) -> DbResult<Self> {
        if options.host.trim().is_empty() {
            return Err(DbError::InvalidArgument("host must not be empty".into()));
        }
        let transport = HttpTransport::new(options.base_url(), options.connect_timeout, options.timeout);
        tracing::debug!(url = %transport.base_url(), "connection opened");
        Ok(Self::with_transport(options, Box::new(transport)))
    }

    pub fn with_transport(options: ConnectOptions, transport: Box<dyn Transport>) -> Self {
        Self {
            options,
            transport,
            converters: ConverterRegistry::default(),
        }
    }

    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }

    pub fn parse_decltypes(&self) -> bool {
        self.options.parse_decltypes
    }

    pub fn parse_colnames(&self) -> bool {
        self.options.parse_colnames
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    pub fn register_converter(&mut self, type_name: &str, converter: Converter) {
        self.converters.register(type_name, converter);
    }

    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(self)
    }

    /// Shorthand for `cursor()` followed by `execute`.
    pub fn execute(&self, operation: &str, parameters: Option<&[Value]>) -> DbResult<Cursor<'_>> {
        let mut cursor = self.cursor();
        cursor.execute(operation, parameters)?;
        Ok(cursor)
    }

    pub fn executemany<I, P>(&self, operation: &str, seq_of_parameters: I) -> DbResult<Cursor<'_>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[Value]>,
    {
        let mut cursor = self.cursor();
        cursor.executemany(operation, seq_of_parameters)?;
        Ok(cursor)
    }

    pub fn fetch_response(&self, request: &HttpRequest) -> DbResult<HttpResponse> {
        self.transport.fetch(request)
    }

    /// Every write request already runs in its own server-side transaction.
    pub fn commit(&self) -> DbResult<()> {
        Ok(())
    }

    pub fn rollback(&self) -> DbResult<()> {
        Err(DbError::NotSupported("rollback"))
    }

    pub fn close(self) {
        tracing::debug!(url = %self.options.base_url(), "connection closed");
    }
}
