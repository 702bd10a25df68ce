//! GraphQL-over-HTTP client with an in-memory response cache
//!
//! Uncached queries run on background threads and report back through a
//! channel that the UI drains on every tick. Results are stored under the key
//! they were issued with, so a late answer for stale variables never shows up
//! under the current ones.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use url::Url;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Network failure, non-success HTTP status, or an unreadable body
    #[error("transport error: {0}")]
    Transport(String),
    /// The server answered with an `errors` payload or without `data`
    #[error("graphql error: {}", .0.join("; "))]
    GraphQL(Vec<String>),
    /// Variables could not be encoded
    #[error("failed to encode variables: {0}")]
    Encode(String),
    /// `data` did not have the expected shape
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        QueryError::Transport(err.to_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Requests & Responses
// ═══════════════════════════════════════════════════════════════════════════════

/// A query document with its variables, as sent on the wire
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQLRequest {
    pub query: &'static str,
    pub variables: Value,
}

impl GraphQLRequest {
    pub fn new<V: Serialize>(query: &'static str, variables: &V) -> Result<Self, QueryError> {
        let variables =
            serde_json::to_value(variables).map_err(|e| QueryError::Encode(e.to_string()))?;
        Ok(Self { query, variables })
    }

    /// Cache identity: document plus canonical variables
    pub fn cache_key(&self) -> CacheKey {
        // serde_json objects are sorted maps, so the rendering is canonical
        CacheKey(format!("{}\n{}", self.query, self.variables))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

#[derive(Debug, Deserialize)]
struct GraphQLErrorMessage {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphQLResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQLErrorMessage>,
}

impl GraphQLResponse {
    /// Errors win over partial data
    fn into_data(self) -> Result<Value, QueryError> {
        if !self.errors.is_empty() {
            return Err(QueryError::GraphQL(
                self.errors.into_iter().map(|e| e.message).collect(),
            ));
        }
        match self.data {
            Some(Value::Null) | None => Err(QueryError::GraphQL(vec![
                "response carried no data".to_string(),
            ])),
            Some(data) => Ok(data),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Transport
// ═══════════════════════════════════════════════════════════════════════════════

/// Executes one request and returns the response's `data` member
pub trait Transport: Send + Sync {
    fn execute(&self, request: &GraphQLRequest) -> Result<Value, QueryError>;
}

/// POSTs JSON requests to a single GraphQL endpoint
pub struct HttpTransport {
    http: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: Client::new(),
            endpoint,
        }
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &GraphQLRequest) -> Result<Value, QueryError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()?
            .error_for_status()?;
        let body: GraphQLResponse = response.json()?;
        body.into_data()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Query Client
// ═══════════════════════════════════════════════════════════════════════════════

/// Observed state of one query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<'a> {
    Loading,
    Error(&'a QueryError),
    Data(&'a Value),
}

/// Result of a background query, tagged with the key it was issued under
struct QueryMessage {
    key: CacheKey,
    result: Result<Value, QueryError>,
}

pub struct QueryClient {
    transport: Arc<dyn Transport>,
    sender: Sender<QueryMessage>,
    receiver: Receiver<QueryMessage>,
    cache: HashMap<CacheKey, Value>,
    errors: HashMap<CacheKey, QueryError>,
    in_flight: HashSet<CacheKey>,
}

impl QueryClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            transport,
            sender,
            receiver,
            cache: HashMap::new(),
            errors: HashMap::new(),
            in_flight: HashSet::new(),
        }
    }

    /// Make sure a result for `request` exists or is on its way
    ///
    /// Cached results and in-flight requests are left alone. A recorded
    /// failure is dropped and the query is issued again.
    pub fn fetch(&mut self, request: &GraphQLRequest) -> CacheKey {
        let key = request.cache_key();
        if self.cache.contains_key(&key) || self.in_flight.contains(&key) {
            tracing::trace!(?key, "query already resolved or in flight");
            return key;
        }
        if self.errors.remove(&key).is_some() {
            tracing::debug!(?key, "retrying failed query");
        }
        self.spawn(key.clone(), request.clone());
        key
    }

    /// Drop whatever is known about `request` and execute it again
    pub fn refetch(&mut self, request: &GraphQLRequest) -> CacheKey {
        let key = request.cache_key();
        self.cache.remove(&key);
        self.errors.remove(&key);
        if !self.in_flight.contains(&key) {
            self.spawn(key.clone(), request.clone());
        }
        key
    }

    /// Drain finished queries, returns true if any state changed
    pub fn poll(&mut self) -> bool {
        let mut had_updates = false;

        while let Ok(QueryMessage { key, result }) = self.receiver.try_recv() {
            had_updates = true;
            self.in_flight.remove(&key);
            match result {
                Ok(data) => {
                    self.errors.remove(&key);
                    self.cache.insert(key, data);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "query failed");
                    self.errors.insert(key, err);
                }
            }
        }

        had_updates
    }

    pub fn state(&self, key: &CacheKey) -> QueryState<'_> {
        if let Some(data) = self.cache.get(key) {
            QueryState::Data(data)
        } else if let Some(err) = self.errors.get(key) {
            QueryState::Error(err)
        } else {
            QueryState::Loading
        }
    }

    fn spawn(&mut self, key: CacheKey, request: GraphQLRequest) {
        tracing::debug!(variables = %request.variables, "issuing query");
        self.in_flight.insert(key.clone());

        let transport = Arc::clone(&self.transport);
        let tx = self.sender.clone();
        thread::spawn(move || {
            let result = transport.execute(&request);
            // The client may be gone at shutdown
            let _ = tx.send(QueryMessage { key, result });
        });
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Test Support
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    type Handler = dyn Fn(&GraphQLRequest) -> Result<Value, QueryError> + Send + Sync;

    /// In-process transport that answers with a closure and records requests
    pub(crate) struct FakeTransport {
        handler: Box<Handler>,
        pub(crate) requests: Mutex<Vec<GraphQLRequest>>,
    }

    impl FakeTransport {
        pub(crate) fn new(
            handler: impl Fn(&GraphQLRequest) -> Result<Value, QueryError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                handler: Box::new(handler),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub(crate) fn recorded(&self) -> Vec<GraphQLRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for FakeTransport {
        fn execute(&self, request: &GraphQLRequest) -> Result<Value, QueryError> {
            self.requests.lock().unwrap().push(request.clone());
            (self.handler)(request)
        }
    }

    /// Poll until no query is in flight
    pub(crate) fn settle(client: &mut QueryClient) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !client.in_flight.is_empty() {
            client.poll();
            assert!(Instant::now() < deadline, "queries did not settle");
            thread::sleep(Duration::from_millis(2));
        }
        client.poll();
    }
}
