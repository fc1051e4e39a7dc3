//! Scripted [`HttpTransport`] for exercising the API clients offline.
//!
//! Responses are queued per route, where a route is any substring of the
//! request URL (e.g. `"graphql"` or `"oauth2/token"`). Each request pops the
//! next queued outcome for the first matching route; once a route's queue is
//! empty its sticky fallback (if any) is returned. Every request is recorded.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::port::{HttpRequest, HttpResponse, HttpTransport};

enum Scripted {
    Response(HttpResponse),
    Failure(String),
}

impl Scripted {
    fn materialize(&self) -> Result<HttpResponse> {
        match self {
            Scripted::Response(response) => Ok(response.clone()),
            Scripted::Failure(msg) => Err(Error::Connection(msg.clone())),
        }
    }
}

struct Route {
    pattern: String,
    queue: VecDeque<Scripted>,
    fallback: Option<Scripted>,
}

/// A fake transport with per-route scripted outcomes.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
    latency: Duration,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every outcome by `latency`, so concurrent callers overlap.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue a response for URLs containing `route`.
    pub fn respond(self, route: &str, status: u16, body: impl Into<String>) -> Self {
        self.push(route, Scripted::Response(HttpResponse::new(status, body)))
    }

    /// Queue a response that carries a `Retry-After` hint.
    pub fn respond_with(self, route: &str, response: HttpResponse) -> Self {
        self.push(route, Scripted::Response(response))
    }

    /// Queue a connection failure for URLs containing `route`.
    pub fn fail(self, route: &str, message: &str) -> Self {
        self.push(route, Scripted::Failure(message.to_string()))
    }

    /// Return this response whenever the route's queue is empty.
    pub fn respond_always(self, route: &str, status: u16, body: impl Into<String>) -> Self {
        {
            let mut routes = self.routes.lock();
            let idx = Self::route_index(&mut routes, route);
            routes[idx].fallback = Some(Scripted::Response(HttpResponse::new(status, body)));
        }
        self
    }

    fn push(self, route: &str, outcome: Scripted) -> Self {
        {
            let mut routes = self.routes.lock();
            let idx = Self::route_index(&mut routes, route);
            routes[idx].queue.push_back(outcome);
        }
        self
    }

    fn route_index(routes: &mut Vec<Route>, pattern: &str) -> usize {
        if let Some(idx) = routes.iter().position(|r| r.pattern == pattern) {
            return idx;
        }
        routes.push(Route {
            pattern: pattern.to_string(),
            queue: VecDeque::new(),
            fallback: None,
        });
        routes.len() - 1
    }

    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Requests whose URL contains `route`.
    pub fn requests_to(&self, route: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.contains(route))
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn count_for(&self, route: &str) -> usize {
        self.requests_to(route).len()
    }

    fn next_outcome(&self, url: &str) -> Result<HttpResponse> {
        let mut routes = self.routes.lock();
        let Some(route) = routes.iter_mut().find(|r| url.contains(&r.pattern)) else {
            return Err(Error::Connection(format!("no scripted route for {url}")));
        };
        if let Some(next) = route.queue.pop_front() {
            return next.materialize();
        }
        match &route.fallback {
            Some(fallback) => fallback.materialize(),
            None => Err(Error::Connection(format!("script exhausted for {url}"))),
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        self.requests.lock().push(request);

        let outcome = self.next_outcome(&url);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        outcome
    }
}
