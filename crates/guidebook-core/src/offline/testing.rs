//! Scripted in-memory network for controller and loader tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{Fetch, FetchError, Request, Response, ResponseSource};

#[derive(Debug, Clone)]
enum Outcome {
    Respond { status: u16, body: Vec<u8> },
    Fail,
}

#[derive(Debug, Clone)]
struct Scripted {
    outcome: Outcome,
    delay: Duration,
}

/// Answers each URL with a scripted outcome, optionally after a delay.
/// Unscripted URLs fail with `FetchError::NoResponse`.
#[derive(Default)]
pub(crate) struct ScriptedFetch {
    script: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedFetch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, url: &str, status: u16, body: &str) {
        self.respond_after(url, Duration::ZERO, status, body);
    }

    pub(crate) fn respond_after(&self, url: &str, delay: Duration, status: u16, body: &str) {
        self.set(
            url,
            Scripted {
                outcome: Outcome::Respond {
                    status,
                    body: body.as_bytes().to_vec(),
                },
                delay,
            },
        );
    }

    pub(crate) fn fail(&self, url: &str) {
        self.set(
            url,
            Scripted {
                outcome: Outcome::Fail,
                delay: Duration::ZERO,
            },
        );
    }

    pub(crate) fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    fn set(&self, url: &str, scripted: Scripted) {
        self.script.lock().unwrap().insert(url.to_string(), scripted);
    }
}

#[async_trait]
impl Fetch for ScriptedFetch {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let url = request.url.to_string();
        *self.calls.lock().unwrap().entry(url.clone()).or_default() += 1;
        let scripted = self.script.lock().unwrap().get(&url).cloned();

        let Some(scripted) = scripted else {
            return Err(FetchError::no_response(url));
        };
        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }

        match scripted.outcome {
            Outcome::Respond { status, body } => Ok(Response {
                url,
                status,
                content_type: None,
                body,
                source: ResponseSource::Network,
            }),
            Outcome::Fail => Err(FetchError::Offline),
        }
    }
}
