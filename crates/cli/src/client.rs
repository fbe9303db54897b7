//! HTTP embedding client for Ollama-compatible `/api/embed` endpoints.

use anndb_core::{Embedder, Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f64>>,
}

/// Blocking client against an Ollama-style embedding endpoint.
#[derive(Clone)]
pub struct OllamaClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
}

impl OllamaClient {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }
}

impl Embedder for OllamaClient {
    fn embed(&self, text: &str) -> Result<Vec<f64>> {
        let request = EmbedRequest {
            model: &self.model,
            input: vec![text],
        };
        let response = self
            .http
            .post(format!("{}/api/embed", self.endpoint))
            .json(&request)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| Error::Embedding(e.to_string()))?;
        let payload: EmbedResponse = response
            .json()
            .map_err(|e| Error::Embedding(format!("malformed embed response: {e}")))?;
        payload
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("response contained no embeddings".into()))
    }
}
