//! Client side of the inference proxy: request payloads, the HTTP backend and
//! the response formatter.

pub mod client;
pub mod formatter;
pub mod mock;
pub mod request;

pub use client::{DEFAULT_API_BASE, HttpInferenceClient, InferenceBackend};
pub use formatter::{DecodedResponse, LabelScore, SentimentDecode, decode, format_response};
pub use request::{GenerationParams, InferencePayload, InferenceRequest};
