mod client;

pub use client::{CohereClient, GenerateRequest, GenerateResponse, Generation};
