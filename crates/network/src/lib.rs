//! Network access to the remote story generator
//!
//! The generator receives a base64 photo plus the story so far and returns
//! the next caption. It sits outside the story store: callers take the
//! returned text and hand it to the story service themselves.

mod error;
mod generator;

pub use error::{NetworkError, NetworkResult};
pub use generator::{
    GenerationRequest, GenerationResponse, GeneratorClientConfig, HttpStoryGenerator,
    StoryGenerator,
};
