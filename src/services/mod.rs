// src/services/mod.rs

//! Service layer for template generation.
//!
//! This module contains the business logic for:
//! - Structure generation through a chat model (`OpenAiGenerator`)
//! - Pattern-based fallback extraction (`FallbackExtractor`)
//! - Field registry normalization (`normalize`)
//! - Provisioning XML rendering (`render_template`)
//! - Schema validation (`XsdValidator`)

pub mod extractor;
pub mod generator;
pub mod normalizer;
pub mod prompt;
pub mod serializer;
pub mod validator;

pub use extractor::FallbackExtractor;
pub use generator::{
    ChatClient, Generated, GenerationSource, ModelChainGenerator, OpenAiClient, OpenAiGenerator,
    StructureGenerator,
};
pub use normalizer::normalize;
pub use serializer::render_template;
pub use validator::{SchemaValidator, ValidationOutcome, XsdValidator};
