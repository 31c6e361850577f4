//! Model gateway implementations for toolloop.
//!
//! All gateways implement the `toolloop_core::ModelGateway` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatGateway;
