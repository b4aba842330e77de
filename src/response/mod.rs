//! Prompt-to-response pipeline over an external text-generation CLI.

pub mod invocation;
pub mod pipeline;

pub use invocation::{build_invocation, serialize_conversation, Invocation};
pub use pipeline::{
    get_response, get_response_with, ResponseCommand, ResponseEvent, ResponseOutcome,
    ResponsePipeline, GENERATION_TIMEOUT,
};
