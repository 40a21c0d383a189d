// Plan generation: prompt construction, output schema, business
// validation, and the service that ties them to the LLM client.

pub mod prompts;
pub mod schema;
pub mod service;
pub mod validation;
