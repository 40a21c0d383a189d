pub mod content;
pub mod plan;
pub mod request;
