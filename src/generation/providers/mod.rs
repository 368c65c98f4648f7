pub mod endpoint;
pub mod openai;

pub use endpoint::EndpointGenerator;
pub use openai::OpenAiGenerator;
