pub mod generator;
pub mod prompts;

pub use generator::*;
pub use prompts::build_prompt;
