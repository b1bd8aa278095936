//! Content generator adapters.
//!
//! - **TemplateContentGenerator** - fixed templates with seedable randomness
//! - **MockContentGenerator** - deterministic output for tests

mod mock_content_generator;
mod template_content_generator;

pub use mock_content_generator::MockContentGenerator;
pub use template_content_generator::TemplateContentGenerator;
