//! Question Catalog Adapters
//!
//! - **FileQuestionCatalog** - JSON question files under the assets directory
//! - **InMemoryQuestionCatalog** - Fixed questions (testing)

mod file_question_catalog;
mod in_memory_question_catalog;

pub use file_question_catalog::{FileQuestionCatalog, QUESTIONS_DIR, QUESTION_MAPPING_FILE};
pub use in_memory_question_catalog::InMemoryQuestionCatalog;
