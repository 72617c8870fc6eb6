//! Interview Store Adapters
//!
//! Implementations of the InterviewStore port.
//!
//! ## Available Adapters
//!
//! - **InMemoryInterviewStore** - Live interviews keyed by interview id
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::InMemoryInterviewStore;
//!
//! let store: Arc<dyn InterviewStore> = Arc::new(InMemoryInterviewStore::new());
//! ```

mod in_memory_interview_store;

pub use in_memory_interview_store::InMemoryInterviewStore;
