pub mod compose;
pub mod error;
pub mod retriever;

pub use compose::{compose, ContextComposer, RetrievalContext};
pub use error::RetrievalError;
pub use retriever::Retriever;
