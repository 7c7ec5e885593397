pub mod cached_batch;
pub mod flashcard;
pub mod json_value;
pub mod novel;
pub mod question;
pub mod session;

pub use cached_batch::CachedBatch;
pub use flashcard::{Flashcard, FlashcardSource};
pub use json_value::JsonValue;
pub use novel::Novel;
pub use question::Question;
pub use session::Session;
