/// Handler module
///
/// This module contains the axum request handlers, one file per resource.
/// Handlers validate the request, call into the repositories and the
/// sourcing engine, and map everything onto [`ApiError`] responses.
///
/// [`ApiError`]: crate::errors::ApiError
mod ai_handlers;
mod flashcard_handlers;
mod novel_handlers;
mod question_handlers;
mod session_handlers;

pub use ai_handlers::*;
pub use flashcard_handlers::*;
pub use novel_handlers::*;
pub use question_handlers::*;
pub use session_handlers::*;
