pub mod ai;
pub mod flashcard;
pub mod practice;
pub mod question;
pub mod session;
