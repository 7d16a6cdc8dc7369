pub mod chat_completion;
pub mod grammar_check;
