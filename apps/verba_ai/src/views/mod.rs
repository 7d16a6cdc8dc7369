pub mod grammar_check;
