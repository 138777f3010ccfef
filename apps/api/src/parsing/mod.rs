// Annotation parsing: blob decoding, phrase extraction, vocabulary discovery.

pub mod literal;
pub mod response_parser;
pub mod vocabulary;
