//! PDF object library: object values, dictionaries, the tokenizer and the
//! in-memory document the model is built over

mod object;
mod dict;
mod parser;
mod document;

pub use object::{DataType, Object, ObjectRef};
pub use dict::Dictionary;
pub use parser::{parse_document, parse_object, Lexer, Token, MAX_NESTING_DEPTH};
pub use document::{Document, ObjectId, ObjectRoot, PathStep};
