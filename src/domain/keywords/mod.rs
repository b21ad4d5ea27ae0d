//! Keyword extraction: custom dictionary, tokenizer, TextRank and stop words

mod dictionary;
mod stopwords;
mod textrank;
mod tokenizer;

pub use dictionary::{CustomDictionary, TermIndex, MAX_DICTIONARY_TERMS};
pub use stopwords::{StopWords, DEFAULT_STOP_WORDS};
pub use textrank::KeywordExtractor;
pub use tokenizer::{is_function_word, Tokenizer};
