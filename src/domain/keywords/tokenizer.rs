//! Mixed-script tokenizer
//!
//! Dictionary terms are matched first (longest wins) and emitted whole.
//! The remaining text is split on Unicode word boundaries; runs of CJK
//! characters are cut at common particles, kept whole when short and
//! broken into bigrams when long.

use std::sync::Arc;

use unicode_segmentation::UnicodeSegmentation;

use super::dictionary::CustomDictionary;

/// Longest CJK run emitted as a single token
const MAX_CJK_WORD_LEN: usize = 5;

/// Single-character particles that separate CJK words
const CJK_PARTICLES: &[char] = &[
    '的', '了', '是', '在', '和', '与', '也', '就', '被', '把', '及', '或', '都', '而', '之',
    '其', '为', '这', '那', '着', '过', '从', '对', '将', '等', '由', '于',
];

/// Tokens never useful as keywords
const FUNCTION_WORDS: &[&str] = &[
    "a", "an", "the", "of", "and", "or", "to", "in", "on", "at", "for", "by", "with", "from",
    "is", "are", "was", "were", "be", "been", "it", "its", "this", "that", "these", "those",
    "as", "but", "not", "no", "he", "she", "they", "his", "her", "their", "who", "what",
    "which", "when", "where", "how", "why", "do", "does", "did", "has", "have", "had", "can",
    "will", "would", "also", "than", "then", "there", "here", "about", "into", "more",
    "一个", "没有", "什么", "我们", "你们", "他们", "她们", "它们", "自己", "可以", "因为",
    "所以", "但是", "如果", "已经", "还是", "以及", "进行", "一种",
];

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{3040}'..='\u{30FF}')
}

/// Whether a token is a function word or otherwise not keyword material
pub fn is_function_word(token: &str) -> bool {
    if FUNCTION_WORDS.contains(&token) {
        return true;
    }
    if token.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_alphanumeric())
}

#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    dictionary: Arc<CustomDictionary>,
}

impl Tokenizer {
    pub fn new(dictionary: Arc<CustomDictionary>) -> Self {
        Self { dictionary }
    }

    pub fn dictionary(&self) -> &Arc<CustomDictionary> {
        &self.dictionary
    }

    /// Lowercased tokens in text order
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        let terms = self.dictionary.snapshot();
        let mut tokens = Vec::new();

        let mut plain_start = 0;
        let mut pos = 0;
        while let Some(c) = lower[pos..].chars().next() {
            let matched = terms
                .starting_with(c)
                .iter()
                .find(|term| lower[pos..].starts_with(term.as_str()) && is_bounded(&lower, pos, term));

            match matched {
                Some(term) => {
                    split_plain(&lower[plain_start..pos], &mut tokens);
                    tokens.push(term.clone());
                    pos += term.len();
                    plain_start = pos;
                }
                None => pos += c.len_utf8(),
            }
        }
        split_plain(&lower[plain_start..], &mut tokens);

        tokens
    }
}

/// Latin-edged terms must not start or end inside a word
fn is_bounded(text: &str, pos: usize, term: &str) -> bool {
    let before = text[..pos].chars().next_back();
    let after = text[pos + term.len()..].chars().next();
    let first = term.chars().next();
    let last = term.chars().next_back();

    let joins = |edge: Option<char>, neighbour: Option<char>| {
        matches!((edge, neighbour), (Some(e), Some(n)) if e.is_ascii_alphanumeric() && n.is_alphanumeric() && !is_cjk(n))
    };

    !joins(first, before) && !joins(last, after)
}

fn split_plain(text: &str, tokens: &mut Vec<String>) {
    let mut cjk_run = String::new();

    for segment in text.split_word_bounds() {
        if segment.chars().all(is_cjk) {
            for c in segment.chars() {
                if CJK_PARTICLES.contains(&c) {
                    flush_cjk(&mut cjk_run, tokens);
                } else {
                    cjk_run.push(c);
                }
            }
            continue;
        }

        flush_cjk(&mut cjk_run, tokens);
        if segment.chars().any(char::is_alphanumeric) {
            tokens.push(segment.to_string());
        }
    }

    flush_cjk(&mut cjk_run, tokens);
}

fn flush_cjk(run: &mut String, tokens: &mut Vec<String>) {
    let chars: Vec<char> = run.chars().collect();
    match chars.len() {
        0 => {}
        len if len <= MAX_CJK_WORD_LEN => tokens.push(run.clone()),
        _ => tokens.extend(chars.windows(2).map(|pair| pair.iter().collect::<String>())),
    }
    run.clear();
}
