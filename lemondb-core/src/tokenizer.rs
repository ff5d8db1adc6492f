//! Splits raw query text into a flat token sequence.
//!
//! `examples/original_source/src/query/QueryParser.cpp`'s `tokenizeQueryString`
//! does a plain `stream >> tStr` whitespace split with no paren handling at
//! all, which only works because the original's own query text always pads
//! parens with spaces. spec.md §4.5 tightens this into an explicit rule —
//! "(" and ")" are self-delimiting tokens regardless of surrounding
//! whitespace — so this tokenizer splits them off as standalone tokens
//! wherever they occur, everything else is split on runs of whitespace.

/// One lexical token from a query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    LParen,
    RParen,
    Word(String),
}

impl Token {
    pub fn as_word(&self) -> Option<&str> {
        match self {
            Token::Word(w) => Some(w),
            _ => None,
        }
    }
}

/// Tokenizes one query (without its trailing `;`).
pub fn tokenize(query: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    let flush = |current: &mut String, tokens: &mut Vec<Token>| {
        if !current.is_empty() {
            tokens.push(Token::Word(std::mem::take(current)));
        }
    };

    for c in query.chars() {
        match c {
            '(' => {
                flush(&mut current, &mut tokens);
                tokens.push(Token::LParen);
            }
            ')' => {
                flush(&mut current, &mut tokens);
                tokens.push(Token::RParen);
            }
            c if c.is_whitespace() => flush(&mut current, &mut tokens),
            c => current.push(c),
        }
    }
    flush(&mut current, &mut tokens);
    tokens
}
