//! Raw query text → [`Query`] via a three-link responsibility chain.
//!
//! Grounded on `examples/original_source/src/query/QueryBuilders.cpp`'s
//! `DebugQueryBuilder` → `ManageTableQueryBuilder` → `ComplexQueryBuilder`
//! chain: each link is tried in order and either matches the leading
//! operator keyword and fully parses the query, or declines so the next
//! link gets a turn. A query whose keyword no link recognizes fails with
//! [`QueryBuildError::NoMatchingBuilder`]; a recognized keyword with
//! malformed operands fails with [`QueryBuildError::IllFormed`].

use crate::condition::{Op, RawCondition};
use crate::error::QueryBuildError;
use crate::query::Query;
use crate::tokenizer::{tokenize, Token};
use crate::value::parse_int_literal;

/// Tokenizes and builds one query (text without the trailing `;`).
pub fn build_query(raw: &str) -> Result<Query, QueryBuildError> {
    let tokens = tokenize(raw);
    let mut cursor = Cursor::new(&tokens, raw);

    for link in [debug_link, manage_table_link, complex_link] {
        cursor.reset();
        if let Some(result) = link(&mut cursor) {
            return result;
        }
    }
    Err(QueryBuildError::NoMatchingBuilder(raw.trim().to_string()))
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    raw: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token], raw: &'a str) -> Self {
        Self { tokens, pos: 0, raw }
    }

    fn reset(&mut self) {
        self.pos = 0;
    }

    fn peek_word(&self) -> Option<&str> {
        self.tokens.get(self.pos).and_then(Token::as_word)
    }

    fn bump_word(&mut self) -> Result<String, QueryBuildError> {
        match self.tokens.get(self.pos) {
            Some(Token::Word(w)) => {
                self.pos += 1;
                Ok(w.clone())
            }
            _ => Err(self.ill_formed("expected an identifier")),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn eat_lparen(&mut self) -> Result<(), QueryBuildError> {
        match self.tokens.get(self.pos) {
            Some(Token::LParen) => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.ill_formed("expected '('")),
        }
    }

    fn eat_rparen(&mut self) -> Result<(), QueryBuildError> {
        match self.tokens.get(self.pos) {
            Some(Token::RParen) => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.ill_formed("expected ')'")),
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_word() == Some(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Parses a `'(' word* ')'` group into its inner words.
    fn paren_words(&mut self) -> Result<Vec<String>, QueryBuildError> {
        self.eat_lparen()?;
        let mut words = Vec::new();
        while !matches!(self.tokens.get(self.pos), Some(Token::RParen) | None) {
            words.push(self.bump_word()?);
        }
        self.eat_rparen()?;
        Ok(words)
    }

    /// Like [`Cursor::paren_words`], but the whole group is optional: per
    /// spec.md's grammar the `'(' arg* ')'` group may be omitted for any
    /// operator, not only the zero-operand ones. Returns an empty list when
    /// the next token isn't `(`.
    fn optional_paren_words(&mut self) -> Result<Vec<String>, QueryBuildError> {
        if matches!(self.tokens.get(self.pos), Some(Token::LParen)) {
            self.paren_words()
        } else {
            Ok(Vec::new())
        }
    }

    /// Parses zero or more `'(' field op literal ')'` clauses.
    fn conditions(&mut self) -> Result<Vec<RawCondition>, QueryBuildError> {
        let mut conds = Vec::new();
        while matches!(self.tokens.get(self.pos), Some(Token::LParen)) {
            self.eat_lparen()?;
            let field = self.bump_word()?;
            let op_token = self.bump_word()?;
            let op = Op::parse(&op_token)
                .map_err(|_| self.ill_formed(&format!("\"{op_token}\" is not a valid operator")))?;
            let literal = self.bump_word()?;
            self.eat_rparen()?;
            conds.push(RawCondition { field, op, literal });
        }
        Ok(conds)
    }

    /// Parses an optional `WHERE cond+` tail; returns an empty list if absent.
    fn optional_where(&mut self) -> Result<Vec<RawCondition>, QueryBuildError> {
        if self.eat_keyword("WHERE") {
            let conds = self.conditions()?;
            if conds.is_empty() {
                return Err(self.ill_formed("WHERE requires at least one condition"));
            }
            Ok(conds)
        } else {
            Ok(Vec::new())
        }
    }

    fn expect_from_table(&mut self) -> Result<String, QueryBuildError> {
        if !self.eat_keyword("FROM") {
            return Err(self.ill_formed("expected FROM <table>"));
        }
        self.bump_word()
    }

    fn finish(&self) -> Result<(), QueryBuildError> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.ill_formed("unexpected trailing tokens"))
        }
    }

    fn ill_formed(&self, reason: &str) -> QueryBuildError {
        QueryBuildError::IllFormed(format!("{reason} in \"{}\"", self.raw.trim()))
    }
}

type LinkResult = Option<Result<Query, QueryBuildError>>;

fn debug_link(c: &mut Cursor) -> LinkResult {
    match c.peek_word() {
        Some("LIST") => Some((|| {
            c.pos += 1;
            c.finish()?;
            Ok(Query::List)
        })()),
        Some("QUIT") => Some((|| {
            c.pos += 1;
            c.finish()?;
            Ok(Query::Quit)
        })()),
        Some("SHOWTABLE") => Some((|| {
            c.pos += 1;
            let table = c.bump_word()?;
            c.finish()?;
            Ok(Query::ShowTable { table })
        })()),
        _ => None,
    }
}

fn manage_table_link(c: &mut Cursor) -> LinkResult {
    match c.peek_word() {
        Some("LOAD") => Some((|| {
            c.pos += 1;
            let path = c.bump_word()?;
            c.finish()?;
            Ok(Query::Load { path })
        })()),
        Some("DROP") => Some((|| {
            c.pos += 1;
            let table = c.bump_word()?;
            c.finish()?;
            Ok(Query::Drop { table })
        })()),
        Some("TRUNCATE") => Some((|| {
            c.pos += 1;
            let table = c.bump_word()?;
            c.finish()?;
            Ok(Query::Truncate { table })
        })()),
        Some("DUMP") => Some((|| {
            c.pos += 1;
            let table = c.bump_word()?;
            let path = c.bump_word()?;
            c.finish()?;
            Ok(Query::Dump { table, path })
        })()),
        Some("COPYTABLE") => Some((|| {
            c.pos += 1;
            let src = c.bump_word()?;
            let dst = c.bump_word()?;
            c.finish()?;
            Ok(Query::CopyTable { src, dst })
        })()),
        Some("LISTEN") => Some((|| {
            c.pos += 1;
            let path = if matches!(c.tokens.get(c.pos), Some(Token::LParen)) {
                let mut words = c.paren_words()?;
                if words.len() != 1 {
                    return Err(c.ill_formed("LISTEN takes exactly one path"));
                }
                words.remove(0)
            } else {
                c.bump_word()?
            };
            c.finish()?;
            Ok(Query::Listen { path })
        })()),
        _ => None,
    }
}

fn complex_link(c: &mut Cursor) -> LinkResult {
    let op = c.peek_word()?.to_string();
    let build = match op.as_str() {
        "INSERT" => (|c: &mut Cursor| {
            c.pos += 1;
            let mut words = c.paren_words()?;
            if words.is_empty() {
                return Err(c.ill_formed("INSERT requires a key"));
            }
            let key = words.remove(0);
            let values = words.iter().map(|w| parse_int_literal(w)).collect();
            let table = c.expect_from_table()?;
            c.finish()?;
            Ok(Query::Insert { table, key, values })
        }) as fn(&mut Cursor) -> Result<Query, QueryBuildError>,
        "UPDATE" => |c: &mut Cursor| {
            c.pos += 1;
            let words = c.paren_words()?;
            if words.len() != 2 {
                return Err(c.ill_formed("UPDATE takes (field literal)"));
            }
            let table = c.expect_from_table()?;
            let cond = c.optional_where()?;
            c.finish()?;
            Ok(Query::Update {
                table,
                field: words[0].clone(),
                literal: words[1].clone(),
                cond,
            })
        },
        "DELETE" => |c: &mut Cursor| {
            c.pos += 1;
            let table = c.expect_from_table()?;
            let cond = c.optional_where()?;
            c.finish()?;
            Ok(Query::Delete { table, cond })
        },
        "SELECT" => |c: &mut Cursor| {
            c.pos += 1;
            let fields = c.optional_paren_words()?;
            let table = c.expect_from_table()?;
            let cond = c.optional_where()?;
            c.finish()?;
            Ok(Query::Select { table, fields, cond })
        },
        "COUNT" => |c: &mut Cursor| {
            c.pos += 1;
            let table = c.expect_from_table()?;
            let cond = c.optional_where()?;
            c.finish()?;
            Ok(Query::Count { table, cond })
        },
        "SUM" => |c: &mut Cursor| {
            c.pos += 1;
            let fields = c.optional_paren_words()?;
            let table = c.expect_from_table()?;
            let cond = c.optional_where()?;
            c.finish()?;
            Ok(Query::Sum { table, fields, cond })
        },
        "MIN" => |c: &mut Cursor| {
            c.pos += 1;
            let fields = c.optional_paren_words()?;
            let table = c.expect_from_table()?;
            let cond = c.optional_where()?;
            c.finish()?;
            Ok(Query::Min { table, fields, cond })
        },
        "MAX" => |c: &mut Cursor| {
            c.pos += 1;
            let fields = c.optional_paren_words()?;
            let table = c.expect_from_table()?;
            let cond = c.optional_where()?;
            c.finish()?;
            Ok(Query::Max { table, fields, cond })
        },
        "ADD" => |c: &mut Cursor| {
            c.pos += 1;
            let mut words = c.paren_words()?;
            if words.len() < 2 {
                return Err(c.ill_formed("ADD requires at least a source and a destination field"));
            }
            let dst = words.pop().unwrap();
            let table = c.expect_from_table()?;
            let cond = c.optional_where()?;
            c.finish()?;
            Ok(Query::Add { table, fields: words, dst, cond })
        },
        "SUB" => |c: &mut Cursor| {
            c.pos += 1;
            let words = c.paren_words()?;
            if words.len() != 3 {
                return Err(c.ill_formed("SUB takes (f1 f2 dst)"));
            }
            let table = c.expect_from_table()?;
            let cond = c.optional_where()?;
            c.finish()?;
            Ok(Query::Sub {
                table,
                f1: words[0].clone(),
                f2: words[1].clone(),
                dst: words[2].clone(),
                cond,
            })
        },
        "SWAP" => |c: &mut Cursor| {
            c.pos += 1;
            let words = c.paren_words()?;
            if words.len() != 2 {
                return Err(c.ill_formed("SWAP takes (fieldA fieldB)"));
            }
            let table = c.expect_from_table()?;
            let cond = c.optional_where()?;
            c.finish()?;
            Ok(Query::Swap {
                table,
                fa: words[0].clone(),
                fb: words[1].clone(),
                cond,
            })
        },
        "DUPLICATE" => |c: &mut Cursor| {
            c.pos += 1;
            let table = c.expect_from_table()?;
            let cond = c.optional_where()?;
            c.finish()?;
            Ok(Query::Duplicate { table, cond })
        },
        _ => return None,
    };
    Some(build(c))
}
