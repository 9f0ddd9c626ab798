//! Parser for the textual filter syntax.
//!
//! ```text
//! expr      := and ("OR" and)*
//! and       := primary ("AND" primary)*
//! primary   := "(" expr ")" | condition
//! condition := operand op value
//! value     := quoted | number | true | false | word | "(" quoted ("," quoted)* ")"
//! ```
//!
//! Keywords are case-insensitive. AND binds tighter than OR; chains are
//! left-associative. Trees deeper than [`MAX_FILTER_DEPTH`] are rejected.

use crate::error::{QueryError, QueryResult};
use crate::filter::{ComparisonOp, FilterExpression, FilterValue, LogicalOp};

/// Deepest filter tree, or parenthesis nesting, accepted from text.
pub const MAX_FILTER_DEPTH: usize = 64;

/// Parses filter text. Blank input yields [`FilterExpression::Empty`].
pub fn parse_filter(input: &str) -> QueryResult<FilterExpression> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Ok(FilterExpression::Empty);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        open: 0,
    };
    let (expr, _) = parser.parse_or()?;
    if let Some(tok) = parser.tokens.get(parser.pos) {
        return Err(parse_error(tok.offset, "unexpected trailing input"));
    }
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq)]
enum Kind {
    Quoted(String),
    Word(String),
    Op(ComparisonOp),
    LParen,
    RParen,
    Comma,
}

#[derive(Debug, Clone)]
struct Token {
    kind: Kind,
    offset: usize,
}

fn deepen(depth: usize, position: usize) -> QueryResult<usize> {
    if depth >= MAX_FILTER_DEPTH {
        return Err(parse_error(position, too_deep()));
    }
    Ok(depth + 1)
}

fn too_deep() -> String {
    format!("filter nested deeper than {MAX_FILTER_DEPTH} levels")
}

fn parse_error(position: usize, message: impl Into<String>) -> QueryError {
    QueryError::Parse {
        position,
        message: message.into(),
    }
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '=' | '!' | '~' | '<' | '>' | ',' | '"')
}

fn tokenize(input: &str) -> QueryResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        let kind = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '(' => {
                chars.next();
                Kind::LParen
            }
            ')' => {
                chars.next();
                Kind::RParen
            }
            ',' => {
                chars.next();
                Kind::Comma
            }
            '=' => {
                chars.next();
                Kind::Op(ComparisonOp::Eq)
            }
            '~' => {
                chars.next();
                Kind::Op(ComparisonOp::Contains)
            }
            '!' => {
                chars.next();
                match chars.next() {
                    Some((_, '=')) => Kind::Op(ComparisonOp::NotEq),
                    Some((_, '~')) => Kind::Op(ComparisonOp::NotContains),
                    _ => return Err(parse_error(offset, "expected '=' or '~' after '!'")),
                }
            }
            '<' | '>' => {
                chars.next();
                let or_equal = matches!(chars.peek(), Some((_, '=')));
                if or_equal {
                    chars.next();
                }
                Kind::Op(match (c, or_equal) {
                    ('<', false) => ComparisonOp::Lt,
                    ('<', true) => ComparisonOp::Le,
                    (_, false) => ComparisonOp::Gt,
                    (_, true) => ComparisonOp::Ge,
                })
            }
            '"' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some((_, escaped)) => text.push(escaped),
                            None => break,
                        },
                        '"' => {
                            closed = true;
                            break;
                        }
                        _ => text.push(c),
                    }
                }
                if !closed {
                    return Err(parse_error(offset, "unterminated string"));
                }
                Kind::Quoted(text)
            }
            _ => {
                let mut word = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if !is_word_char(c) {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                if word.eq_ignore_ascii_case("in") {
                    Kind::Op(ComparisonOp::In)
                } else {
                    Kind::Word(word)
                }
            }
        };
        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Currently open parentheses.
    open: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Kind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(0, |t| t.offset)
    }

    fn next(&mut self) -> Option<Kind> {
        let tok = self.tokens.get(self.pos).map(|t| t.kind.clone());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        match self.peek() {
            Some(Kind::Word(w)) if w.eq_ignore_ascii_case(keyword) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    // Each parse step returns the subtree with its depth.

    fn parse_or(&mut self) -> QueryResult<(FilterExpression, usize)> {
        let (mut left, mut depth) = self.parse_and()?;
        loop {
            let at = self.offset();
            if !self.eat_keyword("or") {
                return Ok((left, depth));
            }
            let (right, right_depth) = self.parse_and()?;
            depth = deepen(depth.max(right_depth), at)?;
            left = FilterExpression::binary(left, LogicalOp::Or, right);
        }
    }

    fn parse_and(&mut self) -> QueryResult<(FilterExpression, usize)> {
        let (mut left, mut depth) = self.parse_primary()?;
        loop {
            let at = self.offset();
            if !self.eat_keyword("and") {
                return Ok((left, depth));
            }
            let (right, right_depth) = self.parse_primary()?;
            depth = deepen(depth.max(right_depth), at)?;
            left = FilterExpression::binary(left, LogicalOp::And, right);
        }
    }

    fn parse_primary(&mut self) -> QueryResult<(FilterExpression, usize)> {
        if matches!(self.peek(), Some(Kind::LParen)) {
            if self.open == MAX_FILTER_DEPTH {
                return Err(parse_error(self.offset(), too_deep()));
            }
            self.pos += 1;
            self.open += 1;
            let inner = self.parse_or()?;
            self.open -= 1;
            return match self.next() {
                Some(Kind::RParen) => Ok(inner),
                _ => Err(parse_error(self.offset(), "expected ')'")),
            };
        }
        Ok((self.parse_condition()?, 1))
    }

    fn parse_condition(&mut self) -> QueryResult<FilterExpression> {
        let field = match self.next() {
            Some(Kind::Quoted(s)) | Some(Kind::Word(s)) => s,
            _ => return Err(parse_error(self.offset(), "expected field name")),
        };
        let op = match self.next() {
            Some(Kind::Op(op)) => op,
            _ => return Err(parse_error(self.offset(), "expected comparison operator")),
        };
        let value = if op == ComparisonOp::In {
            self.parse_list()?
        } else {
            self.parse_scalar()?
        };
        Ok(FilterExpression::condition(field, op, value))
    }

    fn parse_scalar(&mut self) -> QueryResult<FilterValue> {
        match self.next() {
            Some(Kind::Quoted(s)) => Ok(FilterValue::Text(s)),
            Some(Kind::Word(w)) => Ok(if let Ok(n) = w.parse::<i64>() {
                FilterValue::Number(n)
            } else if w.eq_ignore_ascii_case("true") {
                FilterValue::Bool(true)
            } else if w.eq_ignore_ascii_case("false") {
                FilterValue::Bool(false)
            } else {
                FilterValue::Text(w)
            }),
            _ => Err(parse_error(self.offset(), "expected value")),
        }
    }

    fn parse_list(&mut self) -> QueryResult<FilterValue> {
        if self.next() != Some(Kind::LParen) {
            return Err(parse_error(self.offset(), "expected '(' after IN"));
        }
        let mut items = Vec::new();
        loop {
            match self.next() {
                Some(Kind::Quoted(s)) | Some(Kind::Word(s)) => items.push(s),
                Some(Kind::RParen) if items.is_empty() => break,
                _ => return Err(parse_error(self.offset(), "expected list item")),
            }
            match self.next() {
                Some(Kind::Comma) => continue,
                Some(Kind::RParen) => break,
                _ => return Err(parse_error(self.offset(), "expected ',' or ')'")),
            }
        }
        Ok(FilterValue::List(items))
    }
}
