// covenant-core/src/dsl.rs
// ============================================================================
// Module: Condition DSL Parser
// Description: Author-facing expression language for rule conditions.
// Purpose: Turn human-readable condition strings into validated `Condition`
//          trees.
// Dependencies: covenant-logic, serde_json, crate::core::condition
// ============================================================================

//! ## Overview
//!
//! Rule corpora express conditions as short strings instead of nested JSON.
//! The parser produces the same [`Condition`] tree any other corpus format
//! would, then validates it with [`RequirementValidator`].
//! Security posture: DSL input is untrusted; input size and nesting are
//! bounded before any tree is built.
//!
//! ### Grammar
//! - **Paths**: `input.a.b`, `item.status` (only inside `any(...)`), numeric
//!   segments index lists (`input.items.0`)
//! - **Comparisons**: `path == "x"`, `path != 3`, `path < 1.5`, `<=`, `>`, `>=`
//! - **Membership**: `path in ["a", "b"]`, `path not_in [1, 2]`
//! - **Presence checks**: `missing(path)`, `empty(path)`
//! - **Quantifier**: `any(policies, expr)`, `any(path, expr)`
//! - **Boolean operators**: `and`/`&&`, `or`/`||`, `not`/`!`, `not(expr)`
//! - **Literals**: `"text"` (with `\"`, `\\`, `\n`, `\t` escapes), numbers,
//!   `true`, `false`, `null`
//!
//! ### Example
//!
//! ```
//! use covenant_core::dsl::parse_condition;
//!
//! let condition = parse_condition(
//!     r#"input.personal_data_present == true and input.lawful_basis == "NONE""#,
//! );
//! assert!(condition.is_ok());
//! ```

use std::fmt;

use covenant_logic::RequirementValidator;
use serde_json::Value;

use crate::core::condition::Collection;
use crate::core::condition::CompareOp;
use crate::core::condition::Condition;
use crate::core::condition::Predicate;
use crate::core::value::FieldPath;
use crate::core::value::PathSource;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Largest condition text accepted, in bytes.
const MAX_CONDITION_BYTES: usize = 1024 * 1024;
/// Deepest parenthesis or call nesting accepted.
const MAX_CONDITION_DEPTH: usize = 32;

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Errors that can occur while parsing or validating a condition.
///
/// # Invariants
/// - None. Variants capture structured parse and validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DslError {
    /// Nothing but whitespace was supplied.
    EmptyInput,
    /// Condition text is larger than the byte limit.
    InputTooLarge {
        /// Byte limit.
        max_bytes: usize,
        /// Bytes supplied.
        actual_bytes: usize,
    },
    /// Parentheses or calls nest deeper than allowed.
    NestingTooDeep {
        /// Depth limit.
        max_depth: usize,
        /// Depth reached.
        actual_depth: usize,
        /// Byte offset of the problem.
        position: usize,
    },
    /// A token appeared where the grammar does not allow it.
    UnexpectedToken {
        /// What the parser wanted.
        expected: &'static str,
        /// What it got.
        found: String,
        /// Byte offset of the problem.
        position: usize,
    },
    /// Call to a function the grammar does not define.
    UnknownFunction {
        /// Name as written.
        name: String,
        /// Byte offset of the problem.
        position: usize,
    },
    /// A path started with something other than `input` or `item`.
    UnknownPathRoot {
        /// The offending root identifier.
        name: String,
        /// Byte offset of the problem.
        position: usize,
    },
    /// An `item` path appeared outside any `any(...)` body.
    ItemOutsideAny {
        /// Byte offset of the problem.
        position: usize,
    },
    /// Numeric literal failed to parse.
    InvalidNumber {
        /// The raw numeric text.
        raw: String,
        /// Byte offset of the problem.
        position: usize,
    },
    /// String literal was not closed.
    UnterminatedString {
        /// Byte offset of the opening quote.
        position: usize,
    },
    /// String literal contained an unsupported escape.
    InvalidEscape {
        /// The escaped character.
        escape: char,
        /// Byte offset of the string literal.
        position: usize,
    },
    /// The parsed tree failed requirement validation.
    Validation(String),
    /// Tokens remain after a complete condition.
    TrailingInput {
        /// Byte offset of the first extra token.
        position: usize,
    },
}

impl fmt::Display for DslError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "condition is empty"),
            Self::InputTooLarge {
                max_bytes,
                actual_bytes,
            } => {
                write!(f, "condition is {actual_bytes} bytes, limit is {max_bytes}")
            }
            Self::NestingTooDeep {
                max_depth,
                actual_depth,
                position,
            } => write!(
                f,
                "nesting depth {actual_depth} exceeds {max_depth} at offset {position}"
            ),
            Self::UnexpectedToken {
                expected,
                found,
                position,
            } => {
                write!(f, "expected {expected} at offset {position}, found `{found}`")
            }
            Self::UnknownFunction {
                name,
                position,
            } => {
                write!(f, "no function named `{name}` (offset {position})")
            }
            Self::UnknownPathRoot {
                name,
                position,
            } => {
                write!(f, "unknown path root `{name}` at {position}, expected `input` or `item`")
            }
            Self::ItemOutsideAny {
                position,
            } => {
                write!(f, "`item` used outside `any(...)` at {position}")
            }
            Self::InvalidNumber {
                raw,
                position,
            } => {
                write!(f, "malformed number `{raw}` at offset {position}")
            }
            Self::UnterminatedString {
                position,
            } => {
                write!(f, "unterminated string literal at {position}")
            }
            Self::InvalidEscape {
                escape,
                position,
            } => {
                write!(f, "invalid escape `\\{escape}` in string literal at {position}")
            }
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::TrailingInput {
                position,
            } => {
                write!(f, "extra input after condition at offset {position}")
            }
        }
    }
}

impl std::error::Error for DslError {}

/// Parses a DSL expression into a validated [`Condition`] tree.
///
/// # Errors
/// Returns [`DslError`] for syntax issues, unknown roots or functions, invalid
/// literals, trailing input, or post-parse validation failures.
pub fn parse_condition(input: &str) -> Result<Condition, DslError> {
    if input.len() > MAX_CONDITION_BYTES {
        return Err(DslError::InputTooLarge {
            max_bytes: MAX_CONDITION_BYTES,
            actual_bytes: input.len(),
        });
    }
    let mut lexer = Lexer::new(input);
    let tokens = lexer.lex()?;

    let mut parser = Parser::new(tokens);
    let condition = parser.parse_expression()?;
    parser.finish()?;

    validate(&parser.validator, &condition)?;
    Ok(condition)
}

/// Runs structural validation on a parsed tree.
fn validate(validator: &RequirementValidator, condition: &Condition) -> Result<(), DslError> {
    validator.validate(condition).map_err(|err| DslError::Validation(err.to_string()))
}

// ============================================================================
// SECTION: Lexer
// ============================================================================

/// Token kinds of the condition grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    /// Identifier token.
    Ident(&'a str),
    /// Numeric literal token (digits, optional sign and fraction).
    Number(&'a str),
    /// String literal body, escapes not yet decoded.
    Str(&'a str),
    /// Comparison operator.
    Compare(CompareOp),
    /// `in` keyword.
    In,
    /// `not_in` keyword.
    NotIn,
    /// Logical AND operator.
    And,
    /// Logical OR operator.
    Or,
    /// Logical NOT operator.
    Not,
    /// Left parenthesis.
    LParen,
    /// Right parenthesis.
    RParen,
    /// Left bracket.
    LBracket,
    /// Right bracket.
    RBracket,
    /// Comma separator.
    Comma,
    /// Path separator.
    Dot,
    /// End-of-input marker.
    Eof,
}

/// Token with the byte offset it started at.
#[derive(Debug, Clone, Copy)]
struct Lexeme<'a> {
    /// Token value.
    token: Token<'a>,
    /// Start offset.
    position: usize,
}

/// Lexer for the condition DSL.
struct Lexer<'a> {
    /// Condition text.
    input: &'a str,
    /// Read cursor.
    offset: usize,
}

impl<'a> Lexer<'a> {
    /// Starts a lexer at offset zero.
    const fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
        }
    }

    /// Splits the text into positioned tokens ending with `Eof`.
    fn lex(&mut self) -> Result<Vec<Lexeme<'a>>, DslError> {
        let mut tokens = Vec::new();
        let bytes = self.input.as_bytes();

        while let Some(&ch) = bytes.get(self.offset) {
            match ch {
                b' ' | b'\t' | b'\n' | b'\r' => {
                    self.offset += 1;
                }
                b'(' => self.push_simple(&mut tokens, Token::LParen, 1),
                b')' => self.push_simple(&mut tokens, Token::RParen, 1),
                b'[' => self.push_simple(&mut tokens, Token::LBracket, 1),
                b']' => self.push_simple(&mut tokens, Token::RBracket, 1),
                b',' => self.push_simple(&mut tokens, Token::Comma, 1),
                b'.' => self.push_simple(&mut tokens, Token::Dot, 1),
                b'!' => {
                    if self.lookahead(bytes) == Some(b'=') {
                        self.push_simple(&mut tokens, Token::Compare(CompareOp::NotEqual), 2);
                    } else {
                        self.push_simple(&mut tokens, Token::Not, 1);
                    }
                }
                b'=' => {
                    if self.lookahead(bytes) == Some(b'=') {
                        self.push_simple(&mut tokens, Token::Compare(CompareOp::Equal), 2);
                    } else {
                        return Err(DslError::UnexpectedToken {
                            expected: "==",
                            found: "=".to_string(),
                            position: self.offset,
                        });
                    }
                }
                b'<' => {
                    if self.lookahead(bytes) == Some(b'=') {
                        self.push_simple(
                            &mut tokens,
                            Token::Compare(CompareOp::LessThanOrEqual),
                            2,
                        );
                    } else {
                        self.push_simple(&mut tokens, Token::Compare(CompareOp::LessThan), 1);
                    }
                }
                b'>' => {
                    if self.lookahead(bytes) == Some(b'=') {
                        self.push_simple(
                            &mut tokens,
                            Token::Compare(CompareOp::GreaterThanOrEqual),
                            2,
                        );
                    } else {
                        self.push_simple(&mut tokens, Token::Compare(CompareOp::GreaterThan), 1);
                    }
                }
                b'&' => {
                    if self.lookahead(bytes) == Some(b'&') {
                        self.push_simple(&mut tokens, Token::And, 2);
                    } else {
                        return Err(DslError::UnexpectedToken {
                            expected: "&&",
                            found: "&".to_string(),
                            position: self.offset,
                        });
                    }
                }
                b'|' => {
                    if self.lookahead(bytes) == Some(b'|') {
                        self.push_simple(&mut tokens, Token::Or, 2);
                    } else {
                        return Err(DslError::UnexpectedToken {
                            expected: "||",
                            found: "|".to_string(),
                            position: self.offset,
                        });
                    }
                }
                b'"' | b'\'' => tokens.push(self.lex_string(bytes, ch)?),
                b'-' if self.lookahead(bytes).is_some_and(|b| b.is_ascii_digit()) => {
                    tokens.push(self.lex_number(bytes));
                }
                b'0' ..= b'9' => tokens.push(self.lex_number(bytes)),
                b'a' ..= b'z' | b'A' ..= b'Z' | b'_' => {
                    let start = self.offset;
                    self.skip_while(bytes, |b| b.is_ascii_alphanumeric() || b == b'_');
                    let slice = &self.input[start .. self.offset];
                    // After a dot every word is a path segment, keywords included.
                    let after_dot = tokens.last().is_some_and(|last| last.token == Token::Dot);
                    let token =
                        if after_dot { Token::Ident(slice) } else { Self::classify_word(slice) };
                    tokens.push(Lexeme {
                        token,
                        position: start,
                    });
                }
                _ => {
                    let found = self.input[self.offset ..].chars().next().unwrap_or('?');
                    return Err(DslError::UnexpectedToken {
                        expected: "identifier, literal, or operator",
                        found: found.to_string(),
                        position: self.offset,
                    });
                }
            }
        }

        if tokens.is_empty() {
            return Err(DslError::EmptyInput);
        }

        tokens.push(Lexeme {
            token: Token::Eof,
            position: self.offset,
        });
        Ok(tokens)
    }

    /// Pushes a fixed-width token and advances past it.
    fn push_simple(&mut self, tokens: &mut Vec<Lexeme<'a>>, token: Token<'a>, width: usize) {
        tokens.push(Lexeme {
            token,
            position: self.offset,
        });
        self.offset += width;
    }

    /// Lexes a numeric literal with optional sign and fraction.
    fn lex_number(&mut self, bytes: &[u8]) -> Lexeme<'a> {
        let start = self.offset;
        if bytes.get(self.offset) == Some(&b'-') {
            self.offset += 1;
        }
        self.skip_while(bytes, |b| b.is_ascii_digit());
        if bytes.get(self.offset) == Some(&b'.')
            && bytes.get(self.offset + 1).is_some_and(u8::is_ascii_digit)
        {
            self.offset += 1;
            self.skip_while(bytes, |b| b.is_ascii_digit());
        }
        Lexeme {
            token: Token::Number(&self.input[start .. self.offset]),
            position: start,
        }
    }

    /// Lexes a quoted string literal, leaving escapes for the parser.
    fn lex_string(&mut self, bytes: &[u8], quote: u8) -> Result<Lexeme<'a>, DslError> {
        let start = self.offset;
        self.offset += 1;
        let body_start = self.offset;
        while let Some(&b) = bytes.get(self.offset) {
            if b == b'\\' {
                self.offset += 2;
                continue;
            }
            if b == quote {
                let body = &self.input[body_start .. self.offset];
                self.offset += 1;
                return Ok(Lexeme {
                    token: Token::Str(body),
                    position: start,
                });
            }
            self.offset += 1;
        }
        Err(DslError::UnterminatedString {
            position: start,
        })
    }

    /// Byte after the cursor.
    fn lookahead(&self, bytes: &[u8]) -> Option<u8> {
        bytes.get(self.offset + 1).copied()
    }

    /// Moves the cursor past bytes satisfying `condition`.
    fn skip_while<F>(&mut self, bytes: &[u8], condition: F)
    where
        F: Fn(u8) -> bool,
    {
        while let Some(&b) = bytes.get(self.offset) {
            if condition(b) {
                self.offset += 1;
            } else {
                break;
            }
        }
    }

    /// Turns a word into a keyword or an identifier.
    fn classify_word(slice: &'a str) -> Token<'a> {
        match slice {
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "in" => Token::In,
            "not_in" => Token::NotIn,
            _ => Token::Ident(slice),
        }
    }
}

/// Decodes escape sequences in a string literal body.
fn unescape(raw: &str, position: usize) -> Result<String, DslError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => {
                return Err(DslError::InvalidEscape {
                    escape: other,
                    position,
                });
            }
            None => {
                return Err(DslError::UnterminatedString {
                    position,
                });
            }
        }
    }
    Ok(out)
}

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Recursive-descent parser for the condition DSL.
struct Parser<'input> {
    /// Lexed tokens.
    tokens: Vec<Lexeme<'input>>,
    /// Current token index.
    index: usize,
    /// Open parentheses and calls.
    nesting: usize,
    /// Number of enclosing `any(...)` bodies.
    quantifier_depth: usize,
    /// Structural validator applied to quantifier bodies and the root.
    validator: RequirementValidator,
}

impl<'input> Parser<'input> {
    /// Wraps lexed tokens.
    fn new(tokens: Vec<Lexeme<'input>>) -> Self {
        Self {
            tokens,
            index: 0,
            nesting: 0,
            quantifier_depth: 0,
            validator: RequirementValidator::with_defaults(),
        }
    }

    /// Entry rule.
    fn parse_expression(&mut self) -> Result<Condition, DslError> {
        self.parse_or()
    }

    /// `or` chain.
    fn parse_or(&mut self) -> Result<Condition, DslError> {
        let mut parts = vec![self.parse_and()?];
        while self.eat(Token::Or) {
            parts.push(self.parse_and()?);
        }
        if parts.len() == 1 { Ok(parts.remove(0)) } else { Ok(Condition::or(parts)) }
    }

    /// `and` chain.
    fn parse_and(&mut self) -> Result<Condition, DslError> {
        let mut parts = vec![self.parse_unary()?];
        while self.eat(Token::And) {
            parts.push(self.parse_unary()?);
        }
        if parts.len() == 1 { Ok(parts.remove(0)) } else { Ok(Condition::and(parts)) }
    }

    /// Prefix negation.
    fn parse_unary(&mut self) -> Result<Condition, DslError> {
        let position = self.current().position;
        if self.eat(Token::Not) {
            return self.nested(position, |parser| {
                let condition = parser.parse_unary()?;
                Ok(Condition::negate(condition))
            });
        }
        self.parse_primary()
    }

    /// Grouping, call, or comparison.
    fn parse_primary(&mut self) -> Result<Condition, DslError> {
        let Lexeme {
            token,
            position,
        } = *self.current();
        match token {
            Token::LParen => {
                self.advance();
                self.nested(position, |parser| {
                    let expr = parser.parse_expression()?;
                    parser.require(Token::RParen, "`)`")?;
                    Ok(expr)
                })
            }
            Token::Ident(name) if self.peek().token == Token::LParen => {
                self.advance();
                self.advance();
                self.parse_function(name, position)
            }
            Token::Ident(_) => self.parse_comparison(),
            Token::Number(_)
            | Token::Str(_)
            | Token::Compare(_)
            | Token::In
            | Token::NotIn
            | Token::And
            | Token::Or
            | Token::Not
            | Token::RParen
            | Token::LBracket
            | Token::RBracket
            | Token::Comma
            | Token::Dot
            | Token::Eof => Err(DslError::UnexpectedToken {
                expected: "condition or expression",
                found: self.current_text(),
                position,
            }),
        }
    }

    /// Parses a function-style expression; the opening `(` is consumed.
    fn parse_function(
        &mut self,
        name: &'input str,
        name_pos: usize,
    ) -> Result<Condition, DslError> {
        self.nested(name_pos, |parser| match name {
            "missing" => {
                let path = parser.parse_path()?;
                parser.require(Token::RParen, "`)` after `missing(...)`")?;
                Ok(Condition::predicate(Predicate::Missing {
                    path,
                }))
            }
            "empty" => {
                let path = parser.parse_path()?;
                parser.require(Token::RParen, "`)` after `empty(...)`")?;
                Ok(Condition::predicate(Predicate::Empty {
                    path,
                }))
            }
            "any" => parser.parse_any(),
            _ => Err(DslError::UnknownFunction {
                name: name.to_string(),
                position: name_pos,
            }),
        })
    }

    /// Parses the arguments of `any(collection, expr)`.
    fn parse_any(&mut self) -> Result<Condition, DslError> {
        let collection = match self.current().token {
            Token::Ident("policies") if self.peek().token == Token::Comma => {
                self.advance();
                Collection::Policies
            }
            _ => Collection::Path(self.parse_path()?),
        };
        self.require(Token::Comma, "`,` after the `any(...)` collection")?;

        self.quantifier_depth += 1;
        let body = self.parse_expression();
        self.quantifier_depth -= 1;
        let body = body?;

        validate(&self.validator, &body)?;
        self.require(Token::RParen, "`)` after `any(...)`")?;
        Ok(Condition::predicate(Predicate::Any {
            collection,
            condition: Box::new(body),
        }))
    }

    /// Parses `path op literal` or `path in [...]`.
    fn parse_comparison(&mut self) -> Result<Condition, DslError> {
        let path = self.parse_path()?;
        let Lexeme {
            token,
            position,
        } = *self.current();
        match token {
            Token::Compare(op) => {
                self.advance();
                let literal = self.parse_literal()?;
                Ok(Condition::predicate(Predicate::Compare {
                    path,
                    op,
                    literal,
                }))
            }
            Token::In | Token::NotIn => {
                self.advance();
                let set = self.parse_literal_list()?;
                Ok(Condition::predicate(Predicate::Membership {
                    path,
                    negated: token == Token::NotIn,
                    set,
                }))
            }
            _ => Err(DslError::UnexpectedToken {
                expected: "comparison operator, `in`, or `not_in`",
                found: self.current_text(),
                position,
            }),
        }
    }

    /// Parses a dotted path rooted at `input` or `item`.
    fn parse_path(&mut self) -> Result<FieldPath, DslError> {
        let Lexeme {
            token,
            position,
        } = *self.current();
        let source = match token {
            Token::Ident("input") => PathSource::Input,
            Token::Ident("item") => {
                if self.quantifier_depth == 0 {
                    return Err(DslError::ItemOutsideAny {
                        position,
                    });
                }
                PathSource::Item
            }
            Token::Ident(name) => {
                return Err(DslError::UnknownPathRoot {
                    name: name.to_string(),
                    position,
                });
            }
            _ => {
                return Err(DslError::UnexpectedToken {
                    expected: "`input` or `item` path",
                    found: self.current_text(),
                    position,
                });
            }
        };
        self.advance();

        let mut segments = Vec::new();
        while self.eat(Token::Dot) {
            let Lexeme {
                token,
                position,
            } = *self.current();
            match token {
                Token::Ident(segment) => segments.push(segment.to_string()),
                // `items.0.1` lexes the index pair as one number.
                Token::Number(raw) if raw.bytes().all(|b| b.is_ascii_digit() || b == b'.') => {
                    segments.extend(raw.split('.').map(str::to_string));
                }
                _ => {
                    return Err(DslError::UnexpectedToken {
                        expected: "path segment",
                        found: self.current_text(),
                        position,
                    });
                }
            }
            self.advance();
        }

        Ok(FieldPath {
            source,
            segments,
        })
    }

    /// Parses a bracketed, non-empty literal list.
    fn parse_literal_list(&mut self) -> Result<Vec<Value>, DslError> {
        self.require(Token::LBracket, "`[`")?;
        let mut values = vec![self.parse_literal()?];
        while self.eat(Token::Comma) {
            values.push(self.parse_literal()?);
        }
        self.require(Token::RBracket, "`]` after literal list")?;
        Ok(values)
    }

    /// Parses a scalar literal.
    fn parse_literal(&mut self) -> Result<Value, DslError> {
        let Lexeme {
            token,
            position,
        } = *self.current();
        let value = match token {
            Token::Str(raw) => Value::String(unescape(raw, position)?),
            Token::Number(raw) => parse_number(raw, position)?,
            Token::Ident("true") => Value::Bool(true),
            Token::Ident("false") => Value::Bool(false),
            Token::Ident("null") => Value::Null,
            _ => {
                return Err(DslError::UnexpectedToken {
                    expected: "string, number, `true`, `false`, or `null`",
                    found: self.current_text(),
                    position,
                });
            }
        };
        self.advance();
        Ok(value)
    }

    /// Runs `f` one nesting level deeper, failing past the limit.
    fn nested<T>(
        &mut self,
        position: usize,
        f: impl FnOnce(&mut Self) -> Result<T, DslError>,
    ) -> Result<T, DslError> {
        let next_depth = self.nesting + 1;
        if next_depth > MAX_CONDITION_DEPTH {
            return Err(DslError::NestingTooDeep {
                max_depth: MAX_CONDITION_DEPTH,
                actual_depth: next_depth,
                position,
            });
        }
        self.nesting = next_depth;
        let result = f(self);
        self.nesting = self.nesting.saturating_sub(1);
        result
    }

    /// Consumes a token of the given kind or reports what was found.
    fn require(&mut self, token: Token<'_>, expected: &'static str) -> Result<(), DslError> {
        if std::mem::discriminant(&self.current().token) == std::mem::discriminant(&token) {
            self.advance();
            Ok(())
        } else {
            Err(DslError::UnexpectedToken {
                expected,
                found: self.current_text(),
                position: self.current().position,
            })
        }
    }

    /// Fails unless every token was consumed.
    fn finish(&self) -> Result<(), DslError> {
        if matches!(self.current().token, Token::Eof) {
            Ok(())
        } else {
            Err(DslError::TrailingInput {
                position: self.current().position,
            })
        }
    }

    /// Consumes a token of the given kind when present.
    fn eat(&mut self, kind: Token<'_>) -> bool {
        if std::mem::discriminant(&self.current().token) == std::mem::discriminant(&kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Token under the cursor.
    fn current(&self) -> &Lexeme<'input> {
        self.token_at(self.index)
    }

    /// Returns the token after the current one.
    fn peek(&self) -> &Lexeme<'input> {
        self.token_at(self.index + 1)
    }

    /// Returns the token at an index, clamped to the trailing end-of-input.
    fn token_at(&self, index: usize) -> &Lexeme<'input> {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[index.min(last)]
    }

    /// Steps past the current token.
    const fn advance(&mut self) {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
    }

    /// Source text of the current token for error messages.
    fn current_text(&self) -> String {
        match &self.current().token {
            Token::Ident(name) => (*name).to_string(),
            Token::Number(raw) => (*raw).to_string(),
            Token::Str(raw) => format!("\"{raw}\""),
            Token::Compare(op) => op.symbol().to_string(),
            Token::In => "in".to_string(),
            Token::NotIn => "not_in".to_string(),
            Token::And => "&&".to_string(),
            Token::Or => "||".to_string(),
            Token::Not => "!".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::LBracket => "[".to_string(),
            Token::RBracket => "]".to_string(),
            Token::Comma => ",".to_string(),
            Token::Dot => ".".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

/// Parses numeric literal text into a JSON number.
fn parse_number(raw: &str, position: usize) -> Result<Value, DslError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Number(_)) => Ok(value),
        _ => Err(DslError::InvalidNumber {
            raw: raw.to_string(),
            position,
        }),
    }
}
