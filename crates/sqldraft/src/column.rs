//! Column expression parsing and rendering.
//!
//! One parser serves SELECT columns, predicate keys, GROUP BY and ORDER BY.
//! The accepted grammar is deliberately small:
//!
//! ```text
//! column := literal | alias_star | expr [ [AS] alias ]
//! expr   := call | ref | '*'
//! call   := word '(' ( '*' | ref ) ')'
//! ref    := word [ '.' ( word | '*' ) ]
//! ```
//!
//! Rendering quotes every identifier with backticks except known table
//! aliases and `*`. Function calls in a SELECT list without an explicit alias
//! get one derived from the argument and the function name:
//! `COUNT(i.id)` renders as ``COUNT(i.`id`) AS i_count``.
//!
//! Input outside the grammar is not an error at render time: it is quoted
//! verbatim as a single identifier. Use [`ColumnExpr::parse`] directly to get
//! a validation error instead.

use crate::error::{DraftError, DraftResult};
use crate::ident::{self, Quoting};
use std::collections::BTreeSet;

/// Argument of a function call column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    /// `FUNC(*)`
    Star,
    /// `FUNC(column)`
    Ident(String),
    /// `FUNC(alias.column)`
    Qualified { qualifier: String, name: String },
}

/// The shape of a parsed column expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    /// `*` or `alias.*`
    Wildcard { qualifier: Option<String> },
    /// `column`
    Ident(String),
    /// `alias.column`
    Qualified { qualifier: String, name: String },
    /// `FUNC(arg)`
    Call { func: String, arg: CallArg },
    /// A numeric literal such as `1`, passed through as-is.
    Literal(String),
    /// Legacy `alias *` shorthand, passed through as-is.
    AliasStar(String),
}

/// A parsed column expression with its optional explicit alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnExpr {
    pub kind: ColumnKind,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Number(String),
    Star,
    Dot,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> DraftResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '`' => {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('`') => {
                            // Escaped backtick: ``
                            if chars.peek() == Some(&'`') {
                                chars.next();
                                name.push('`');
                            } else {
                                break;
                            }
                        }
                        Some(ch) => name.push(ch),
                        None => return Err(DraftError::validation("Unclosed quoted identifier")),
                    }
                }
                if name.is_empty() {
                    return Err(DraftError::validation("Empty quoted identifier"));
                }
                tokens.push(Token::Word(name));
            }
            c if c.is_ascii_digit() => {
                let mut num = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        num.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(num));
            }
            c if c == '_' || c.is_ascii_alphabetic() => {
                let mut word = String::new();
                while let Some(&w) = chars.peek() {
                    if w == '_' || w == '$' || w.is_ascii_alphanumeric() {
                        word.push(w);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Word(word));
            }
            other => {
                return Err(DraftError::validation(format!(
                    "Unexpected character '{other}' in column expression"
                )));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, want: Token) -> DraftResult<()> {
        match self.next() {
            Some(tok) if tok == want => Ok(()),
            Some(tok) => Err(DraftError::validation(format!(
                "Expected {want:?}, found {tok:?}"
            ))),
            None => Err(DraftError::validation(format!(
                "Expected {want:?}, found end of input"
            ))),
        }
    }

    fn parse_expr(&mut self) -> DraftResult<ColumnKind> {
        match self.next() {
            Some(Token::Star) => Ok(ColumnKind::Wildcard { qualifier: None }),
            Some(Token::Word(word)) => match self.peek() {
                Some(Token::LParen) => {
                    self.pos += 1;
                    let arg = self.parse_arg()?;
                    self.expect(Token::RParen)?;
                    Ok(ColumnKind::Call { func: word, arg })
                }
                Some(Token::Dot) => {
                    self.pos += 1;
                    match self.next() {
                        Some(Token::Word(name)) => Ok(ColumnKind::Qualified {
                            qualifier: word,
                            name,
                        }),
                        Some(Token::Star) => Ok(ColumnKind::Wildcard {
                            qualifier: Some(word),
                        }),
                        _ => Err(DraftError::validation(format!(
                            "Expected column or '*' after '{word}.'"
                        ))),
                    }
                }
                _ => Ok(ColumnKind::Ident(word)),
            },
            Some(tok) => Err(DraftError::validation(format!(
                "Unexpected {tok:?} at start of column expression"
            ))),
            None => Err(DraftError::validation("Empty column expression")),
        }
    }

    fn parse_arg(&mut self) -> DraftResult<CallArg> {
        match self.next() {
            Some(Token::Star) => Ok(CallArg::Star),
            Some(Token::Word(word)) => {
                if self.peek() == Some(&Token::Dot) {
                    self.pos += 1;
                    match self.next() {
                        Some(Token::Word(name)) => Ok(CallArg::Qualified {
                            qualifier: word,
                            name,
                        }),
                        _ => Err(DraftError::validation(format!(
                            "Expected column after '{word}.' in function argument"
                        ))),
                    }
                } else {
                    Ok(CallArg::Ident(word))
                }
            }
            _ => Err(DraftError::validation(
                "Function argument must be '*', a column or alias.column",
            )),
        }
    }

    fn parse_alias(&mut self) -> DraftResult<Option<String>> {
        let alias = match self.next() {
            None => return Ok(None),
            Some(Token::Word(w)) if w.eq_ignore_ascii_case("as") => match self.next() {
                Some(Token::Word(alias)) => alias,
                _ => return Err(DraftError::validation("Expected alias after AS")),
            },
            Some(Token::Word(alias)) => alias,
            Some(tok) => {
                return Err(DraftError::validation(format!(
                    "Unexpected {tok:?} after column expression"
                )));
            }
        };
        if let Some(tok) = self.peek() {
            return Err(DraftError::validation(format!(
                "Unexpected {tok:?} after alias '{alias}'"
            )));
        }
        Ok(Some(alias))
    }
}

impl ColumnExpr {
    /// Parse one raw column string.
    ///
    /// Returns [`DraftError::Validation`] when the input is outside the grammar.
    pub fn parse(raw: &str) -> DraftResult<Self> {
        let trimmed = raw.trim();
        if ident::is_numeric_literal(trimmed) {
            return Ok(Self {
                kind: ColumnKind::Literal(trimmed.to_string()),
                alias: None,
            });
        }

        let tokens = tokenize(trimmed)?;
        if let [Token::Word(alias), Token::Star] = tokens.as_slice() {
            return Ok(Self {
                kind: ColumnKind::AliasStar(alias.clone()),
                alias: None,
            });
        }

        let mut parser = Parser { tokens, pos: 0 };
        let kind = parser.parse_expr()?;
        let alias = parser.parse_alias()?;
        Ok(Self { kind, alias })
    }

    /// Render this expression as SQL.
    pub fn render(&self, ctx: &RenderContext<'_>) -> String {
        let mut out = String::new();
        match &self.kind {
            ColumnKind::Wildcard { qualifier: None } => out.push('*'),
            ColumnKind::Wildcard {
                qualifier: Some(qualifier),
            } => {
                ctx.write_qualifier(qualifier, &mut out);
                out.push_str(".*");
            }
            ColumnKind::Ident(name) => out.push_str(&ident::render(name, ctx.quoting)),
            ColumnKind::Qualified { qualifier, name } => {
                ctx.write_qualifier(qualifier, &mut out);
                out.push('.');
                out.push_str(&ident::render(name, ctx.quoting));
            }
            ColumnKind::Call { func, arg } => {
                out.push_str(func);
                out.push('(');
                match arg {
                    CallArg::Star => out.push('*'),
                    CallArg::Ident(name) => out.push_str(&ident::render(name, ctx.quoting)),
                    CallArg::Qualified { qualifier, name } => {
                        ctx.write_qualifier(qualifier, &mut out);
                        out.push('.');
                        out.push_str(&ident::render(name, ctx.quoting));
                    }
                }
                out.push(')');
            }
            ColumnKind::Literal(lit) => out.push_str(lit),
            ColumnKind::AliasStar(alias) => {
                out.push_str(alias);
                out.push_str(" *");
            }
        }

        if ctx.select_list {
            let alias = self.alias.clone().or_else(|| self.auto_alias(ctx));
            if let Some(alias) = alias {
                out.push_str(" AS ");
                out.push_str(&alias);
            }
        }
        out
    }

    /// Alias synthesized for a function call without an explicit alias.
    ///
    /// The prefix is the argument's qualifier, the bare column name, or for
    /// `FUNC(*)` the table reference of the render context.
    pub fn auto_alias(&self, ctx: &RenderContext<'_>) -> Option<String> {
        let ColumnKind::Call { func, arg } = &self.kind else {
            return None;
        };
        let source = match arg {
            CallArg::Star => ctx.table_ref,
            CallArg::Ident(name) => name.as_str(),
            CallArg::Qualified { qualifier, .. } => qualifier.as_str(),
        };
        Some(format!("{source}_{func}").to_lowercase())
    }
}

/// Everything the renderer needs to know about the surrounding statement.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Names that are table aliases and stay unquoted as qualifiers.
    pub known_aliases: &'a BTreeSet<String>,
    /// Alias (or name) of the statement's own table, used for `FUNC(*)` auto-aliases.
    pub table_ref: &'a str,
    pub quoting: Quoting,
    /// Whether aliases are rendered (SELECT list only).
    pub select_list: bool,
}

impl<'a> RenderContext<'a> {
    pub fn new(known_aliases: &'a BTreeSet<String>, table_ref: &'a str) -> Self {
        Self {
            known_aliases,
            table_ref,
            quoting: Quoting::Always,
            select_list: false,
        }
    }

    /// Context for SELECT list entries: aliases rendered, identifiers quoted.
    pub fn select(mut self) -> Self {
        self.select_list = true;
        self.quoting = Quoting::Always;
        self
    }

    /// Context for predicate keys: no aliases, minimal quoting.
    pub fn predicate(mut self) -> Self {
        self.select_list = false;
        self.quoting = Quoting::Minimal;
        self
    }

    fn write_qualifier(&self, qualifier: &str, out: &mut String) {
        if self.known_aliases.contains(qualifier) {
            out.push_str(qualifier);
        } else {
            ident::write_quoted(qualifier, out);
        }
    }
}

/// Render one raw column string, falling back to verbatim quoting on a grammar miss.
///
/// Aliases only exist in a SELECT list; elsewhere a trailing word (`name DESC`,
/// `name x`) is a grammar miss too.
pub fn render_column(raw: &str, ctx: &RenderContext<'_>) -> String {
    let parsed = ColumnExpr::parse(raw).and_then(|expr| match &expr.alias {
        Some(alias) if !ctx.select_list => Err(DraftError::validation(format!(
            "unexpected '{alias}' after column outside a select list"
        ))),
        _ => Ok(expr),
    });
    match parsed {
        Ok(expr) => expr.render(ctx),
        Err(err) => {
            tracing::trace!(
                target: "sqldraft.column",
                raw,
                error = %err,
                "column expression outside grammar, quoting verbatim"
            );
            ident::quote(raw.trim())
        }
    }
}

/// Render a list of raw columns in order.
///
/// In a SELECT list, identical raw strings render once.
pub fn render_columns<S: AsRef<str>>(raws: &[S], ctx: &RenderContext<'_>) -> Vec<String> {
    let mut seen: Vec<&str> = Vec::with_capacity(raws.len());
    let mut out = Vec::with_capacity(raws.len());
    for raw in raws {
        let raw = raw.as_ref();
        if ctx.select_list {
            if seen.contains(&raw) {
                continue;
            }
            seen.push(raw);
        }
        out.push(render_column(raw, ctx));
    }
    out
}
