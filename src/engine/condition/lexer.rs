// SPDX-License-Identifier: MIT

//! Tokenizer for condition expressions
//!
//! Numbers are decimal with an optional exponent (`1e3`, `2.5E-1`).

use crate::error::ConditionError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    String(String),
    Ident(String),
    True,
    False,
    StrictEq,
    StrictNotEq,
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
    AndAnd,
    OrOr,
    Bang,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

/// Token with its byte offset in the source
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub position: usize,
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Spanned>, ConditionError> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let peek = |offset: usize| chars.get(i + offset).map(|(_, c)| *c);

        let (token, len) = match c {
            '(' => (Token::LParen, 1),
            ')' => (Token::RParen, 1),
            '+' => (Token::Plus, 1),
            '-' => (Token::Minus, 1),
            '*' => (Token::Star, 1),
            '/' => (Token::Slash, 1),
            '=' => match (peek(1), peek(2)) {
                (Some('='), Some('=')) => (Token::StrictEq, 3),
                (Some('='), _) => (Token::Eq, 2),
                _ => return Err(ConditionError::syntax(pos, "assignment is not allowed")),
            },
            '!' => match (peek(1), peek(2)) {
                (Some('='), Some('=')) => (Token::StrictNotEq, 3),
                (Some('='), _) => (Token::NotEq, 2),
                _ => (Token::Bang, 1),
            },
            '>' if peek(1) == Some('=') => (Token::Gte, 2),
            '>' => (Token::Gt, 1),
            '<' if peek(1) == Some('=') => (Token::Lte, 2),
            '<' => (Token::Lt, 1),
            '&' if peek(1) == Some('&') => (Token::AndAnd, 2),
            '|' if peek(1) == Some('|') => (Token::OrOr, 2),
            '\'' | '"' => {
                let (s, len) = read_string(&chars, i)?;
                (Token::String(s), len)
            }
            c if c.is_ascii_digit()
                || (c == '.' && peek(1).is_some_and(|n| n.is_ascii_digit())) =>
            {
                let (n, len) = read_number(input, &chars, i)?;
                (Token::Number(n), len)
            }
            c if is_ident_start(c) => {
                let len = chars[i..]
                    .iter()
                    .take_while(|(_, c)| is_ident_continue(*c))
                    .count();
                let word: String = chars[i..i + len].iter().map(|(_, c)| c).collect();
                let token = match word.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    _ => Token::Ident(word),
                };
                (token, len)
            }
            other => {
                return Err(ConditionError::syntax(
                    pos,
                    format!("unexpected character '{}'", other),
                ))
            }
        };

        tokens.push(Spanned {
            token,
            position: pos,
        });
        i += len;
    }

    Ok(tokens)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Read a quoted string starting at `start`; returns the value and the
/// number of chars consumed including quotes
fn read_string(chars: &[(usize, char)], start: usize) -> Result<(String, usize), ConditionError> {
    let (pos, quote) = chars[start];
    let mut out = String::new();
    let mut i = start + 1;

    while i < chars.len() {
        let c = chars[i].1;
        if c == quote {
            return Ok((out, i - start + 1));
        }
        if c == '\\' {
            i += 1;
            let escaped = chars
                .get(i)
                .map(|(_, c)| *c)
                .ok_or(ConditionError::UnexpectedEnd)?;
            out.push(match escaped {
                'n' => '\n',
                't' => '\t',
                other => other,
            });
        } else {
            out.push(c);
        }
        i += 1;
    }

    Err(ConditionError::syntax(pos, "unterminated string"))
}

fn read_number(
    input: &str,
    chars: &[(usize, char)],
    start: usize,
) -> Result<(f64, usize), ConditionError> {
    let mut len = 0;
    let mut seen_dot = false;
    for (_, c) in &chars[start..] {
        match c {
            '0'..='9' => len += 1,
            '.' if !seen_dot => {
                seen_dot = true;
                len += 1;
            }
            _ => break,
        }
    }

    // Exponent only when digits follow
    let at = |i: usize| chars.get(start + i).map(|(_, c)| *c);
    if matches!(at(len), Some('e' | 'E')) {
        let sign = usize::from(matches!(at(len + 1), Some('+' | '-')));
        let digits = chars[(start + len + 1 + sign).min(chars.len())..]
            .iter()
            .take_while(|(_, c)| c.is_ascii_digit())
            .count();
        if digits > 0 {
            len += 1 + sign + digits;
        }
    }

    let from = chars[start].0;
    let to = chars.get(start + len).map(|(p, _)| *p).unwrap_or(input.len());
    let text = &input[from..to];
    text.parse::<f64>()
        .map(|n| (n, len))
        .map_err(|_| ConditionError::syntax(from, format!("invalid number '{}'", text)))
}
