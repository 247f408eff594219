//! Splits an input line into tokens. Offsets are character counts, not
//! bytes: the surface syntax leans on `λ` and subscript digits, and error
//! carets point at characters.

use smol_str::SmolStr;

use crate::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Lambda,
    Dot,
    LParen,
    RParen,
    Eq,
    /// An identifier run: letters, underscores, subscripts.
    Name,
    /// An identifier with a trailing `'`, explicitly a free variable.
    QuotedName,
    /// A run of decimal digits.
    Church,
    /// `$`
    Hist,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) text: SmolStr,
    pub(crate) offset: usize,
}

pub(crate) fn is_subscript(c: char) -> bool {
    ('\u{2080}'..='\u{2089}').contains(&c)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || is_subscript(c)
}

pub(crate) fn tokenize(line: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        let offset = pos;
        match c {
            c if c.is_whitespace() => {
                pos += 1;
            }
            'λ' | '\\' => {
                tokens.push(Token { kind: TokenKind::Lambda, text: "λ".into(), offset });
                pos += 1;
            }
            '.' => {
                tokens.push(Token { kind: TokenKind::Dot, text: ".".into(), offset });
                pos += 1;
            }
            '(' => {
                tokens.push(Token { kind: TokenKind::LParen, text: "(".into(), offset });
                pos += 1;
            }
            ')' => {
                tokens.push(Token { kind: TokenKind::RParen, text: ")".into(), offset });
                pos += 1;
            }
            '=' => {
                tokens.push(Token { kind: TokenKind::Eq, text: "=".into(), offset });
                pos += 1;
            }
            '$' => {
                tokens.push(Token { kind: TokenKind::Hist, text: "$".into(), offset });
                pos += 1;
            }
            c if c.is_ascii_digit() => {
                let mut end = pos;
                while end < chars.len() && chars[end].is_ascii_digit() {
                    end += 1;
                }
                let text: String = chars[pos..end].iter().collect();
                tokens.push(Token { kind: TokenKind::Church, text: text.into(), offset });
                pos = end;
            }
            c if is_name_char(c) => {
                let mut end = pos;
                while end < chars.len() && is_name_char(chars[end]) {
                    end += 1;
                }
                let text: String = chars[pos..end].iter().collect();
                let kind = if end < chars.len() && chars[end] == '\'' {
                    end += 1;
                    TokenKind::QuotedName
                } else {
                    TokenKind::Name
                };
                tokens.push(Token { kind, text: text.into(), offset });
                pos = end;
            }
            _ => return Err(ParseError::new(offset, format!("unexpected character {:?}", c))),
        }
    }

    Ok(tokens)
}
