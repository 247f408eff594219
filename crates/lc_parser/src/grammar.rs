//! The line grammar. One function per production; each production either
//! returns an expression or fails with the character offset of the
//! offending token.

use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::{
    is_bound_name, is_macro_name,
    lexer::{self, Token, TokenKind},
    Expr, Line, ParseError,
};

pub(crate) fn line(input: &str) -> Result<Line, ParseError> {
    let leading_ws = input.chars().take_while(|c| c.is_whitespace()).count();
    if input[char_to_byte(input, leading_ws)..].starts_with(':') {
        return command(input, leading_ws);
    }

    let eof = input.chars().count();
    let tokens = lexer::tokenize(input)?;
    if tokens.is_empty() {
        return Err(ParseError::new(0, "expected an expression"));
    }

    // A definition requires its name anchored at column 0.
    if tokens.len() >= 2
        && tokens[0].kind == TokenKind::Name
        && tokens[0].offset == 0
        && tokens[1].kind == TokenKind::Eq
        && is_macro_name(&tokens[0].text)
    {
        let name = tokens[0].text.clone();
        let mut p = Parser { tokens: &tokens[2..], pos: 0, eof };
        let body = p.expression()?;
        p.finish()?;
        return Ok(Line::Def { name, body });
    }

    let mut p = Parser { tokens: &tokens, pos: 0, eof };
    let expr = p.expression()?;
    p.finish()?;
    Ok(Line::Expr(expr))
}

/// Commands bypass the expression lexer: arguments are raw
/// whitespace-delimited words (file paths, numbers, `none`).
fn command(input: &str, colon_offset: usize) -> Result<Line, ParseError> {
    let rest = &input[char_to_byte(input, colon_offset) + 1..];
    let mut words = rest.split_whitespace();
    let name = match words.next() {
        Some(word) if word.chars().all(|c| c.is_ascii_alphabetic() || c == '_') => word,
        _ => return Err(ParseError::new(colon_offset + 1, "expected a command name after `:`")),
    };
    Ok(Line::Command {
        name: name.into(),
        args: words.map(SmolStr::from).collect(),
    })
}

fn char_to_byte(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map(|(byte, _)| byte).unwrap_or_else(|| s.len())
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    eof: usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().map_or(false, |t| t.kind == kind)
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        self.pos += 1;
        token
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.error_here(message))
        }
    }

    fn error_here(&self, message: &str) -> ParseError {
        let offset = self.current().map_or(self.eof, |t| t.offset);
        ParseError::new(offset, message)
    }

    fn finish(&self) -> Result<(), ParseError> {
        match self.current() {
            None => Ok(()),
            Some(_) => Err(self.error_here("expected end of line")),
        }
    }

    /// Juxtaposed operands fold into a left-deep chain of calls.
    fn expression(&mut self) -> Result<Expr, ParseError> {
        let mut acc = match self.operand()? {
            Some(expr) => expr,
            None => return Err(self.error_here("expected an expression")),
        };
        while let Some(expr) = self.operand()? {
            acc = Expr::Call(Box::new(acc), Box::new(expr));
        }
        Ok(acc)
    }

    /// One element of an application, or `None` when the next token cannot
    /// start one (the caller decides whether that ends a group or the line).
    fn operand(&mut self) -> Result<Option<Expr>, ParseError> {
        let token = match self.current() {
            Some(token) => token.clone(),
            None => return Ok(None),
        };
        let expr = match token.kind {
            TokenKind::Lambda => self.abstraction()?,
            TokenKind::LParen => {
                self.bump();
                let expr = self.expression()?;
                self.expect(TokenKind::RParen, "expected `)`")?;
                expr
            }
            TokenKind::Name => {
                if !is_bound_name(&token.text) && !is_macro_name(&token.text) {
                    return Err(ParseError::new(token.offset, "invalid identifier"));
                }
                self.bump();
                Expr::Name(token.text)
            }
            TokenKind::QuotedName => {
                if !is_bound_name(&token.text) && !is_macro_name(&token.text) {
                    return Err(ParseError::new(token.offset, "invalid identifier"));
                }
                self.bump();
                Expr::Free(token.text)
            }
            TokenKind::Church => {
                let n: u32 = token
                    .text
                    .parse()
                    .map_err(|_| ParseError::new(token.offset, "Church numeral is too large"))?;
                self.bump();
                Expr::Church(n)
            }
            TokenKind::Hist => {
                self.bump();
                Expr::Hist
            }
            TokenKind::RParen | TokenKind::Dot | TokenKind::Eq => return Ok(None),
        };
        Ok(Some(expr))
    }

    /// `λabc.body` desugars right-associatively into nested single-parameter
    /// functions. The head is one or more name runs, each of which splits
    /// greedily into bound variables: `λxy₂z.` binds `x`, `y₂`, `z`.
    fn abstraction(&mut self) -> Result<Expr, ParseError> {
        self.bump();
        let mut params: SmallVec<[SmolStr; 4]> = SmallVec::new();
        while self.at(TokenKind::Name) {
            let token = self.bump();
            split_bounds(&token, &mut params)?;
        }
        if params.is_empty() {
            return Err(self.error_here("expected bound variables after `λ`"));
        }
        self.expect(TokenKind::Dot, "expected `.` after λ-head")?;
        let body = self.expression()?;
        Ok(params
            .into_iter()
            .rev()
            .fold(body, |body, param| Expr::Func { param, body: Box::new(body) }))
    }
}

fn split_bounds(
    token: &Token,
    params: &mut SmallVec<[SmolStr; 4]>,
) -> Result<(), ParseError> {
    let chars: Vec<char> = token.text.chars().collect();
    let mut pos = 0;
    while pos < chars.len() {
        if !chars[pos].is_ascii_lowercase() {
            return Err(ParseError::new(
                token.offset + pos,
                "bound variables are single lowercase letters",
            ));
        }
        let start = pos;
        pos += 1;
        while pos < chars.len() && lexer::is_subscript(chars[pos]) {
            pos += 1;
        }
        params.push(chars[start..pos].iter().collect::<String>().into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_line;

    fn name(s: &str) -> Expr {
        Expr::Name(s.into())
    }
    fn call(f: Expr, a: Expr) -> Expr {
        Expr::Call(Box::new(f), Box::new(a))
    }
    fn func(param: &str, body: Expr) -> Expr {
        Expr::Func { param: param.into(), body: Box::new(body) }
    }

    fn parse_expr(line: &str) -> Expr {
        match parse_line(line).unwrap() {
            Line::Expr(e) => e,
            other => panic!("expected an expression, got {:?}", other),
        }
    }

    #[test]
    fn application_is_left_associative() {
        assert_eq!(parse_expr("T x y"), call(call(name("T"), name("x")), name("y")));
        assert_eq!(parse_expr("(T x) y"), parse_expr("T x y"));
        assert_eq!(parse_expr("T (x y)"), call(name("T"), call(name("x"), name("y"))));
    }

    #[test]
    fn lambda_head_desugars_right_associatively() {
        let expected = func("a", func("b", name("a")));
        assert_eq!(parse_expr("λab.a"), expected);
        assert_eq!(parse_expr("λa b.a"), expected);
        assert_eq!(parse_expr("\\ab.a"), expected);
        assert_eq!(parse_expr("λa.λb.a"), expected);
    }

    #[test]
    fn lambda_head_splits_subscripted_bounds() {
        assert_eq!(parse_expr("λxy₂z.z"), func("x", func("y₂", func("z", name("z")))));
    }

    #[test]
    fn lambda_body_extends_right() {
        assert_eq!(parse_expr("λx.x x"), func("x", call(name("x"), name("x"))));
    }

    #[test]
    fn atoms() {
        assert_eq!(parse_expr("3"), Expr::Church(3));
        assert_eq!(parse_expr("$"), Expr::Hist);
        assert_eq!(parse_expr("x'"), Expr::Free("x".into()));
        assert_eq!(parse_expr("NOT"), name("NOT"));
    }

    #[test]
    fn definition_needs_column_zero() {
        assert_eq!(
            parse_line("T = λab.a").unwrap(),
            Line::Def { name: "T".into(), body: func("a", func("b", name("a"))) }
        );
        // Indented, the `=` can no longer be part of a definition.
        let err = parse_line("  T = λab.a").unwrap_err();
        assert_eq!(err.offset, 4);
    }

    #[test]
    fn definition_name_must_be_a_macro_name() {
        // `x` matches the bound pattern, so this is not a definition.
        let err = parse_line("x = λa.a").unwrap_err();
        assert_eq!(err.offset, 2);
    }

    #[test]
    fn commands() {
        assert_eq!(
            parse_line(":save /tmp/macros.lc").unwrap(),
            Line::Command { name: "save".into(), args: vec!["/tmp/macros.lc".into()] }
        );
        assert_eq!(
            parse_line("  :help").unwrap(),
            Line::Command { name: "help".into(), args: vec![] }
        );
        assert!(parse_line(":").is_err());
    }

    #[test]
    fn error_offsets() {
        assert_eq!(parse_line("λ.x").unwrap_err().offset, 1);
        assert_eq!(parse_line("(a").unwrap_err().offset, 2);
        assert_eq!(parse_line("a )").unwrap_err().offset, 2);
        assert_eq!(parse_line("λA.x").unwrap_err().offset, 1);
        assert_eq!(parse_line("ab₂").unwrap_err().offset, 0);
        assert_eq!(parse_line("").unwrap_err().offset, 0);
    }

    #[test]
    fn church_overflow_is_a_syntax_error() {
        let err = parse_line("99999999999999999999").unwrap_err();
        assert_eq!(err.offset, 0);
    }
}
