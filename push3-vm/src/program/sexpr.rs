use std::str::FromStr;

use anyhow::{anyhow, bail, Result};

use super::Ast;
use crate::opcode::Opcode;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Lexeme<'a> {
    Open,
    Close,
    Atom(&'a str),
}

struct Lexer<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            line: 1,
        }
    }

    fn skip_blank(&mut self) {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                b';' => {
                    while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                c if c.is_ascii_whitespace() => self.pos += 1,
                _ => break,
            }
        }
    }

    fn next_lexeme(&mut self) -> Option<(Lexeme<'a>, usize)> {
        self.skip_blank();
        let bytes = self.text.as_bytes();
        let start = self.pos;
        let lexeme = match *bytes.get(start)? {
            b'(' => {
                self.pos += 1;
                Lexeme::Open
            }
            b')' => {
                self.pos += 1;
                Lexeme::Close
            }
            _ => {
                while self.pos < bytes.len()
                    && !bytes[self.pos].is_ascii_whitespace()
                    && !matches!(bytes[self.pos], b'(' | b')' | b';')
                {
                    self.pos += 1;
                }
                Lexeme::Atom(&self.text[start..self.pos])
            }
        };
        Some((lexeme, self.line))
    }
}

fn atom(text: &str, line: usize) -> Result<Ast> {
    if let Ok(v) = text.parse::<i64>() {
        let v = i32::try_from(v)
            .map_err(|_| anyhow!("line {line}: integer literal {text} does not fit in 32 bits"))?;
        return Ok(Ast::Int(v));
    }
    if text.eq_ignore_ascii_case("TRUE") {
        return Ok(Ast::Bool(true));
    }
    if text.eq_ignore_ascii_case("FALSE") {
        return Ok(Ast::Bool(false));
    }
    Opcode::from_str(text)
        .map(Ast::Instruction)
        .map_err(|_| anyhow!("line {line}: unknown instruction `{text}`"))
}

/// Read a program written as an S-expression.
///
/// Atoms are integer literals, `TRUE`/`FALSE` or instruction mnemonics (any case).
/// `;` starts a comment that runs to the end of the line. Several top-level forms
/// are wrapped in one sublist.
pub fn read_sexpr(text: &str) -> Result<Ast> {
    let mut lexer = Lexer::new(text);
    // innermost open sublist last, with the line it opened on
    let mut open: Vec<(Vec<Ast>, usize)> = Vec::new();
    let mut top = Vec::new();

    while let Some((lexeme, line)) = lexer.next_lexeme() {
        let node = match lexeme {
            Lexeme::Open => {
                open.push((Vec::new(), line));
                continue;
            }
            Lexeme::Close => match open.pop() {
                Some((items, _)) => Ast::Sublist(items),
                None => bail!("line {line}: unmatched `)`"),
            },
            Lexeme::Atom(text) => atom(text, line)?,
        };
        match open.last_mut() {
            Some((items, _)) => items.push(node),
            None => top.push(node),
        }
    }

    if let Some((_, line)) = open.last() {
        bail!("line {line}: `(` is never closed");
    }
    match top.len() {
        0 => bail!("program is empty"),
        1 => Ok(top.remove(0)),
        _ => Ok(Ast::Sublist(top)),
    }
}
