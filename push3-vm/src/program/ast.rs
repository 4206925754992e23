use std::{fmt, mem, slice};

use anyhow::{bail, Result};
use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

use crate::opcode::Opcode;
use crate::parser::{self, TokenKind, Tokens, TOKEN_BOOL, TOKEN_INT, TOKEN_NOOP, TOKEN_SUBLIST};

/// A program as a tree, before it is flattened into bytecode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ast {
    Sublist(Vec<Ast>),
    Int(i32),
    Bool(bool),
    Instruction(Opcode),
}

impl Ast {
    /// Number of nodes, counting every sublist as one node plus its children.
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            if let Ast::Sublist(items) = node {
                pending.extend(items);
            }
        }
        count
    }

    /// Deepest sublist nesting; a leaf is depth 0.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 0)];
        while let Some((node, level)) = pending.pop() {
            if let Ast::Sublist(items) = node {
                deepest = deepest.max(level + 1);
                pending.extend(items.iter().map(|item| (item, level + 1)));
            }
        }
        deepest
    }

    /// Flatten to bytecode. Sublist lengths are patched in once their body is
    /// written, so nesting depth costs heap rather than call stack.
    pub fn to_bytecode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        // open sublists: children left to write, and where the body starts
        let mut open: Vec<(slice::Iter<'_, Ast>, usize)> = Vec::new();
        let mut next = Some(self);
        loop {
            match next.take() {
                Some(Ast::Sublist(items)) => {
                    out.push(TOKEN_SUBLIST);
                    out.write_u16::<BigEndian>(0)?;
                    open.push((items.iter(), out.len()));
                }
                Some(Ast::Instruction(Opcode::Noop)) => out.push(TOKEN_NOOP),
                Some(Ast::Instruction(op)) => out.push(op.id()),
                Some(Ast::Int(v)) => {
                    out.push(TOKEN_INT);
                    out.write_i32::<BigEndian>(*v)?;
                }
                Some(Ast::Bool(b)) => {
                    out.push(TOKEN_BOOL);
                    out.push(*b as u8);
                }
                None => {}
            }

            let Some((items, body_start)) = open.last_mut() else {
                break;
            };
            if let Some(item) = items.next() {
                next = Some(item);
                continue;
            }
            let body_start = *body_start;
            open.pop();
            let body_len = out.len() - body_start;
            let Ok(length) = u16::try_from(body_len) else {
                bail!(
                    "sublist body is {} bytes, more than a sublist can hold ({})",
                    body_len,
                    u16::MAX
                );
            };
            BigEndian::write_u16(&mut out[body_start - 2..body_start], length);
        }
        Ok(out)
    }

    /// Rebuild the tree from bytecode, reading tokens the same way the machine
    /// does. A single top-level token is returned as is; anything else is wrapped
    /// in a sublist.
    pub fn from_bytecode(bytes: &[u8]) -> Ast {
        // enclosing windows with the items read so far, innermost last
        let mut outer: Vec<(Tokens<'_>, Vec<Ast>)> = Vec::new();
        let mut tokens = parser::tokens(bytes, 0, bytes.len() as u32);
        let mut items = Vec::new();
        loop {
            match tokens.next().map(|t| t.kind) {
                Some(TokenKind::Sublist { offset, length }) => {
                    let inner = parser::tokens(bytes, offset, length);
                    outer.push((mem::replace(&mut tokens, inner), mem::take(&mut items)));
                }
                Some(leaf) => items.extend(Ast::leaf(leaf)),
                None => match outer.pop() {
                    Some((parent_tokens, mut parent_items)) => {
                        parent_items.push(Ast::Sublist(mem::take(&mut items)));
                        tokens = parent_tokens;
                        items = parent_items;
                    }
                    None => break,
                },
            }
        }
        if items.len() == 1 {
            items.remove(0)
        } else {
            Ast::Sublist(items)
        }
    }

    /// The node for a non-sublist token.
    pub(super) fn leaf(kind: TokenKind) -> Option<Ast> {
        match kind {
            TokenKind::Instruction(op) => Some(Ast::Instruction(op)),
            TokenKind::Int(v) => Some(Ast::Int(v)),
            TokenKind::Bool(b) => Some(Ast::Bool(b)),
            TokenKind::Sublist { .. } => None,
        }
    }
}

impl From<Opcode> for Ast {
    fn from(op: Opcode) -> Self {
        Ast::Instruction(op)
    }
}

impl From<i32> for Ast {
    fn from(v: i32) -> Self {
        Ast::Int(v)
    }
}

impl From<bool> for Ast {
    fn from(b: bool) -> Self {
        Ast::Bool(b)
    }
}

/// S-expression form, readable by [`read_sexpr`](super::read_sexpr).
impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // open sublists: children left to print, and whether one was printed
        let mut open: Vec<(slice::Iter<'_, Ast>, bool)> = Vec::new();
        let mut next = Some(self);
        loop {
            match next.take() {
                Some(Ast::Sublist(items)) => {
                    f.write_str("(")?;
                    open.push((items.iter(), false));
                }
                Some(Ast::Int(v)) => write!(f, "{v}")?,
                Some(Ast::Bool(true)) => f.write_str("TRUE")?,
                Some(Ast::Bool(false)) => f.write_str("FALSE")?,
                Some(Ast::Instruction(op)) => write!(f, "{op}")?,
                None => {}
            }

            let Some((items, started)) = open.last_mut() else {
                return Ok(());
            };
            match items.next() {
                Some(item) => {
                    if *started {
                        f.write_str(" ")?;
                    }
                    *started = true;
                    next = Some(item);
                }
                None => {
                    open.pop();
                    f.write_str(")")?;
                }
            }
        }
    }
}
