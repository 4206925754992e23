//! Bytecode tokenizer.
//!
//! Wire format, one token after another (multi-byte fields are big-endian):
//!
//! | leading byte | token                                                  |
//! |--------------|--------------------------------------------------------|
//! | `0x00`       | no-op                                                  |
//! | `0x01`       | instruction, next byte is the opcode id                |
//! | `0x02`       | integer literal, next 4 bytes (i32)                    |
//! | `0x03`       | boolean literal, next byte (low bit)                   |
//! | `0x04`       | sublist, next 2 bytes are the body length, body follows|
//! | opcode id    | compact instruction                                    |
//! | anything else| no-op                                                  |
//!
//! A token whose fields would run past the window or the buffer ends the scan;
//! whatever was read before it is the result. Sublist bodies are not descended
//! into: the token only records where the body is.

use byteorder::{BigEndian, ByteOrder};

use crate::descriptor::Descriptor;
use crate::opcode::Opcode;

pub const TOKEN_NOOP: u8 = 0x00;
pub const TOKEN_INSTRUCTION: u8 = 0x01;
pub const TOKEN_INT: u8 = 0x02;
pub const TOKEN_BOOL: u8 = 0x03;
pub const TOKEN_SUBLIST: u8 = 0x04;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Instruction(Opcode),
    Int(i32),
    Bool(bool),
    /// Body window `[offset, offset + length)` in the program buffer.
    Sublist { offset: u32, length: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Position of the token's leading byte.
    pub offset: u32,
    /// Encoded size, including the leading byte and a sublist body.
    pub size: u32,
    pub kind: TokenKind,
}

impl Token {
    pub fn descriptor(&self) -> Descriptor {
        match self.kind {
            TokenKind::Instruction(op) => Descriptor::instruction(op),
            TokenKind::Int(v) => Descriptor::int_literal(v),
            TokenKind::Bool(b) => Descriptor::bool_literal(b),
            TokenKind::Sublist { offset, length } => Descriptor::sublist(offset, length),
        }
    }
}

/// Iterator over the tokens of one window.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    bytes: &'a [u8],
    cursor: usize,
    end: usize,
    truncated: bool,
}

impl<'a> Tokens<'a> {
    pub fn new(bytes: &'a [u8], offset: u32, length: u32) -> Self {
        let start = offset as usize;
        let end = start.saturating_add(length as usize);
        Self {
            bytes,
            cursor: start,
            end,
            truncated: false,
        }
    }

    /// True once the scan stopped at a token that did not fit.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    #[inline]
    fn fits(&self, from: usize, need: usize) -> bool {
        match from.checked_add(need) {
            Some(stop) => stop <= self.end && stop <= self.bytes.len(),
            None => false,
        }
    }

    fn stop(&mut self) -> Option<Token> {
        log::debug!(
            "truncated token at 0x{:X} (window end 0x{:X}, buffer len 0x{:X})",
            self.cursor,
            self.end,
            self.bytes.len()
        );
        self.truncated = true;
        self.cursor = self.end;
        None
    }
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.truncated || !self.fits(self.cursor, 1) {
            return None;
        }

        let start = self.cursor;
        let lead = self.bytes[start];
        let body = start + 1;

        let (kind, size) = match lead {
            TOKEN_NOOP => (TokenKind::Instruction(Opcode::Noop), 1),
            TOKEN_INSTRUCTION => {
                if !self.fits(body, 1) {
                    return self.stop();
                }
                (TokenKind::Instruction(Opcode::decode(self.bytes[body])), 2)
            }
            TOKEN_INT => {
                if !self.fits(body, 4) {
                    return self.stop();
                }
                let v = BigEndian::read_i32(&self.bytes[body..body + 4]);
                (TokenKind::Int(v), 5)
            }
            TOKEN_BOOL => {
                if !self.fits(body, 1) {
                    return self.stop();
                }
                (TokenKind::Bool(self.bytes[body] & 1 == 1), 2)
            }
            TOKEN_SUBLIST => {
                if !self.fits(body, 2) {
                    return self.stop();
                }
                let length = BigEndian::read_u16(&self.bytes[body..body + 2]) as usize;
                let sub_start = body + 2;
                if !self.fits(sub_start, length) {
                    return self.stop();
                }
                (
                    TokenKind::Sublist {
                        offset: sub_start as u32,
                        length: length as u32,
                    },
                    3 + length,
                )
            }
            b if Opcode::is_compact(b) => (TokenKind::Instruction(Opcode::decode(b)), 1),
            _ => (TokenKind::Instruction(Opcode::Noop), 1),
        };

        self.cursor = start + size;
        Some(Token {
            offset: start as u32,
            size: size as u32,
            kind,
        })
    }
}

/// Tokenize `[offset, offset + length)` of `bytes`.
pub fn tokens(bytes: &[u8], offset: u32, length: u32) -> Tokens<'_> {
    Tokens::new(bytes, offset, length)
}

/// Parse one window into descriptors, in buffer order.
///
/// Never fails: a malformed tail is dropped and the valid prefix is returned.
pub fn parse_window(bytes: &[u8], offset: u32, length: u32) -> Vec<Descriptor> {
    tokens(bytes, offset, length).map(|t| t.descriptor()).collect()
}

/// Whether a sublist window lies inside the buffer.
#[inline]
pub fn window_in_bounds(bytes: &[u8], offset: u32, length: u32) -> bool {
    (offset as u64) + (length as u64) <= bytes.len() as u64
}
