use serde::{Deserialize, Serialize};

use super::Ast;
use crate::parser::{self, TokenKind};

/// One decoded token, in buffer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    pub offset: u32,
    /// Sublist nesting level; top-level tokens are 0.
    pub depth: usize,
    pub mnemonic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operand: Option<String>,
}

impl ListingEntry {
    /// `0x0003   INTEGER.+` style line, indented by depth.
    pub fn to_line(&self) -> String {
        let indent = "  ".repeat(self.depth);
        match &self.operand {
            Some(operand) => format!("0x{:04X}  {}{} {}", self.offset, indent, self.mnemonic, operand),
            None => format!("0x{:04X}  {}{}", self.offset, indent, self.mnemonic),
        }
    }
}

/// Flat listing of every token, sublist bodies included.
pub fn listing(bytes: &[u8]) -> Vec<ListingEntry> {
    let mut out = Vec::new();
    // open windows, innermost last
    let mut windows = vec![parser::tokens(bytes, 0, bytes.len() as u32)];
    while let Some(tokens) = windows.last_mut() {
        let Some(token) = tokens.next() else {
            windows.pop();
            continue;
        };
        let depth = windows.len() - 1;
        let (mnemonic, operand) = match token.kind {
            TokenKind::Instruction(op) => (op.to_string(), None),
            TokenKind::Int(v) => ("INT".to_string(), Some(v.to_string())),
            TokenKind::Bool(b) => ("BOOL".to_string(), Some(if b { "TRUE" } else { "FALSE" }.to_string())),
            TokenKind::Sublist { length, .. } => ("SUBLIST".to_string(), Some(length.to_string())),
        };
        out.push(ListingEntry {
            offset: token.offset,
            depth,
            mnemonic,
            operand,
        });
        if let TokenKind::Sublist { offset, length } = token.kind {
            windows.push(parser::tokens(bytes, offset, length));
        }
    }
    out
}

/// Bytecode back to S-expression source, straight from the tokens.
pub fn to_sexpr(bytes: &[u8]) -> String {
    let len = bytes.len() as u32;
    // a lone top-level token prints bare, like Ast::from_bytecode
    let wrapped = parser::tokens(bytes, 0, len).count() != 1;
    let mut out = String::new();
    if wrapped {
        out.push('(');
    }
    let mut windows = vec![(parser::tokens(bytes, 0, len), false)];
    while let Some((tokens, started)) = windows.last_mut() {
        let Some(token) = tokens.next() else {
            windows.pop();
            if wrapped || !windows.is_empty() {
                out.push(')');
            }
            continue;
        };
        if *started {
            out.push(' ');
        }
        *started = true;
        match Ast::leaf(token.kind) {
            Some(leaf) => out.push_str(&leaf.to_string()),
            None => {
                if let TokenKind::Sublist { offset, length } = token.kind {
                    out.push('(');
                    windows.push((parser::tokens(bytes, offset, length), false));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(offset: u32, depth: usize, mnemonic: &str, operand: Option<&str>) -> ListingEntry {
        ListingEntry {
            offset,
            depth,
            mnemonic: mnemonic.to_string(),
            operand: operand.map(str::to_string),
        }
    }

    #[test]
    fn lists_nested_tokens() {
        let code = [0x04, 0x00, 0x03, 0x03, 0x01, 0x22, 0x00, 0x02, 0x00, 0x00, 0x00, 0x07];
        assert_eq!(
            listing(&code),
            vec![
                entry(0, 0, "SUBLIST", Some("3")),
                entry(3, 1, "BOOL", Some("TRUE")),
                entry(5, 1, "BOOLEAN.SWAP", None),
                entry(6, 0, "NOOP", None),
                entry(7, 0, "INT", Some("7")),
            ]
        );
    }

    #[test]
    fn lines_are_indented() {
        assert_eq!(entry(5, 1, "BOOLEAN.SWAP", None).to_line(), "0x0005    BOOLEAN.SWAP");
        assert_eq!(entry(7, 0, "INT", Some("7")).to_line(), "0x0007  INT 7");
    }

    #[test]
    fn truncated_tail_is_left_out() {
        let code = [0x10, 0x02, 0x00];
        assert_eq!(listing(&code), vec![entry(0, 0, "INTEGER.+", None)]);
    }

    #[test]
    fn sexpr_of_bytecode() {
        let code = [0x04, 0x00, 0x0B, 0x02, 0, 0, 0, 10, 0x02, 0, 0, 0, 32, 0x10];
        assert_eq!(to_sexpr(&code), "(10 32 INTEGER.+)");
        assert_eq!(to_sexpr(&[0x13, 0x12]), "(INTEGER.DUP INTEGER.*)");
    }

    /// `depth` sublists, each holding only the next, around one INTEGER.DUP.
    fn nested(depth: usize) -> Vec<u8> {
        let total = 3 * depth + 1;
        let mut code = Vec::with_capacity(total);
        for level in 0..depth {
            let body = (total - 3 * (level + 1)) as u16;
            code.push(0x04);
            code.extend_from_slice(&body.to_be_bytes());
        }
        code.push(0x13);
        code
    }

    #[test]
    fn deep_nesting_stays_off_the_call_stack() {
        const DEPTH: usize = 20_000;
        // a thread stack far too small for one frame per level
        let worker = std::thread::Builder::new()
            .stack_size(128 * 1024)
            .spawn(|| {
                let code = nested(DEPTH);
                (listing(&code), to_sexpr(&code))
            })
            .unwrap();
        let (entries, text) = worker.join().unwrap();

        assert_eq!(entries.len(), DEPTH + 1);
        assert_eq!(entries[DEPTH], entry(3 * DEPTH as u32, DEPTH, "INTEGER.DUP", None));
        assert_eq!(entries[1], entry(3, 1, "SUBLIST", Some((3 * (DEPTH - 2) + 1).to_string().as_str())));
        assert_eq!(text.len(), 2 * DEPTH + "INTEGER.DUP".len());
        assert!(text.starts_with("(((") && text.ends_with("INTEGER.DUP)))"));
    }

    #[test]
    fn sexpr_of_a_lone_token_is_bare() {
        assert_eq!(to_sexpr(&[0x02, 0, 0, 0, 7]), "7");
        assert_eq!(to_sexpr(&[0x04, 0x00, 0x00]), "()");
        assert_eq!(to_sexpr(&[]), "()");
    }
}
