//! The closed opcode catalog.
//!
//! Ids are grouped in numeric bands and never renumbered: programs reference them
//! by raw id. New opcodes are appended inside a band (or in a new band) and get a
//! handler in [`crate::vm`]. Every id is at least [`MIN_COMPACT_OPCODE`], so each
//! opcode also has a one-byte compact encoding that cannot collide with a token
//! class byte.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use strum::{Display, EnumIter, EnumString};

/// Lowest byte value that the parser may read as a compact instruction.
pub const MIN_COMPACT_OPCODE: u8 = 0x05;

#[repr(u8)]
#[derive(
    FromPrimitive, Display, EnumString, EnumIter, Debug, Clone, Copy, PartialEq, Eq, Hash,
)]
#[strum(ascii_case_insensitive)]
pub enum Opcode {
    #[strum(to_string = "NOOP")]
    Noop = 0x00,

    #[strum(to_string = "INTEGER.+", serialize = "+", serialize = "PLUS")]
    IntegerPlus = 0x10,
    #[strum(to_string = "INTEGER.-", serialize = "-", serialize = "MINUS")]
    IntegerMinus = 0x11,
    #[strum(to_string = "INTEGER.*", serialize = "*", serialize = "MULT", serialize = "MUL")]
    IntegerMult = 0x12,
    #[strum(to_string = "INTEGER.DUP", serialize = "DUP")]
    IntegerDup = 0x13,
    #[strum(to_string = "INTEGER.POP", serialize = "POP")]
    IntegerPop = 0x14,

    #[strum(to_string = "BOOLEAN.DUP")]
    BooleanDup = 0x20,
    #[strum(to_string = "BOOLEAN.POP")]
    BooleanPop = 0x21,
    #[strum(to_string = "BOOLEAN.SWAP", serialize = "SWAP")]
    BooleanSwap = 0x22,
    #[strum(to_string = "BOOLEAN.FLUSH", serialize = "FLUSH")]
    BooleanFlush = 0x23,
    #[strum(to_string = "BOOLEAN.STACKDEPTH", serialize = "STACKDEPTH")]
    BooleanStackDepth = 0x24,
    #[strum(to_string = "BOOLEAN.NOT", serialize = "NOT")]
    BooleanNot = 0x25,
    #[strum(to_string = "BOOLEAN.AND", serialize = "AND")]
    BooleanAnd = 0x26,
    #[strum(to_string = "BOOLEAN.OR", serialize = "OR")]
    BooleanOr = 0x27,
    #[strum(to_string = "BOOLEAN.=")]
    BooleanEq = 0x28,
    #[strum(to_string = "BOOLEAN.FROMINTEGER")]
    BooleanFromInteger = 0x29,
    #[strum(to_string = "BOOLEAN.ROT", serialize = "ROT")]
    BooleanRot = 0x2A,
    #[strum(to_string = "BOOLEAN.SHOVE", serialize = "SHOVE")]
    BooleanShove = 0x2B,
    #[strum(to_string = "BOOLEAN.YANK", serialize = "YANK")]
    BooleanYank = 0x2C,
    #[strum(to_string = "BOOLEAN.YANKDUP", serialize = "YANKDUP")]
    BooleanYankDup = 0x2D,
    #[strum(to_string = "BOOLEAN.RAND")]
    BooleanRand = 0x2E,

    #[strum(to_string = "INTEGER.>", serialize = ">", serialize = "GT")]
    IntegerGt = 0x30,
    #[strum(to_string = "INTEGER.<", serialize = "<", serialize = "LT")]
    IntegerLt = 0x31,
    #[strum(to_string = "INTEGER.=", serialize = "=", serialize = "EQ")]
    IntegerEq = 0x32,
    #[strum(to_string = "INTEGER.!=", serialize = "!=", serialize = "NE")]
    IntegerNe = 0x33,
    #[strum(to_string = "INTEGER.>=", serialize = ">=", serialize = "GE")]
    IntegerGe = 0x34,
    #[strum(to_string = "INTEGER.<=", serialize = "<=", serialize = "LE")]
    IntegerLe = 0x35,

    #[strum(to_string = "INTEGER.SIN", serialize = "SIN")]
    IntegerSin = 0x40,
    #[strum(to_string = "INTEGER.COS", serialize = "COS")]
    IntegerCos = 0x41,
    #[strum(to_string = "INTEGER.SQRT", serialize = "SQRT")]
    IntegerSqrt = 0x42,
    #[strum(to_string = "INTEGER.ABS", serialize = "ABS")]
    IntegerAbs = 0x43,
    #[strum(to_string = "INTEGER.%", serialize = "%", serialize = "MOD")]
    IntegerMod = 0x44,
    #[strum(to_string = "INTEGER.POW", serialize = "POW")]
    IntegerPow = 0x45,

    #[strum(to_string = "CONST.PI", serialize = "PI")]
    ConstPi = 0x50,
    #[strum(to_string = "CONST.E", serialize = "E")]
    ConstE = 0x51,
    #[strum(to_string = "INTEGER.RAND", serialize = "RAND")]
    ConstRand = 0x52,

    #[strum(to_string = "INTEGER.FROMBOOLEAN", serialize = "BOOL_TO_INT")]
    BoolToInt = 0x60,
    #[strum(to_string = "INTEGER.TOBOOLEAN", serialize = "INT_TO_BOOL")]
    IntToBool = 0x61,

    #[strum(to_string = "EXEC.IF_THEN", serialize = "IF_THEN", serialize = "EXEC.WHEN")]
    IfThen = 0x70,
    #[strum(to_string = "EXEC.IF_ELSE", serialize = "IF_ELSE", serialize = "EXEC.IF")]
    IfElse = 0x71,
}

impl Opcode {
    /// Decode a raw opcode id. Ids outside the catalog become [`Opcode::Noop`].
    #[inline]
    pub fn decode(id: u8) -> Opcode {
        Opcode::from_u8(id).unwrap_or(Opcode::Noop)
    }

    /// Whether `byte`, met as a token class byte, is a compact instruction.
    #[inline]
    pub fn is_compact(byte: u8) -> bool {
        byte >= MIN_COMPACT_OPCODE && Opcode::from_u8(byte).is_some()
    }

    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }
}
