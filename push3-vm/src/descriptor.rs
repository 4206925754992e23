//! 256-bit tagged descriptors.
//!
//! Layout, most significant bits first:
//!
//! ```text
//! [ 8 bits: tag | 32 bits: offset | 32 bits: length | 184 bits: payload ]
//! ```
//!
//! `offset`/`length` are only meaningful for [`Tag::Sublist`], where they describe a
//! window into the program buffer. The payload carries the opcode id for
//! instructions, the two's-complement bits of an `i32` for integer literals and a
//! single bit for boolean literals.

use std::fmt;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use primitive_types::U256;

use crate::error::{VmError, VmResult};
use crate::opcode::Opcode;

pub const TAG_SHIFT: usize = 248;
pub const OFFSET_SHIFT: usize = 216;
pub const LENGTH_SHIFT: usize = 184;
pub const PAYLOAD_BITS: usize = 184;

#[repr(u8)]
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    None = 0,
    Instruction = 1,
    IntLiteral = 2,
    Sublist = 3,
    BoolLiteral = 4,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Descriptor(U256);

#[inline]
fn payload_mask() -> U256 {
    (U256::one() << PAYLOAD_BITS) - U256::one()
}

impl Descriptor {
    /// Build a descriptor from its four fields.
    pub fn encode(tag: Tag, offset: u32, length: u32, payload: U256) -> VmResult<Self> {
        if payload.bits() > PAYLOAD_BITS {
            return Err(VmError::PayloadOverflow {
                bits: payload.bits(),
            });
        }
        Ok(Self::pack(tag as u8, offset, length, payload))
    }

    #[inline]
    fn pack(tag: u8, offset: u32, length: u32, payload: U256) -> Self {
        Self(
            (U256::from(tag) << TAG_SHIFT)
                | (U256::from(offset) << OFFSET_SHIFT)
                | (U256::from(length) << LENGTH_SHIFT)
                | payload,
        )
    }

    pub fn instruction(opcode: Opcode) -> Self {
        Self::pack(Tag::Instruction as u8, 0, 0, U256::from(opcode as u8))
    }

    pub fn int_literal(value: i32) -> Self {
        Self::pack(Tag::IntLiteral as u8, 0, 0, U256::from(value as u32))
    }

    pub fn bool_literal(value: bool) -> Self {
        Self::pack(Tag::BoolLiteral as u8, 0, 0, U256::from(value as u8))
    }

    /// A view of `length` bytes of the program starting at `offset`.
    pub fn sublist(offset: u32, length: u32) -> Self {
        Self::pack(Tag::Sublist as u8, offset, length, U256::zero())
    }

    pub fn noop() -> Self {
        Self::instruction(Opcode::Noop)
    }

    /// Wrap a raw word supplied by a caller. Any bit pattern is accepted; an
    /// unknown tag simply has no effect when executed.
    pub const fn from_bits(bits: U256) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> U256 {
        self.0
    }

    pub fn raw_tag(&self) -> u8 {
        (self.0 >> TAG_SHIFT).low_u32() as u8
    }

    pub fn tag(&self) -> Option<Tag> {
        Tag::from_u8(self.raw_tag())
    }

    pub fn offset(&self) -> u32 {
        (self.0 >> OFFSET_SHIFT).low_u32()
    }

    pub fn length(&self) -> u32 {
        (self.0 >> LENGTH_SHIFT).low_u32()
    }

    pub fn payload(&self) -> U256 {
        self.0 & payload_mask()
    }

    /// Opcode carried by an instruction payload. Payloads that name no opcode
    /// yield `None`.
    pub fn opcode(&self) -> Option<Opcode> {
        let payload = self.payload();
        if payload.bits() > 8 {
            return None;
        }
        Opcode::from_u8(payload.low_u32() as u8)
    }

    pub fn int_value(&self) -> i32 {
        self.payload().low_u32() as i32
    }

    pub fn bool_value(&self) -> bool {
        self.payload().low_u32() & 1 == 1
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        self.0.to_big_endian(&mut out);
        out
    }

    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        Self(U256::from_big_endian(bytes))
    }
}

impl From<Opcode> for Descriptor {
    fn from(op: Opcode) -> Self {
        Self::instruction(op)
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag() {
            Some(Tag::None) => write!(f, "None"),
            Some(Tag::Instruction) => match self.opcode() {
                Some(op) => write!(f, "Instruction({op})"),
                None => write!(f, "Instruction(<unknown 0x{:x}>)", self.payload()),
            },
            Some(Tag::IntLiteral) => write!(f, "Int({})", self.int_value()),
            Some(Tag::BoolLiteral) => write!(f, "Bool({})", self.bool_value()),
            Some(Tag::Sublist) => write!(
                f,
                "Sublist(off=0x{:X}, len={})",
                self.offset(),
                self.length()
            ),
            None => write!(f, "Raw(0x{:x})", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_survive_encoding() {
        let payload = (U256::one() << 183) | U256::from(0xdead_beefu64);
        let d = Descriptor::encode(Tag::Sublist, 0x1234_5678, 0xffff_fffe, payload).unwrap();
        assert_eq!(d.tag(), Some(Tag::Sublist));
        assert_eq!(d.offset(), 0x1234_5678);
        assert_eq!(d.length(), 0xffff_fffe);
        assert_eq!(d.payload(), payload);
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let err = Descriptor::encode(Tag::Instruction, 0, 0, U256::one() << 184).unwrap_err();
        assert_eq!(err, VmError::PayloadOverflow { bits: 185 });
    }

    #[test]
    fn sublist_matches_manual_layout() {
        let expected = (U256::from(3u64) << 248) | (U256::from(7u64) << 216) | (U256::from(11u64) << 184);
        assert_eq!(Descriptor::sublist(7, 11).bits(), expected);
    }

    #[test]
    fn negative_int_literal() {
        let d = Descriptor::int_literal(-42);
        assert_eq!(d.tag(), Some(Tag::IntLiteral));
        assert_eq!(d.int_value(), -42);
        assert_eq!(d.payload(), U256::from(0xffff_ffd6u64));
        assert_eq!(Descriptor::int_literal(i32::MIN).int_value(), i32::MIN);
    }

    #[test]
    fn instruction_payload_is_opcode_id() {
        let d = Descriptor::instruction(Opcode::IntegerPlus);
        assert_eq!(d.payload(), U256::from(Opcode::IntegerPlus as u8));
        assert_eq!(d.opcode(), Some(Opcode::IntegerPlus));

        let bogus = Descriptor::encode(Tag::Instruction, 0, 0, U256::from(0x1ffu64)).unwrap();
        assert_eq!(bogus.opcode(), None);
    }

    #[test]
    fn unknown_tag_is_preserved() {
        let raw = U256::from(0x99u64) << TAG_SHIFT;
        let d = Descriptor::from_bits(raw);
        assert_eq!(d.raw_tag(), 0x99);
        assert_eq!(d.tag(), None);
        assert_eq!(Descriptor::from_be_bytes(&d.to_be_bytes()), d);
    }

    fn assert_round_trip(tag: Tag, offset: u32, length: u32, payload: U256) {
        let d = Descriptor::encode(tag, offset, length, payload).unwrap();
        assert_eq!(d.tag(), Some(tag));
        assert_eq!(d.offset(), offset);
        assert_eq!(d.length(), length);
        assert_eq!(d.payload(), payload);
        assert_eq!(Descriptor::from_be_bytes(&d.to_be_bytes()), d);
    }

    #[test]
    fn random_fields_survive_encoding() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let tags = [Tag::None, Tag::Instruction, Tag::IntLiteral, Tag::Sublist, Tag::BoolLiteral];
        let max_payload = (U256::one() << PAYLOAD_BITS) - 1;

        for tag in tags {
            for edge in [0, u32::MAX] {
                assert_round_trip(tag, edge, edge, max_payload);
                assert_round_trip(tag, edge, u32::MAX - edge, U256::zero());
            }
        }

        let mut rng = StdRng::seed_from_u64(0xd35c);
        for _ in 0..1_000 {
            let tag = tags[rng.gen_range(0..tags.len())];
            let mut raw = [0u8; 32];
            rng.fill(&mut raw);
            let payload = U256::from_big_endian(&raw) & max_payload;
            assert_round_trip(tag, rng.r#gen(), rng.r#gen(), payload);
        }
    }
}
