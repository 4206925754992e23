//! Opcode handlers.
//!
//! Every handler checks its operands before touching a stack: when a source stack
//! is too shallow the opcode does nothing and leaves the operands where they are.
//! Binary integer ops compute `second OP top`.

use super::{fixed, Int, Machine};
use crate::entropy::Entropy;
use crate::error::VmResult;
use crate::opcode::Opcode;

/// Range of `INTEGER.RAND`.
const RAND_RANGE: u64 = 1000;

/// Bottom-indexed position for a depth counted from the top. Negative depths and
/// depths past the bottom address the bottom element.
#[inline]
fn depth_to_index(len: usize, depth: Int) -> usize {
    if depth >= 0 && (depth as u128) < len as u128 {
        len - 1 - depth as usize
    } else {
        0
    }
}

impl<E: Entropy> Machine<'_, E> {
    pub(super) fn dispatch(&mut self, op: Opcode) -> VmResult<()> {
        use Opcode::*;

        match op {
            Noop => Ok(()),

            IntegerPlus => self.int_binary(|b, a| b.wrapping_add(a)),
            IntegerMinus => self.int_binary(|b, a| b.wrapping_sub(a)),
            IntegerMult => self.int_binary(|b, a| b.wrapping_mul(a)),
            IntegerDup => match self.int.top() {
                Some(v) => self.int.push(v),
                None => Ok(()),
            },
            IntegerPop => {
                self.int.pop();
                Ok(())
            }

            IntegerGt => self.int_compare(|b, a| b > a),
            IntegerLt => self.int_compare(|b, a| b < a),
            IntegerEq => self.int_compare(|b, a| b == a),
            IntegerNe => self.int_compare(|b, a| b != a),
            IntegerGe => self.int_compare(|b, a| b >= a),
            IntegerLe => self.int_compare(|b, a| b <= a),

            IntegerSin => self.int_unary(fixed::sin),
            IntegerCos => self.int_unary(fixed::cos),
            IntegerSqrt => self.int_unary(fixed::sqrt),
            IntegerAbs => self.int_unary(Int::wrapping_abs),
            IntegerMod => self.int_binary(fixed::modulo),
            IntegerPow => self.int_binary(fixed::pow),

            ConstPi => self.int.push(fixed::PI_MILLI),
            ConstE => self.int.push(fixed::E_MILLI),
            ConstRand => {
                let v = self.entropy.next_word() % RAND_RANGE;
                self.int.push(v as Int)
            }

            BoolToInt => match self.bool.pop() {
                Some(b) => self.int.push(b as Int),
                None => Ok(()),
            },
            IntToBool | BooleanFromInteger => match self.int.pop() {
                Some(v) => self.bool.push(v != 0),
                None => Ok(()),
            },

            IfThen => self.op_if_then(),
            IfElse => self.op_if_else(),

            BooleanDup => match self.bool.top() {
                Some(b) => self.bool.push(b),
                None => Ok(()),
            },
            BooleanPop => {
                self.bool.pop();
                Ok(())
            }
            BooleanSwap => {
                self.bool.swap_top();
                Ok(())
            }
            BooleanFlush => {
                self.bool.clear();
                Ok(())
            }
            BooleanStackDepth => self.int.push(self.bool.len() as Int),
            BooleanNot => match self.bool.pop() {
                Some(b) => self.bool.push(!b),
                None => Ok(()),
            },
            BooleanAnd => self.bool_binary(|b, a| b && a),
            BooleanOr => self.bool_binary(|b, a| b || a),
            BooleanEq => self.bool_binary(|b, a| b == a),
            BooleanRot => {
                self.bool.rotate3();
                Ok(())
            }
            BooleanShove => self.op_bool_shove(),
            BooleanYank => self.op_bool_yank(),
            BooleanYankDup => self.op_bool_yank_dup(),
            BooleanRand => {
                let bit = self.entropy.next_word() & 1 == 1;
                self.bool.push(bit)
            }
        }
    }

    fn int_unary(&mut self, f: impl FnOnce(Int) -> Int) -> VmResult<()> {
        match self.int.pop() {
            Some(a) => self.int.push(f(a)),
            None => Ok(()),
        }
    }

    /// `f(second, top)`.
    fn int_binary(&mut self, f: impl FnOnce(Int, Int) -> Int) -> VmResult<()> {
        match self.int.pop2() {
            Some((a, b)) => self.int.push(f(b, a)),
            None => Ok(()),
        }
    }

    fn int_compare(&mut self, f: impl FnOnce(Int, Int) -> bool) -> VmResult<()> {
        match self.int.pop2() {
            Some((a, b)) => self.bool.push(f(b, a)),
            None => Ok(()),
        }
    }

    fn bool_binary(&mut self, f: impl FnOnce(bool, bool) -> bool) -> VmResult<()> {
        match self.bool.pop2() {
            Some((a, b)) => self.bool.push(f(b, a)),
            None => Ok(()),
        }
    }

    /// A false condition drops the next pending exec item, if there is one.
    fn op_if_then(&mut self) -> VmResult<()> {
        if let Some(cond) = self.bool.pop() {
            if !cond {
                self.exec.pop();
            }
        }
        Ok(())
    }

    /// `[.., else, then]` on exec becomes `[.., then]` or `[.., else]`.
    fn op_if_else(&mut self) -> VmResult<()> {
        if self.bool.is_empty() || self.exec.len() < 2 {
            return Ok(());
        }
        let (Some(cond), Some((then, otherwise))) = (self.bool.pop(), self.exec.pop2()) else {
            return Ok(());
        };
        self.exec.push(if cond { then } else { otherwise })
    }

    fn op_bool_yank_dup(&mut self) -> VmResult<()> {
        if self.int.is_empty() || self.bool.is_empty() {
            return Ok(());
        }
        let Some(depth) = self.int.pop() else {
            return Ok(());
        };
        let index = depth_to_index(self.bool.len(), depth);
        match self.bool.get(index) {
            Some(b) => self.bool.push(b),
            None => Ok(()),
        }
    }

    fn op_bool_yank(&mut self) -> VmResult<()> {
        if self.int.is_empty() || self.bool.is_empty() {
            return Ok(());
        }
        let Some(depth) = self.int.pop() else {
            return Ok(());
        };
        let index = depth_to_index(self.bool.len(), depth);
        match self.bool.remove(index) {
            Some(b) => self.bool.push(b),
            None => Ok(()),
        }
    }

    fn op_bool_shove(&mut self) -> VmResult<()> {
        if self.int.is_empty() || self.bool.is_empty() {
            return Ok(());
        }
        let (Some(depth), Some(value)) = (self.int.pop(), self.bool.pop()) else {
            return Ok(());
        };
        // depth == remaining length lands at the bottom
        let remaining = self.bool.len();
        let index = if depth >= 0 && (depth as u128) <= remaining as u128 {
            remaining - depth as usize
        } else {
            0
        };
        self.bool.insert(index, value)
    }
}
