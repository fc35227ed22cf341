//! Walks the raw bytes of a `Code` attribute one instruction at a time.
//!
//! The decoder only knows how long each instruction is; it does not interpret operands.
//! Consumers receive the opcode and the offset of the opcode byte, operands (if any)
//! start at `pc + 1`.

use anyhow::{anyhow, Result};
use support::bytes_ext::SafeBuf;

use crate::constants::opcode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: u8,
    pub pc: usize,
}

impl Instruction {
    /// Read the unsigned, big-endian u16 operand that immediately follows the opcode,
    /// as used by the field, method and type instructions to index the constant pool.
    pub fn u16_operand(&self, code: &[u8]) -> Result<u16> {
        let hi = *code
            .get(self.pc + 1)
            .ok_or(anyhow!("missing operand @ {}", self.pc + 1))?;
        let lo = *code
            .get(self.pc + 2)
            .ok_or(anyhow!("missing operand @ {}", self.pc + 2))?;

        Ok(u16::from(hi) << 8 | u16::from(lo))
    }
}

pub struct Instructions<'a> {
    code: &'a [u8],
    pc: usize,
    failed: bool,
}

impl<'a> Instructions<'a> {
    pub fn new(code: &'a [u8]) -> Self {
        Self {
            code,
            pc: 0,
            failed: false,
        }
    }

    fn operands(&self, from: usize) -> Result<&'a [u8]> {
        self.code
            .get(from..)
            .ok_or(anyhow!("operands start past the end of the code @ {}", from))
    }

    /// The total encoded length of the instruction at `pc`, opcode byte included.
    fn length(&self, pc: usize, op: u8) -> Result<usize> {
        Ok(match op {
            opcode::BIPUSH | opcode::LDC | opcode::NEWARRAY | opcode::RET => 2,
            opcode::ILOAD..=opcode::ALOAD | opcode::ISTORE..=opcode::ASTORE => 2,

            opcode::SIPUSH
            | opcode::LDC_W
            | opcode::LDC2_W
            | opcode::IINC
            | opcode::NEW
            | opcode::ANEWARRAY
            | opcode::CHECKCAST
            | opcode::INSTANCEOF
            | opcode::IFNULL
            | opcode::IFNONNULL => 3,
            opcode::IFEQ..=opcode::JSR => 3,
            opcode::GETSTATIC..=opcode::INVOKESTATIC => 3,

            opcode::MULTIANEWARRAY => 4,
            opcode::INVOKEINTERFACE | opcode::INVOKEDYNAMIC => 5,
            opcode::GOTO_W | opcode::JSR_W => 5,

            opcode::WIDE => {
                let modified = *self
                    .code
                    .get(pc + 1)
                    .ok_or(anyhow!("wide without a modified opcode"))?;

                match modified {
                    opcode::IINC => 6,
                    opcode::ILOAD..=opcode::ALOAD
                    | opcode::ISTORE..=opcode::ASTORE
                    | opcode::RET => 4,
                    other => return Err(anyhow!("unknown wide opcode {:#04x}", other)),
                }
            }

            opcode::TABLESWITCH => {
                let padding = switch_padding(pc);
                let mut operands = self.operands(pc + 1 + padding)?;

                let _default = operands.try_get_i32()?;
                let low = operands.try_get_i32()?;
                let high = operands.try_get_i32()?;

                if low > high {
                    return Err(anyhow!("tableswitch low {} is above high {}", low, high));
                }

                let entries = (i64::from(high) - i64::from(low) + 1) as usize;
                1 + padding + 12 + entries * 4
            }

            opcode::LOOKUPSWITCH => {
                let padding = switch_padding(pc);
                let mut operands = self.operands(pc + 1 + padding)?;

                let _default = operands.try_get_i32()?;
                let pairs = operands.try_get_i32()?;

                if pairs < 0 {
                    return Err(anyhow!("lookupswitch has negative pair count {}", pairs));
                }

                1 + padding + 8 + pairs as usize * 8
            }

            // Constants, implicit local loads/stores, stack, math, conversions,
            // comparisons, returns, arraylength, athrow, monitors
            0x00..=0x0f | 0x1a..=0x35 | 0x3b..=0x83 | 0x85..=0x98 | 0xac..=0xb1 => 1,
            0xbe | 0xbf | 0xc2 | 0xc3 => 1,

            // Reserved: breakpoint, impdep1, impdep2
            0xca | 0xfe | 0xff => 1,

            e => return Err(anyhow!("unknown opcode {:#04x}", e)),
        })
    }
}

/// Switch operands are aligned to a multiple of 4 from the start of the method.
fn switch_padding(pc: usize) -> usize {
    (4 - (pc + 1) % 4) % 4
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pc >= self.code.len() {
            return None;
        }

        let pc = self.pc;
        let op = self.code[pc];

        let decoded = self.length(pc, op).and_then(|length| {
            if pc + length > self.code.len() {
                Err(anyhow!("instruction {:#04x} is truncated", op))
            } else {
                Ok(length)
            }
        });

        match decoded {
            Ok(length) => {
                self.pc += length;
                Some(Ok(Instruction { opcode: op, pc }))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e.context(format!("at bytecode offset {}", pc))))
            }
        }
    }
}
