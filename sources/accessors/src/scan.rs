use parse::{
    bytecode::{Instruction, Instructions},
    constants::opcode,
    pool::{ConstantEntry, ConstantPool},
};

use crate::{
    error::AccessError,
    field::{Direction, FieldAccess, FieldDescriptor},
    internal,
};

/// Running state of a scan over one method body.
enum Scan {
    Empty,
    Single(FieldAccess),
    /// More than one field access was seen, the method can never be an accessor.
    Disqualified,
}

fn field_instruction(op: u8) -> Option<(bool, Direction)> {
    match op {
        opcode::GETFIELD => Some((false, Direction::Read)),
        opcode::PUTFIELD => Some((false, Direction::Write)),
        opcode::GETSTATIC => Some((true, Direction::Read)),
        opcode::PUTSTATIC => Some((true, Direction::Write)),
        _ => None,
    }
}

fn resolve(
    insn: &Instruction,
    code: &[u8],
    pool: &ConstantPool,
    is_static: bool,
    direction: Direction,
) -> Result<FieldAccess, AccessError> {
    let index = insn.u16_operand(code)?;

    let field = match pool.get(index)? {
        ConstantEntry::Field(field) => field,
        other => {
            return Err(internal!(
                "field instruction @ {} references a {} constant (#{})",
                insn.pc,
                other.kind(),
                index
            ))
        }
    };

    let (owner_class, name, type_signature) = field.try_parts()?;

    Ok(FieldAccess {
        field: FieldDescriptor {
            owner_class,
            name,
            type_signature,
            is_static,
        },
        direction,
    })
}

/// Find the one field access in `code`.
///
/// Returns `None` when the body touches no field, or touches fields more than once
/// (even the same field twice). Instructions other than getfield, putfield, getstatic
/// and putstatic are ignored.
pub fn scan_method(code: &[u8], pool: &ConstantPool) -> Result<Option<FieldAccess>, AccessError> {
    let state = Instructions::new(code).try_fold(
        Scan::Empty,
        |state, insn| -> Result<Scan, AccessError> {
            let insn = insn?;
            let Some((is_static, direction)) = field_instruction(insn.opcode) else {
                return Ok(state);
            };

            Ok(match state {
                Scan::Empty => Scan::Single(resolve(&insn, code, pool, is_static, direction)?),
                Scan::Single(_) | Scan::Disqualified => Scan::Disqualified,
            })
        },
    )?;

    Ok(match state {
        Scan::Single(access) => Some(access),
        Scan::Empty | Scan::Disqualified => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parse::pool::{
        ConstantClass, ConstantField, ConstantMethod, ConstantNameAndType, ConstantTag,
        ConstantUtf8,
    };

    /// Builds constant pools by hand, returning the index of every inserted entry.
    #[derive(Default)]
    pub(crate) struct TestPool {
        pub(crate) pool: ConstantPool,
    }

    impl TestPool {
        fn push(&mut self, entry: ConstantEntry) -> u16 {
            self.pool.insert(entry);
            self.pool.len() as u16
        }

        pub(crate) fn utf8(&mut self, value: &str) -> u16 {
            self.push(ConstantEntry::Utf8(ConstantUtf8 {
                tag: ConstantTag::Utf8,
                length: value.len() as u16,
                bytes: value.as_bytes().to_vec(),
            }))
        }

        pub(crate) fn class(&mut self, name: &str) -> u16 {
            let name = self.utf8(name);
            let name = self.pool.address(name);
            self.push(ConstantEntry::Class(ConstantClass {
                tag: ConstantTag::Class,
                name,
            }))
        }

        fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
            let name = self.utf8(name);
            let descriptor = self.utf8(descriptor);
            let entry = ConstantEntry::NameAndType(ConstantNameAndType {
                tag: ConstantTag::NameAndType,
                name: self.pool.address(name),
                descriptor: self.pool.address(descriptor),
            });
            self.push(entry)
        }

        pub(crate) fn field(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
            let class = self.class(owner);
            let name_and_type = self.name_and_type(name, descriptor);
            let entry = ConstantEntry::Field(ConstantField {
                tag: ConstantTag::Field,
                class: self.pool.address(class),
                name_and_type: self.pool.address(name_and_type),
            });
            self.push(entry)
        }

        pub(crate) fn method(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
            let class = self.class(owner);
            let name_and_type = self.name_and_type(name, descriptor);
            let entry = ConstantEntry::Method(ConstantMethod {
                tag: ConstantTag::Method,
                class: self.pool.address(class),
                name_and_type: self.pool.address(name_and_type),
            });
            self.push(entry)
        }
    }

    pub(crate) fn op(code: u8, index: u16) -> [u8; 3] {
        let [hi, lo] = index.to_be_bytes();
        [code, hi, lo]
    }

    #[test]
    fn it_finds_a_single_instance_read() -> Result<(), AccessError> {
        let mut pool = TestPool::default();
        let x = pool.field("Foo", "x", "I");

        let code = [
            &[opcode::ALOAD_0][..],
            &op(opcode::GETFIELD, x)[..],
            &[opcode::IRETURN][..],
        ]
        .concat();
        let access = scan_method(&code, &pool.pool)?.expect("one access");

        assert_eq!(access.field, FieldDescriptor::new("Foo", "x", "I", false));
        assert_eq!(access.direction, Direction::Read);

        Ok(())
    }

    #[test]
    fn it_derives_kind_and_direction_from_the_opcode() -> Result<(), AccessError> {
        let mut pool = TestPool::default();
        let s = pool.field("Bar", "s", "Ljava/lang/String;");

        for (code, is_static, direction) in [
            (opcode::GETSTATIC, true, Direction::Read),
            (opcode::PUTSTATIC, true, Direction::Write),
            (opcode::GETFIELD, false, Direction::Read),
            (opcode::PUTFIELD, false, Direction::Write),
        ] {
            let access = scan_method(&op(code, s), &pool.pool)?.expect("one access");
            assert_eq!(access.field.is_static, is_static);
            assert_eq!(access.direction, direction);
        }

        Ok(())
    }

    #[test]
    fn it_ignores_bodies_without_field_access() -> Result<(), AccessError> {
        let mut pool = TestPool::default();
        let run = pool.method("Foo", "run", "()V");

        let code = [
            &[opcode::ALOAD_0][..],
            &op(opcode::INVOKEVIRTUAL, run)[..],
            &[opcode::RETURN][..],
        ]
        .concat();
        assert!(scan_method(&code, &pool.pool)?.is_none());
        assert!(scan_method(&[], &pool.pool)?.is_none());

        Ok(())
    }

    #[test]
    fn it_disqualifies_repeated_access() -> Result<(), AccessError> {
        let mut pool = TestPool::default();
        let x = pool.field("Foo", "x", "I");
        let y = pool.field("Foo", "y", "I");

        let same = [op(opcode::GETSTATIC, x), op(opcode::GETSTATIC, x)].concat();
        assert!(scan_method(&same, &pool.pool)?.is_none());

        // A third access must not bring the method back
        let three = [
            op(opcode::GETSTATIC, x),
            op(opcode::PUTSTATIC, y),
            op(opcode::GETSTATIC, y),
        ]
        .concat();
        assert!(scan_method(&three, &pool.pool)?.is_none());

        Ok(())
    }

    #[test]
    fn it_reads_high_pool_indices_unsigned() -> Result<(), AccessError> {
        let mut pool = TestPool::default();
        while pool.pool.len() < 0x90 {
            pool.utf8("padding");
        }
        let x = pool.field("Foo", "x", "J");
        assert!(x > 0x80);

        let access = scan_method(&op(opcode::GETSTATIC, x), &pool.pool)?.expect("one access");
        assert_eq!(access.field.name, "x");
        assert_eq!(access.field.type_signature, "J");

        Ok(())
    }

    #[test]
    fn it_reports_operands_that_are_not_field_refs() {
        let mut pool = TestPool::default();
        let run = pool.method("Foo", "run", "()V");

        let result = scan_method(&op(opcode::GETFIELD, run), &pool.pool);
        assert!(matches!(result, Err(AccessError::Internal(_))));
    }

    #[test]
    fn it_reports_undecodable_code() {
        let pool = TestPool::default();
        assert!(scan_method(&[0xcb], &pool.pool).is_err());
    }
}
