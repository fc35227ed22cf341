use support::descriptor::{FieldType, MethodType, ObjectType};

use crate::{error::AccessError, field::FieldAccess};

/// The only method signature an accessor for `access` may declare when it is a member
/// of `enclosing_class`.
///
/// | field    | direction | parameters              | return     |
/// |----------|-----------|-------------------------|------------|
/// | instance | read      | (enclosing)             | field type |
/// | instance | write     | (enclosing, field type) | field type |
/// | static   | read      | ()                      | field type |
/// | static   | write     | (field type)            | field type |
pub fn expected_signature(
    enclosing_class: &str,
    access: &FieldAccess,
) -> Result<MethodType, AccessError> {
    let field_type = FieldType::parse(&access.field.type_signature)?;
    let mut parameters = Vec::with_capacity(2);

    // Accessors are static, the instance is passed explicitly
    if !access.field.is_static {
        parameters.push(FieldType::Object(ObjectType::from_class_name(
            enclosing_class,
        )));
    }

    if access.direction.is_write() {
        parameters.push(field_type.clone());
    }

    // Writes return the stored value as well
    Ok(MethodType {
        parameters,
        return_type: field_type,
    })
}

/// Compare the declared descriptor against the expected one. No widening or subtyping.
pub fn is_valid_accessor(
    enclosing_class: &str,
    access: &FieldAccess,
    declared: &str,
) -> Result<bool, AccessError> {
    Ok(expected_signature(enclosing_class, access)?.to_string() == declared)
}
