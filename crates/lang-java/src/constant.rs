use crate::error::{ClassScanError, Result};
use ristretto_classfile::attributes::Attribute;
use ristretto_classfile::{ClassFile, Constant, FieldAccessFlags};
use std::io::Cursor;

pub(crate) fn parse_class(bytes: &[u8]) -> Result<ClassFile> {
    ClassFile::from_bytes(&mut Cursor::new(bytes.to_vec())).map_err(ClassScanError::format)
}

/// Value of the static field `field_name` rendered as a string.
///
/// Returns `None` when the class has no static field of that name, or when
/// the field carries no `ConstantValue` attribute (it is then assigned in
/// `<clinit>` and cannot be read without executing code).
pub(crate) fn static_constant(class: &ClassFile, field_name: &str) -> Result<Option<String>> {
    for field in &class.fields {
        let name = class
            .constant_pool
            .try_get_utf8(field.name_index)
            .map_err(ClassScanError::format)?;
        if name != field_name || !field.access_flags.contains(FieldAccessFlags::STATIC) {
            continue;
        }

        for attribute in &field.attributes {
            if let Attribute::ConstantValue {
                constant_value_index,
                ..
            } = attribute
            {
                return constant_to_string(class, *constant_value_index).map(Some);
            }
        }
        return Ok(None);
    }
    Ok(None)
}

fn constant_to_string(class: &ClassFile, index: u16) -> Result<String> {
    match class.constant_pool.get(index) {
        Some(Constant::String(utf8_index)) => Ok(class
            .constant_pool
            .try_get_utf8(*utf8_index)
            .map_err(ClassScanError::format)?
            .to_string()),
        Some(Constant::Integer(value)) => Ok(value.to_string()),
        Some(Constant::Long(value)) => Ok(value.to_string()),
        Some(Constant::Float(value)) => Ok(value.to_string()),
        Some(Constant::Double(value)) => Ok(value.to_string()),
        Some(other) => Err(ClassScanError::UnexpectedConstant {
            index,
            found: format!("{other:?}"),
        }),
        None => Err(ClassScanError::MissingConstant(index)),
    }
}

/// Parse `class_bytes` and read one static constant field.
pub fn read_static_constant(class_bytes: &[u8], field_name: &str) -> Result<Option<String>> {
    let class = parse_class(class_bytes)?;
    static_constant(&class, field_name)
}

/// Read a constant split across `field_name`, `field_name_1`, `field_name_2`,
/// ... and join the parts in order. `None` when the first part is absent.
pub fn read_split_constant(class_bytes: &[u8], field_name: &str) -> Result<Option<String>> {
    let class = parse_class(class_bytes)?;
    let Some(mut value) = static_constant(&class, field_name)? else {
        return Ok(None);
    };
    for part in 1.. {
        match static_constant(&class, &format!("{field_name}_{part}"))? {
            Some(next) => value.push_str(&next),
            None => break,
        }
    }
    Ok(Some(value))
}
