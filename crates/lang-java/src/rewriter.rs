use crate::constant::parse_class;
use crate::error::{ClassScanError, Result};
use jarweave_plugin::{BoxError, HolderRules, InjectorRewriter, MergedMetadata};
use ristretto_classfile::attributes::Attribute;
use ristretto_classfile::{ClassFile, ConstantPool, Field, FieldAccessFlags, FieldType};
use std::collections::BTreeMap;

const STRING_DESCRIPTOR: &str = "Ljava/lang/String;";

/// Largest `CONSTANT_Utf8` payload a class file can hold.
const MAX_UTF8_BYTES: usize = u16::MAX as usize;

/// Embeds the merged metadata into the injector class as
/// `public static final String` constants.
///
/// The route-map field holds a JSON array of fragments, the flow-task field a
/// JSON object of task to dependency declaration. Both are sorted so the same
/// inputs always yield the same class bytes. A value too long for one
/// constant continues in `<field>_1`, `<field>_2`, ... and reads back by
/// concatenation (see `read_split_constant`). Every other member of the
/// source class is kept as is.
pub struct ConstantFieldInjector {
    route_map_field: String,
    flow_task_field: String,
}

impl ConstantFieldInjector {
    pub fn new(route_map_field: impl Into<String>, flow_task_field: impl Into<String>) -> Self {
        Self {
            route_map_field: route_map_field.into(),
            flow_task_field: flow_task_field.into(),
        }
    }

    pub fn from_rules(rules: &HolderRules) -> Self {
        Self::new(rules.route_map_field(), rules.flow_task_field())
    }

    pub fn rewrite_class(&self, source: &[u8], metadata: &MergedMetadata) -> Result<Vec<u8>> {
        let mut class = parse_class(source)?;

        let route_maps = serde_json::to_string(&metadata.route_maps)?;
        let flow_tasks: BTreeMap<&str, &str> = metadata
            .flow_tasks
            .iter()
            .map(|(task, depends_on)| (task.as_str(), depends_on.as_str()))
            .collect();
        let flow_tasks = serde_json::to_string(&flow_tasks)?;

        let ClassFile {
            constant_pool,
            fields,
            ..
        } = &mut class;

        fields.retain(|field| match constant_pool.try_get_utf8(field.name_index) {
            Ok(name) => {
                !is_part_of(name, &self.route_map_field) && !is_part_of(name, &self.flow_task_field)
            }
            Err(_) => true,
        });

        for (field, value) in [
            (&self.route_map_field, &route_maps),
            (&self.flow_task_field, &flow_tasks),
        ] {
            for (part, chunk) in split_constant(value, MAX_UTF8_BYTES).into_iter().enumerate() {
                let name = match part {
                    0 => field.clone(),
                    n => format!("{field}_{n}"),
                };
                fields.push(string_constant_field(constant_pool, &name, chunk)?);
            }
        }

        let mut bytes = Vec::new();
        class.to_bytes(&mut bytes).map_err(ClassScanError::format)?;
        Ok(bytes)
    }
}

/// `name` is `field` itself or one of its numbered continuations.
fn is_part_of(name: &str, field: &str) -> bool {
    match name.strip_prefix(field) {
        Some("") => true,
        Some(rest) => rest
            .strip_prefix('_')
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit())),
        None => false,
    }
}

/// Bytes `c` takes in the class file's modified UTF-8.
fn encoded_len(c: char) -> usize {
    match c as u32 {
        0 => 2,
        0x01..=0x7F => 1,
        0x80..=0x7FF => 2,
        0x800..=0xFFFF => 3,
        _ => 6,
    }
}

/// Cut `value` on char boundaries into pieces of at most `limit` encoded
/// bytes. Always yields at least one piece.
fn split_constant(value: &str, limit: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut size = 0;
    for (at, c) in value.char_indices() {
        let len = encoded_len(c);
        if size + len > limit {
            chunks.push(&value[start..at]);
            start = at;
            size = 0;
        }
        size += len;
    }
    chunks.push(&value[start..]);
    chunks
}

fn string_constant_field(pool: &mut ConstantPool, name: &str, value: &str) -> Result<Field> {
    let name_index = pool.add_utf8(name).map_err(ClassScanError::format)?;
    let descriptor_index = pool
        .add_utf8(STRING_DESCRIPTOR)
        .map_err(ClassScanError::format)?;
    let attribute_name_index = pool
        .add_utf8("ConstantValue")
        .map_err(ClassScanError::format)?;
    let constant_value_index = pool.add_string(value).map_err(ClassScanError::format)?;
    let field_type =
        FieldType::parse(&STRING_DESCRIPTOR.to_string()).map_err(ClassScanError::format)?;

    Ok(Field {
        access_flags: FieldAccessFlags::PUBLIC | FieldAccessFlags::STATIC | FieldAccessFlags::FINAL,
        name_index,
        descriptor_index,
        field_type,
        attributes: vec![Attribute::ConstantValue {
            name_index: attribute_name_index,
            constant_value_index,
        }],
    })
}

impl InjectorRewriter for ConstantFieldInjector {
    fn rewrite(
        &self,
        source: &[u8],
        metadata: &MergedMetadata,
    ) -> std::result::Result<Vec<u8>, BoxError> {
        Ok(self.rewrite_class(source, metadata)?)
    }
}
