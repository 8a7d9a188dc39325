//! Minimal class-file encoder for building test fixtures.
//!
//! Produces a Java 8 class extending `java/lang/Object` with no methods and
//! any number of `public static final` fields.

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;

enum FieldValue {
    Str(String),
    Int(i32),
    Absent,
}

struct FixtureField {
    name: String,
    descriptor: &'static str,
    value: FieldValue,
}

pub struct ClassFixture {
    name: String,
    fields: Vec<FixtureField>,
}

#[derive(Default)]
struct Pool {
    bytes: Vec<u8>,
    count: u16,
}

impl Pool {
    fn push(&mut self, entry: &[u8]) -> u16 {
        self.bytes.extend_from_slice(entry);
        self.count += 1;
        self.count
    }

    fn utf8(&mut self, value: &str) -> u16 {
        let mut entry = vec![TAG_UTF8];
        entry.extend_from_slice(&(value.len() as u16).to_be_bytes());
        entry.extend_from_slice(value.as_bytes());
        self.push(&entry)
    }

    fn class(&mut self, name_index: u16) -> u16 {
        let mut entry = vec![TAG_CLASS];
        entry.extend_from_slice(&name_index.to_be_bytes());
        self.push(&entry)
    }

    fn string(&mut self, value: &str) -> u16 {
        let utf8 = self.utf8(value);
        let mut entry = vec![TAG_STRING];
        entry.extend_from_slice(&utf8.to_be_bytes());
        self.push(&entry)
    }

    fn integer(&mut self, value: i32) -> u16 {
        let mut entry = vec![TAG_INTEGER];
        entry.extend_from_slice(&value.to_be_bytes());
        self.push(&entry)
    }
}

impl ClassFixture {
    /// `name` is the internal class name, e.g. `a/RouterMap__TheRouter__app`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn string_constant(mut self, field: &str, value: &str) -> Self {
        self.fields.push(FixtureField {
            name: field.to_string(),
            descriptor: "Ljava/lang/String;",
            value: FieldValue::Str(value.to_string()),
        });
        self
    }

    pub fn int_constant(mut self, field: &str, value: i32) -> Self {
        self.fields.push(FixtureField {
            name: field.to_string(),
            descriptor: "I",
            value: FieldValue::Int(value),
        });
        self
    }

    /// A static String field assigned at runtime rather than by constant.
    pub fn field_without_value(mut self, field: &str) -> Self {
        self.fields.push(FixtureField {
            name: field.to_string(),
            descriptor: "Ljava/lang/String;",
            value: FieldValue::Absent,
        });
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut pool = Pool::default();
        let this_name = pool.utf8(&self.name);
        let this_class = pool.class(this_name);
        let object_name = pool.utf8("java/lang/Object");
        let super_class = pool.class(object_name);
        let constant_value = pool.utf8("ConstantValue");

        let mut fields = Vec::new();
        for field in &self.fields {
            let name_index = pool.utf8(&field.name);
            let descriptor_index = pool.utf8(field.descriptor);
            let value_index = match &field.value {
                FieldValue::Str(value) => Some(pool.string(value)),
                FieldValue::Int(value) => Some(pool.integer(*value)),
                FieldValue::Absent => None,
            };

            // public static final
            fields.extend_from_slice(&0x0019u16.to_be_bytes());
            fields.extend_from_slice(&name_index.to_be_bytes());
            fields.extend_from_slice(&descriptor_index.to_be_bytes());
            match value_index {
                Some(index) => {
                    fields.extend_from_slice(&1u16.to_be_bytes());
                    fields.extend_from_slice(&constant_value.to_be_bytes());
                    fields.extend_from_slice(&2u32.to_be_bytes());
                    fields.extend_from_slice(&index.to_be_bytes());
                }
                None => fields.extend_from_slice(&0u16.to_be_bytes()),
            }
        }

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&52u16.to_be_bytes());
        out.extend_from_slice(&(pool.count + 1).to_be_bytes());
        out.extend_from_slice(&pool.bytes);
        // public super
        out.extend_from_slice(&0x0021u16.to_be_bytes());
        out.extend_from_slice(&this_class.to_be_bytes());
        out.extend_from_slice(&super_class.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&(self.fields.len() as u16).to_be_bytes());
        out.extend_from_slice(&fields);
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out
    }
}
