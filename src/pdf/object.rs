//! PDF object types and serialization

use std::fmt;
use super::Dictionary;

/// Indirect reference: object number and generation number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    /// Object number
    pub number: u32,
    /// Generation number
    pub generation: u16,
}

impl ObjectRef {
    /// Create new reference
    pub const fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

/// Kind of a PDF object, without its contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Null,
    Boolean,
    Number,
    Real,
    String,
    HexString,
    Name,
    Array,
    Dictionary,
    Reference,
    RawData,
}

impl DataType {
    /// Label used for this type in the model's type column
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Null => "Null",
            DataType::Boolean => "Boolean",
            DataType::Number => "Number",
            DataType::Real => "Real",
            DataType::String => "String",
            DataType::HexString => "HexString",
            DataType::Name => "Name",
            DataType::Array => "Array",
            DataType::Dictionary => "Dictionary",
            DataType::Reference => "Reference",
            DataType::RawData => "RawData",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PDF object value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Object {
    /// Null object
    #[default]
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Real value
    Real(f64),
    /// Literal string
    String(Vec<u8>),
    /// Hexadecimal string
    HexString(Vec<u8>),
    /// Name object, without the leading slash
    Name(String),
    /// Array object
    Array(Vec<Object>),
    /// Dictionary object
    Dictionary(Dictionary),
    /// Indirect reference
    Reference(ObjectRef),
    /// Bytes written out verbatim
    RawData(Vec<u8>),
}

impl Object {
    /// Create a name object
    pub fn name(name: impl Into<String>) -> Self {
        Object::Name(name.into())
    }

    /// Create a literal string object
    pub fn string(data: impl Into<Vec<u8>>) -> Self {
        Object::String(data.into())
    }

    /// Create a reference object
    pub fn reference(number: u32, generation: u16) -> Self {
        Object::Reference(ObjectRef::new(number, generation))
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Object::Null => DataType::Null,
            Object::Boolean(_) => DataType::Boolean,
            Object::Integer(_) => DataType::Number,
            Object::Real(_) => DataType::Real,
            Object::String(_) => DataType::String,
            Object::HexString(_) => DataType::HexString,
            Object::Name(_) => DataType::Name,
            Object::Array(_) => DataType::Array,
            Object::Dictionary(_) => DataType::Dictionary,
            Object::Reference(_) => DataType::Reference,
            Object::RawData(_) => DataType::RawData,
        }
    }

    pub fn is_dictionary(&self) -> bool {
        matches!(self, Object::Dictionary(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Object::Array(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Object::Reference(_))
    }

    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Object>> {
        match self {
            Object::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Object>> {
        match self {
            Object::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<ObjectRef> {
        match self {
            Object::Reference(reference) => Some(*reference),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Serialize object in PDF syntax
    pub fn write_to(&self, output: &mut Vec<u8>) {
        match self {
            Object::Null => output.extend_from_slice(b"null"),
            Object::Boolean(b) => output.extend_from_slice(if *b { b"true" } else { b"false" }),
            Object::Integer(n) => output.extend_from_slice(n.to_string().as_bytes()),
            Object::Real(r) => write_real(output, *r),
            Object::String(s) => write_literal_string(output, s),
            Object::HexString(s) => {
                output.push(b'<');
                output.extend_from_slice(hex::encode_upper(s).as_bytes());
                output.push(b'>');
            }
            Object::Name(n) => write_name(output, n),
            Object::Array(a) => {
                output.push(b'[');
                for (i, item) in a.iter().enumerate() {
                    if i > 0 {
                        output.push(b' ');
                    }
                    item.write_to(output);
                }
                output.push(b']');
            }
            Object::Dictionary(d) => d.write_to(output),
            Object::Reference(r) => output.extend_from_slice(r.to_string().as_bytes()),
            Object::RawData(data) => output.extend_from_slice(data),
        }
    }

    /// Serialize object to a new buffer
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut output = Vec::new();
        self.write_to(&mut output);
        output
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.to_bytes()))
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        Object::Boolean(value)
    }
}

impl From<i64> for Object {
    fn from(value: i64) -> Self {
        Object::Integer(value)
    }
}

impl From<f64> for Object {
    fn from(value: f64) -> Self {
        Object::Real(value)
    }
}

impl From<ObjectRef> for Object {
    fn from(value: ObjectRef) -> Self {
        Object::Reference(value)
    }
}

impl From<Dictionary> for Object {
    fn from(value: Dictionary) -> Self {
        Object::Dictionary(value)
    }
}

impl From<Vec<Object>> for Object {
    fn from(value: Vec<Object>) -> Self {
        Object::Array(value)
    }
}

fn write_real(output: &mut Vec<u8>, r: f64) {
    if !r.is_finite() {
        output.extend_from_slice(b"0.0");
    } else if r.fract() == 0.0 {
        output.extend_from_slice(format!("{:.1}", r).as_bytes());
    } else {
        output.extend_from_slice(r.to_string().as_bytes());
    }
}

fn write_literal_string(output: &mut Vec<u8>, s: &[u8]) {
    output.push(b'(');
    for &b in s {
        match b {
            b'(' | b')' | b'\\' => {
                output.push(b'\\');
                output.push(b);
            }
            b'\n' => output.extend_from_slice(b"\\n"),
            b'\r' => output.extend_from_slice(b"\\r"),
            b'\t' => output.extend_from_slice(b"\\t"),
            0x08 => output.extend_from_slice(b"\\b"),
            0x0c => output.extend_from_slice(b"\\f"),
            _ => output.push(b),
        }
    }
    output.push(b')');
}

/// Write a name, escaping bytes that would end or corrupt the token
pub(crate) fn write_name(output: &mut Vec<u8>, name: &str) {
    output.push(b'/');
    for &b in name.as_bytes() {
        if b == b'#' || !(b'!'..=b'~').contains(&b) || super::parser::is_delimiter(b) {
            output.push(b'#');
            output.extend_from_slice(hex::encode_upper([b]).as_bytes());
        } else {
            output.push(b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_log::test;

    #[test]
    fn test_data_type_labels() {
        assert_eq!(Object::Null.data_type().as_str(), "Null");
        assert_eq!(Object::Integer(3).data_type().as_str(), "Number");
        assert_eq!(Object::Real(3.5).data_type().as_str(), "Real");
        assert_eq!(Object::HexString(vec![1]).data_type().as_str(), "HexString");
        assert_eq!(Object::reference(1, 0).data_type().as_str(), "Reference");
        assert_eq!(Object::RawData(vec![]).data_type().to_string(), "RawData");
    }

    #[test]
    fn test_scalar_serialization() {
        assert_eq!(Object::Null.to_string(), "null");
        assert_eq!(Object::Boolean(false).to_string(), "false");
        assert_eq!(Object::Integer(-42).to_string(), "-42");
        assert_eq!(Object::Real(2.0).to_string(), "2.0");
        assert_eq!(Object::Real(0.25).to_string(), "0.25");
        assert_eq!(Object::name("Type").to_string(), "/Type");
        assert_eq!(Object::reference(5, 0).to_string(), "5 0 R");
        assert_eq!(Object::HexString(b"Hello".to_vec()).to_string(), "<48656C6C6F>");
    }

    #[test]
    fn test_string_escaping() {
        let obj = Object::string(&b"a (b) \\ c\n"[..]);
        assert_eq!(obj.to_string(), "(a \\(b\\) \\\\ c\\n)");
    }

    #[test]
    fn test_name_escaping() {
        assert_eq!(Object::name("A B#C").to_string(), "/A#20B#23C");
        assert_eq!(Object::name("x/y").to_string(), "/x#2Fy");
    }

    #[test]
    fn test_container_serialization() {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::name("Page"));
        dict.set("Kids", Object::Array(vec![Object::reference(3, 0), Object::Integer(1)]));
        assert_eq!(
            Object::Dictionary(dict).to_string(),
            "<< /Type /Page /Kids [3 0 R 1] >>"
        );
        assert_eq!(Object::Array(vec![]).to_string(), "[]");
    }

    #[test]
    fn test_accessors() {
        let obj = Object::reference(7, 2);
        assert!(obj.is_reference());
        assert_eq!(obj.as_reference(), Some(ObjectRef::new(7, 2)));
        assert!(obj.as_dict().is_none());

        let mut arr = Object::Array(vec![Object::Null]);
        arr.as_array_mut().unwrap().push(Object::Boolean(true));
        assert_eq!(arr.as_array().map(Vec::len), Some(2));
    }
}
