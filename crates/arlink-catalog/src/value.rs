/// A decoded argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Float(f32),
    Double(f64),
    Str(String),
    /// An enum argument, by declared variant name.
    Enum(String),
}

impl ArgValue {
    /// Variant name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ArgValue::U8(_) => "u8",
            ArgValue::U16(_) => "u16",
            ArgValue::U32(_) => "u32",
            ArgValue::U64(_) => "u64",
            ArgValue::I8(_) => "i8",
            ArgValue::I16(_) => "i16",
            ArgValue::I32(_) => "i32",
            ArgValue::I64(_) => "i64",
            ArgValue::Float(_) => "float",
            ArgValue::Double(_) => "double",
            ArgValue::Str(_) => "string",
            ArgValue::Enum(_) => "enum",
        }
    }
}

impl std::fmt::Display for ArgValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgValue::U8(v) => write!(f, "{v}"),
            ArgValue::U16(v) => write!(f, "{v}"),
            ArgValue::U32(v) => write!(f, "{v}"),
            ArgValue::U64(v) => write!(f, "{v}"),
            ArgValue::I8(v) => write!(f, "{v}"),
            ArgValue::I16(v) => write!(f, "{v}"),
            ArgValue::I32(v) => write!(f, "{v}"),
            ArgValue::I64(v) => write!(f, "{v}"),
            ArgValue::Float(v) => write!(f, "{v}"),
            ArgValue::Double(v) => write!(f, "{v}"),
            ArgValue::Str(v) => write!(f, "{v}"),
            ArgValue::Enum(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! arg_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for ArgValue {
            fn from(value: $ty) -> Self {
                ArgValue::$variant(value)
            }
        })*
    };
}

arg_value_from! {
    u8 => U8, u16 => U16, u32 => U32, u64 => U64,
    i8 => I8, i16 => I16, i32 => I32, i64 => I64,
    f32 => Float, f64 => Double, String => Str,
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Str(value.to_string())
    }
}

/// Ordered argument name/value pairs.
///
/// Ordering follows the schema's declared argument list, so equality is
/// meaningful for round-trip comparisons. Lookup by name is linear; argument
/// lists are short (typically under ten entries).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<(String, ArgValue)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append or replace the value for `name`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ArgValue>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Builder-style `set`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// The `list_flags` fragment marker, when present as a u8 argument.
    pub fn list_flags(&self) -> Option<u8> {
        match self.get("list_flags") {
            Some(ArgValue::U8(flags)) => Some(*flags),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, ArgValue)> {
        self.0.iter()
    }
}

impl<N: Into<String>, V: Into<ArgValue>> FromIterator<(N, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.set(name, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_in_place() {
        let mut params = Params::new().with("a", 1u8).with("b", 2u8);
        params.set("a", 9u8);

        assert_eq!(params.get("a"), Some(&ArgValue::U8(9)));
        assert_eq!(params.len(), 2);
        // Position preserved.
        assert_eq!(params.iter().next().unwrap().0, "a");
    }

    #[test]
    fn list_flags_requires_u8() {
        let params = Params::new().with("list_flags", 2u8);
        assert_eq!(params.list_flags(), Some(2));

        let params = Params::new().with("list_flags", 2u32);
        assert_eq!(params.list_flags(), None);

        assert_eq!(Params::new().list_flags(), None);
    }

    #[test]
    fn from_iterator_preserves_order() {
        let params: Params = [("x", 1u8), ("y", 2u8)].into_iter().collect();
        let names: Vec<_> = params.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["x", "y"]);
    }
}
