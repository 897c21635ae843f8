//! XML-RPC value tree
//!
//! Only the `string`, `int` and `struct` branches of the wire format are modeled.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Int(i64),
    /// Members in wire order. Lookup by name goes through [`Value::member`].
    Struct(Vec<Member>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub value: Value,
}

impl Member {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&[Member]> {
        match self {
            Self::Struct(members) => Some(members),
            _ => None,
        }
    }

    /// Looks up a struct member by name. Duplicate names resolve to the last one.
    pub fn member(&self, name: &str) -> Option<&Value> {
        self.as_struct()?
            .iter()
            .rev()
            .find(|member| member.name == name)
            .map(|member| &member.value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<Vec<Member>> for Value {
    fn from(value: Vec<Member>) -> Self {
        Self::Struct(value)
    }
}
