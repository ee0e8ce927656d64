use std::borrow::Cow;
use std::fmt;

/// The name of the implicit receiver parameter.
pub const THIS: &str = "this";

/// An SSA name. The version is 0 everywhere until the SSA rewrite runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Local {
    pub name: String,
    pub version: u32,
}

impl Local {
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

impl fmt::Display for Local {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version == 0 {
            write!(f, "%{}", self.name)
        } else {
            write!(f, "%{}{}", self.name, self.version)
        }
    }
}

/// A symbolic label, e.g. a dispatch table or a method entry point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Global {
    pub name: String,
}

impl Global {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Global {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)
    }
}

/// An integer constant.
///
/// Constants originating in source text carry the tag flag and render with
/// the integer tag applied; constants synthesized by the lowering (table
/// indices, address offsets) do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Const {
    pub value: i64,
    pub tagged: bool,
}

impl Const {
    pub fn tagged(value: i64) -> Self {
        Self {
            value,
            tagged: true,
        }
    }

    pub fn untagged(value: i64) -> Self {
        Self {
            value,
            tagged: false,
        }
    }
}

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tagged {
            write!(f, "{}", (self.value << 1) | 1)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Var,
    ConstInt,
    Label,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Local(Local),
    Global(Global),
    Const(Const),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Local(_) => ValueKind::Var,
            Self::Global(_) => ValueKind::Label,
            Self::Const(_) => ValueKind::ConstInt,
        }
    }

    pub fn name(&self) -> Cow<'_, str> {
        match self {
            Self::Local(local) => Cow::Borrowed(local.name.as_str()),
            Self::Global(global) => Cow::Borrowed(global.name.as_str()),
            Self::Const(c) => Cow::Owned(c.value.to_string()),
        }
    }

    pub fn is_var(&self) -> bool {
        self.kind() == ValueKind::Var
    }

    pub fn as_local(&self) -> Option<&Local> {
        match self {
            Self::Local(local) => Some(local),
            _ => None,
        }
    }
}

impl From<Local> for Value {
    fn from(local: Local) -> Self {
        Self::Local(local)
    }
}

impl From<Global> for Value {
    fn from(global: Global) -> Self {
        Self::Global(global)
    }
}

impl From<Const> for Value {
    fn from(c: Const) -> Self {
        Self::Const(c)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(local) => local.fmt(f),
            Self::Global(global) => global.fmt(f),
            Self::Const(c) => c.fmt(f),
        }
    }
}
