// src/schema/types.rs

/// How the BTS form declares a column's values.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub enum VarType {
    Char,
    Num,
}

impl VarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarType::Char => "Char",
            VarType::Num => "Num",
        }
    }
}

/// A single projected column of the On-Time Performance table.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub struct Column {
    /// Name as it appears in the CSV header and the SQL projection.
    pub name: &'static str,
    /// Display name used by the download form (`VarDesc`).
    pub description: &'static str,
    pub ty: VarType,
}
