mod counter;

pub use counter::IdAllocator;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(pub u32);

/// Line/column span. Lines and columns are zero-based, as reported by tree-sitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start_line: u32,
    pub start_column: u16,
    pub end_line: u32,
    pub end_column: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SymbolKind {
    Package,
    Type,
    Field,
    Method,
    Function,
    Interface,
    GlobalVariable,
    Closure,
    Parameter,
    /// Construct the normalizer could not classify; carries the raw span only
    Unclassified,
}

impl SymbolId {
    pub fn new(value: u32) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl UnitId {
    pub fn new(value: u32) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl ScopeId {
    /// Root scope of every symbol model
    pub const ROOT: ScopeId = ScopeId(1);

    pub fn new(value: u32) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Position in a scope arena (ids start at 1)
    pub(crate) fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl Range {
    pub fn new(start_line: u32, start_column: u16, end_line: u32, end_column: u16) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    pub fn from_node(node: &tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self::new(
            start.row as u32,
            start.column as u16,
            end.row as u32,
            end.column as u16,
        )
    }

    pub fn contains(&self, line: u32, column: u16) -> bool {
        if line < self.start_line || line > self.end_line {
            return false;
        }

        if line == self.start_line && column < self.start_column {
            return false;
        }

        if line == self.end_line && column > self.end_column {
            return false;
        }

        true
    }

    pub fn start(&self) -> (u32, u16) {
        (self.start_line, self.start_column)
    }

    pub fn end(&self) -> (u32, u16) {
        (self.end_line, self.end_column)
    }

    /// Whether `other` lies entirely inside this range
    pub fn encloses(&self, other: &Range) -> bool {
        self.start() <= other.start() && other.end() <= self.end()
    }

    /// Half-open overlap: ranges that only touch at a boundary do not overlap
    pub fn overlaps(&self, other: &Range) -> bool {
        self.start() < other.end() && other.start() < self.end()
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line + 1,
            self.start_column + 1,
            self.end_line + 1,
            self.end_column + 1
        )
    }
}

impl FromStr for SymbolKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Package" => Ok(SymbolKind::Package),
            "Type" => Ok(SymbolKind::Type),
            "Field" => Ok(SymbolKind::Field),
            "Method" => Ok(SymbolKind::Method),
            "Function" => Ok(SymbolKind::Function),
            "Interface" => Ok(SymbolKind::Interface),
            "GlobalVariable" => Ok(SymbolKind::GlobalVariable),
            "Closure" => Ok(SymbolKind::Closure),
            "Parameter" => Ok(SymbolKind::Parameter),
            "Unclassified" => Ok(SymbolKind::Unclassified),
            _ => Err("Unknown symbol kind"),
        }
    }
}

impl SymbolKind {
    /// Kinds that open a function-level scope
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            SymbolKind::Function | SymbolKind::Method | SymbolKind::Closure
        )
    }

    /// Kinds reported by top-level definition queries
    pub fn is_definition(&self) -> bool {
        !matches!(
            self,
            SymbolKind::Package | SymbolKind::Parameter | SymbolKind::Unclassified
        )
    }
}

pub type CompactString = Box<str>;

pub fn compact_string(s: &str) -> CompactString {
    s.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        assert!(SymbolId::new(0).is_none());
        assert!(UnitId::new(0).is_none());
        assert!(ScopeId::new(0).is_none());

        assert_eq!(SymbolId::new(42).unwrap().value(), 42);
        assert_eq!(UnitId::new(7).unwrap().value(), 7);
        assert_eq!(ScopeId::ROOT.index(), 0);
    }

    #[test]
    fn test_range_contains() {
        let range = Range::new(10, 5, 15, 20);

        assert!(range.contains(12, 10));
        assert!(range.contains(10, 5));
        assert!(range.contains(15, 20));

        assert!(!range.contains(9, 10));
        assert!(!range.contains(16, 10));
        assert!(!range.contains(10, 4));
        assert!(!range.contains(15, 21));
    }

    #[test]
    fn test_range_overlap_and_enclosure() {
        let outer = Range::new(1, 0, 10, 1);
        let inner = Range::new(2, 4, 3, 0);
        let after = Range::new(10, 1, 12, 0);

        assert!(outer.encloses(&inner));
        assert!(!inner.encloses(&outer));
        assert!(outer.overlaps(&inner));
        // Touching at a boundary is not an overlap
        assert!(!outer.overlaps(&after));
    }

    #[test]
    fn test_range_display_is_one_based() {
        assert_eq!(Range::new(0, 0, 2, 3).to_string(), "1:1-3:4");
    }

    #[test]
    fn test_symbol_kind_from_str() {
        assert_eq!("Closure".parse::<SymbolKind>(), Ok(SymbolKind::Closure));
        assert_eq!(
            "GlobalVariable".parse::<SymbolKind>(),
            Ok(SymbolKind::GlobalVariable)
        );
        assert!("Struct".parse::<SymbolKind>().is_err());
    }

    #[test]
    fn test_callable_kinds() {
        assert!(SymbolKind::Closure.is_callable());
        assert!(SymbolKind::Method.is_callable());
        assert!(!SymbolKind::Type.is_callable());
        assert!(!SymbolKind::Parameter.is_definition());
    }
}
