//! Declarative field-mapping tables.
//!
//! One static [`Schema`] per endpoint replaces per-call-site name probing:
//! each target field lists every source name the backend has been seen to
//! use (snake_case, PascalCase, camelCase), and the normalizer resolves them
//! in one place.

/// Field-mapping table for one endpoint payload.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub fields: &'static [FieldSpec],
}

/// Mapping for a single target field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Canonical field name the typed payload deserializes from.
    pub target: &'static str,
    /// Acceptable source names, tried in order.
    pub sources: &'static [&'static str],
    pub kind: FieldKind,
    pub required: bool,
}

/// Declared type of a target field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    DateTime,
    Object(&'static Schema),
    List(&'static FieldKind),
}

pub const fn required(
    target: &'static str,
    sources: &'static [&'static str],
    kind: FieldKind,
) -> FieldSpec {
    FieldSpec {
        target,
        sources,
        kind,
        required: true,
    }
}

pub const fn optional(
    target: &'static str,
    sources: &'static [&'static str],
    kind: FieldKind,
) -> FieldSpec {
    FieldSpec {
        target,
        sources,
        kind,
        required: false,
    }
}
