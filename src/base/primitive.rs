//! The EDM primitive type catalog.
//!
//! A fixed table of the built-in `Edm.*` primitive kinds. The semantic model
//! consumes it as a pure lookup: [`lookup_primitive_kind`] maps a type name to
//! a kind, and [`PrimitiveKind::is_promotable_to`] encodes the implicit
//! promotions used by overload resolution.

use std::fmt;

/// Namespace of the built-in types.
pub const EDM_NAMESPACE: &str = "Edm";

/// Built-in primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Binary,
    Boolean,
    Byte,
    Date,
    DateTimeOffset,
    Decimal,
    Double,
    Duration,
    Guid,
    Int16,
    Int32,
    Int64,
    SByte,
    Single,
    Stream,
    String,
    TimeOfDay,
    Geography,
    GeographyPoint,
    GeographyLineString,
    GeographyPolygon,
    GeographyMultiPoint,
    GeographyMultiLineString,
    GeographyMultiPolygon,
    GeographyCollection,
    Geometry,
    GeometryPoint,
    GeometryLineString,
    GeometryPolygon,
    GeometryMultiPoint,
    GeometryMultiLineString,
    GeometryMultiPolygon,
    GeometryCollection,
    /// The abstract `Edm.PrimitiveType`.
    PrimitiveType,
}

use PrimitiveKind::*;

const ALL: [PrimitiveKind; 34] = [
    Binary,
    Boolean,
    Byte,
    Date,
    DateTimeOffset,
    Decimal,
    Double,
    Duration,
    Guid,
    Int16,
    Int32,
    Int64,
    SByte,
    Single,
    Stream,
    String,
    TimeOfDay,
    Geography,
    GeographyPoint,
    GeographyLineString,
    GeographyPolygon,
    GeographyMultiPoint,
    GeographyMultiLineString,
    GeographyMultiPolygon,
    GeographyCollection,
    Geometry,
    GeometryPoint,
    GeometryLineString,
    GeometryPolygon,
    GeometryMultiPoint,
    GeometryMultiLineString,
    GeometryMultiPolygon,
    GeometryCollection,
    PrimitiveType,
];

impl PrimitiveKind {
    /// Every kind in the catalog.
    pub fn all() -> impl Iterator<Item = PrimitiveKind> {
        ALL.into_iter()
    }

    /// The simple name, e.g. `Int32`.
    pub fn name(self) -> &'static str {
        match self {
            Binary => "Binary",
            Boolean => "Boolean",
            Byte => "Byte",
            Date => "Date",
            DateTimeOffset => "DateTimeOffset",
            Decimal => "Decimal",
            Double => "Double",
            Duration => "Duration",
            Guid => "Guid",
            Int16 => "Int16",
            Int32 => "Int32",
            Int64 => "Int64",
            SByte => "SByte",
            Single => "Single",
            Stream => "Stream",
            String => "String",
            TimeOfDay => "TimeOfDay",
            Geography => "Geography",
            GeographyPoint => "GeographyPoint",
            GeographyLineString => "GeographyLineString",
            GeographyPolygon => "GeographyPolygon",
            GeographyMultiPoint => "GeographyMultiPoint",
            GeographyMultiLineString => "GeographyMultiLineString",
            GeographyMultiPolygon => "GeographyMultiPolygon",
            GeographyCollection => "GeographyCollection",
            Geometry => "Geometry",
            GeometryPoint => "GeometryPoint",
            GeometryLineString => "GeometryLineString",
            GeometryPolygon => "GeometryPolygon",
            GeometryMultiPoint => "GeometryMultiPoint",
            GeometryMultiLineString => "GeometryMultiLineString",
            GeometryMultiPolygon => "GeometryMultiPolygon",
            GeometryCollection => "GeometryCollection",
            PrimitiveType => "PrimitiveType",
        }
    }

    /// The qualified name, e.g. `Edm.Int32`.
    pub fn full_name(self) -> std::string::String {
        format!("{EDM_NAMESPACE}.{}", self.name())
    }

    pub fn is_integral(self) -> bool {
        matches!(self, Byte | SByte | Int16 | Int32 | Int64)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integral() || matches!(self, Decimal | Double | Single)
    }

    pub fn is_spatial(self) -> bool {
        self.geography_family() || self.geometry_family()
    }

    fn geography_family(self) -> bool {
        matches!(
            self,
            Geography
                | GeographyPoint
                | GeographyLineString
                | GeographyPolygon
                | GeographyMultiPoint
                | GeographyMultiLineString
                | GeographyMultiPolygon
                | GeographyCollection
        )
    }

    fn geometry_family(self) -> bool {
        matches!(
            self,
            Geometry
                | GeometryPoint
                | GeometryLineString
                | GeometryPolygon
                | GeometryMultiPoint
                | GeometryMultiLineString
                | GeometryMultiPolygon
                | GeometryCollection
        )
    }

    /// Inclusive value range of an integral kind.
    pub fn integral_range(self) -> Option<(i64, i64)> {
        match self {
            Byte => Some((u8::MIN as i64, u8::MAX as i64)),
            SByte => Some((i8::MIN as i64, i8::MAX as i64)),
            Int16 => Some((i16::MIN as i64, i16::MAX as i64)),
            Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
            Int64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    /// Implicit promotion: `self` can be used where `target` is expected.
    ///
    /// Identity is not a promotion; callers compare equality separately.
    pub fn is_promotable_to(self, target: PrimitiveKind) -> bool {
        if self == target {
            return false;
        }
        match (self, target) {
            (_, PrimitiveType) => true,
            (Byte | SByte, Int16 | Int32 | Int64 | Single | Double | Decimal) => true,
            (Int16, Int32 | Int64 | Single | Double | Decimal) => true,
            (Int32, Int64 | Single | Double | Decimal) => true,
            (Int64, Single | Double | Decimal) => true,
            (Single, Double) => true,
            (from, Geography) => from.geography_family(),
            (from, Geometry) => from.geometry_family(),
            _ => false,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{EDM_NAMESPACE}.{}", self.name())
    }
}

/// Looks up a primitive kind by `Edm.`-qualified name.
///
/// The bare simple name is accepted too, matching how some producers write
/// parameter lists in annotation targets.
pub fn lookup_primitive_kind(name: &str) -> Option<PrimitiveKind> {
    let simple = name.strip_prefix("Edm.").unwrap_or(name);
    ALL.into_iter().find(|kind| kind.name() == simple)
}
