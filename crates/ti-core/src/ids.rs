//! Strongly typed, zero-cost identifier wrappers.
//!
//! Source identities (`StopId`, `RouteId`) are OSM element ids and therefore
//! signed 64-bit.  `OutputRouteId` is the dense, sequential id a route gets
//! when it is emitted into the binary index; stop records refer to routes by
//! this id rather than by source id.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// Source node id of a transport stop.  Unique across all routes.
    pub struct StopId(i64);
}

typed_id! {
    /// Source relation id of a transport route.
    pub struct RouteId(i64);
}

typed_id! {
    /// Sequential id assigned to a route in emission order of the binary index.
    pub struct OutputRouteId(u32);
}

impl OutputRouteId {
    /// Cast to `usize` for direct use as a `Vec` index.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<usize> for OutputRouteId {
    type Error = std::num::TryFromIntError;
    fn try_from(n: usize) -> Result<OutputRouteId, Self::Error> {
        u32::try_from(n).map(OutputRouteId)
    }
}
