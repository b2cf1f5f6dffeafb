//! Transit mode enum and the seed names of the index string table.

/// Mode names registered first in every index string table, in this order.
/// `taxi` has no [`TransportMode`] of its own but keeps its slot so string
/// ids stay stable for readers.
pub const SEED_MODE_NAMES: [&str; 8] = [
    "bus",
    "trolleybus",
    "subway",
    "tram",
    "share_taxi",
    "taxi",
    "train",
    "ferry",
];

/// Transit modes accepted from a relation's `route` tag.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransportMode {
    Bus,
    Trolleybus,
    ShareTaxi,
    Subway,
    Train,
    Tram,
    Ferry,
}

impl TransportMode {
    /// Parse a `route=*` tag value.  Returns `None` for unsupported modes
    /// (`foot`, `bicycle`, `road`, …).
    pub fn from_tag(value: &str) -> Option<TransportMode> {
        match value {
            "bus"        => Some(TransportMode::Bus),
            "trolleybus" => Some(TransportMode::Trolleybus),
            "share_taxi" => Some(TransportMode::ShareTaxi),
            "subway"     => Some(TransportMode::Subway),
            "train"      => Some(TransportMode::Train),
            "tram"       => Some(TransportMode::Tram),
            "ferry"      => Some(TransportMode::Ferry),
            _            => None,
        }
    }

    /// Tag value, also used as the string-table entry for the route type.
    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Bus        => "bus",
            TransportMode::Trolleybus => "trolleybus",
            TransportMode::ShareTaxi  => "share_taxi",
            TransportMode::Subway     => "subway",
            TransportMode::Train      => "train",
            TransportMode::Tram       => "tram",
            TransportMode::Ferry      => "ferry",
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
