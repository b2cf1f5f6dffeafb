//! Counters reported by the two build phases.

use std::fmt;

/// Ingestion counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Relations offered to the extractor.
    pub relations:       u64,
    /// Relations the extractor turned down.
    pub rejected:        u64,
    pub routes:          u64,
    /// Distinct stops staged and inserted into the tree.
    pub stops:           u64,
    pub route_stops:     u64,
}

/// Write-back counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub routes_written:  u64,
    pub stops_written:   u64,
    /// Tree leaves whose stop was missing from staging.
    pub dangling_stops:  u64,
    /// Stop-to-route references to routes that were never written.
    pub dangling_routes: u64,
    pub strings:         u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub ingest: IngestSummary,
    pub write:  WriteSummary,
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} routes ({} rejected of {} relations), {} stops, {} strings",
            self.write.routes_written,
            self.ingest.rejected,
            self.ingest.relations,
            self.write.stops_written,
            self.write.strings,
        )?;
        if self.write.dangling_stops + self.write.dangling_routes > 0 {
            write!(
                f,
                "; {} dangling stops, {} dangling route references",
                self.write.dangling_stops, self.write.dangling_routes
            )?;
        }
        Ok(())
    }
}
