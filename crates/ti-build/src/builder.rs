//! The two-phase build: ingestion, then write-back.

use std::io::{Seek, Write};

use rustc_hash::FxHashSet;

use ti_binary::{BinaryIndexWriter, RouteRecord};
use ti_core::{BuildConfig, Direction, StopId, TransportRoute, TransportStop};
use ti_extract::{Relation, RouteExtractor};
use ti_spatial::{Element, SpatialIndexBuilder, StopTree, TreeNode};
use ti_staging::{RouteRow, RouteStopRow, StagingReader, StagingStore, StopRow};

use crate::{BuildResult, BuildSummary, IngestSummary, WriteSummary};

/// Builds one transport index.
///
/// # Lifecycle
///
/// 1. [`create`](Self::create) opens a fresh staging database and node file.
/// 2. [`ingest_relation`](Self::ingest_relation) / [`ingest_route`](Self::ingest_route)
///    stage each route and insert every stop seen for the first time into
///    the stop tree.
/// 3. [`write_index`](Self::write_index) commits staging, flushes the tree,
///    and streams the binary index.
///
/// ```rust,ignore
/// let mut builder = TransportIndexBuilder::create(BuildConfig::new(work_dir, "Amsterdam"))?;
/// for rel in &relations {
///     builder.ingest_relation(rel)?;
/// }
/// let summary = builder.write_index(&mut File::create(out_path)?)?;
/// ```
pub struct TransportIndexBuilder {
    pub(crate) config:    BuildConfig,
    pub(crate) extractor: RouteExtractor,
    pub(crate) staging:   StagingStore,
    pub(crate) spatial:   SpatialIndexBuilder,
    /// Stops already staged; lives only as long as ingestion.
    pub(crate) visited:   FxHashSet<StopId>,
    pub(crate) ingest:    IngestSummary,
}

impl TransportIndexBuilder {
    pub fn create(config: BuildConfig) -> BuildResult<Self> {
        config.validate()?;
        let staging = StagingStore::create(&config.staging_path, config.batch_size)?;
        let spatial = SpatialIndexBuilder::create(&config.tree_path)?;
        log::info!(
            "building transport index '{}' (staging {}, tree {})",
            config.region_name,
            config.staging_path.display(),
            config.tree_path.display()
        );
        Ok(Self {
            config,
            extractor: RouteExtractor::new(),
            staging,
            spatial,
            visited: FxHashSet::default(),
            ingest: IngestSummary::default(),
        })
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn ingest_summary(&self) -> IngestSummary {
        self.ingest
    }

    // ── Ingestion ─────────────────────────────────────────────────────────

    /// Extract and stage one relation.  Returns `false` when the relation
    /// is not a usable transit route.
    pub fn ingest_relation(&mut self, relation: &Relation) -> BuildResult<bool> {
        self.ingest.relations += 1;
        match self.extractor.extract(relation) {
            Some(route) => {
                self.ingest_route(&route)?;
                Ok(true)
            }
            None => {
                self.ingest.rejected += 1;
                Ok(false)
            }
        }
    }

    /// Stage `route`, its stops not seen before, and one association per
    /// stop position in each direction.
    pub fn ingest_route(&mut self, route: &TransportRoute) -> BuildResult<()> {
        self.staging.insert_route(RouteRow::from(route))?;
        self.ingest.routes += 1;

        for direction in [Direction::Forward, Direction::Backward] {
            for (ordinal, stop) in route.stops(direction).iter().enumerate() {
                if !self.visited.contains(&stop.id) {
                    self.spatial.insert(stop)?;
                    self.staging.insert_stop(StopRow::from(stop))?;
                    self.visited.insert(stop.id);
                    self.ingest.stops += 1;
                }
                self.staging.insert_route_stop(RouteStopRow {
                    route: route.id,
                    stop: stop.id,
                    direction,
                    ordinal: ordinal as u32,
                })?;
                self.ingest.route_stops += 1;
            }
        }
        Ok(())
    }

    // ── Write-back ────────────────────────────────────────────────────────

    /// Commit staging, flush the stop tree, and write the index to `out`.
    pub fn write_index<W: Write + Seek>(self, out: W) -> BuildResult<BuildSummary> {
        let Self { config, staging, spatial, visited, ingest, .. } = self;
        drop(visited);
        log::info!(
            "ingestion done: {} routes, {} stops ({} relations rejected)",
            ingest.routes,
            ingest.stops,
            ingest.rejected
        );

        let reader = staging.finish()?;
        let mut tree = spatial.flush()?;
        let mut writer = BinaryIndexWriter::new(out);
        let mut summary = WriteSummary::default();

        writer.start_index(&config.region_name)?;
        writer.start_routes()?;
        for row in reader.routes()? {
            let (forward, backward) = split_directions(reader.route_stops(row.id)?);
            writer.write_route(&RouteRecord {
                id:       row.id,
                mode:     &row.mode,
                operator: row.operator.as_deref(),
                r#ref:    &row.r#ref,
                name:     &row.name,
                name_en:  row.name_en.as_deref(),
                distance: row.distance,
                forward:  &forward,
                backward: &backward,
            })?;
            summary.routes_written += 1;
        }
        writer.end_routes()?;
        log::info!("route section written: {} routes", summary.routes_written);

        let root = tree.root()?;
        match root.bounds() {
            Some(rect) => {
                writer.start_tree_element(rect)?;
                write_tree(&mut writer, &mut tree, &reader, &root, &mut summary)?;
                writer.end_tree_element()?;
            }
            None => writer.skip_tree()?,
        }
        log::info!(
            "stop tree written: {} stops (height {})",
            summary.stops_written,
            tree.header().height
        );

        writer.write_string_table()?;
        summary.strings = writer.strings().len() as u64;
        writer.finish()?;

        let summary = BuildSummary { ingest, write: summary };
        log::info!("transport index '{}' complete: {summary}", config.region_name);
        Ok(summary)
    }
}

fn split_directions(stops: Vec<(Direction, StopRow)>) -> (Vec<TransportStop>, Vec<TransportStop>) {
    let mut forward = Vec::new();
    let mut backward = Vec::new();
    for (direction, row) in stops {
        match direction {
            Direction::Forward => forward.push(TransportStop::from(row)),
            Direction::Backward => backward.push(TransportStop::from(row)),
        }
    }
    (forward, backward)
}

/// Emit the elements of `node`, opening a tree element per child node.
fn write_tree<W: Write + Seek>(
    writer:  &mut BinaryIndexWriter<W>,
    tree:    &mut StopTree,
    reader:  &StagingReader,
    node:    &TreeNode,
    summary: &mut WriteSummary,
) -> BuildResult<()> {
    for element in &node.elements {
        match *element {
            Element::Leaf { stop, .. } => {
                let Some(row) = reader.stop(stop)? else {
                    log::error!("tree leaf {stop} has no staged stop");
                    summary.dangling_stops += 1;
                    continue;
                };
                let routes = reader.routes_for_stop(stop)?;
                let dropped = writer.write_stop(&TransportStop::from(row), &routes)?;
                summary.dangling_routes += dropped as u64;
                summary.stops_written += 1;
            }
            Element::Node { rect, child } => {
                let child = tree.read_node(child)?;
                writer.start_tree_element(rect)?;
                write_tree(writer, tree, reader, &child, summary)?;
                writer.end_tree_element()?;
            }
        }
    }
    Ok(())
}
