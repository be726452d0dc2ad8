use ahash::AHashMap;
use geo::BoundingRect;
use geoverlap::Spatial;
use rstar::{RTree, RTreeObject, AABB};
use tracing::{debug, info};

use crate::{
    config::ReconcileConfig,
    diagnostics::Diagnostics,
    resolve::{FeatureIndex, ResolveError},
    types::{EntranceRecord, LandRoleRecord, Residence, ZoneRecord},
};

use super::ZoneReconciler;

/// Residences of every zone, and everything reported along the way.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub residences: Vec<Residence>,
    pub diagnostics: Diagnostics,
}

/// A land-role point in an R-tree, associated with its record by index.
#[derive(Debug, Clone)]
struct LandRolePoint {
    idx: usize,
    coord: [f64; 2],
}

impl RTreeObject for LandRolePoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope { AABB::from_point(self.coord) }
}

/// Land-role records searchable by bounding box.
struct LandRoleIndex<'a> {
    records: &'a [LandRoleRecord],
    rtree: RTree<LandRolePoint>,
}

impl<'a> LandRoleIndex<'a> {
    fn new(records: &'a [LandRoleRecord]) -> Self {
        Self {
            rtree: RTree::bulk_load(
                records.iter().enumerate()
                    .map(|(idx, record)| LandRolePoint { idx, coord: [record.point.x(), record.point.y()] })
                    .collect()
            ),
            records,
        }
    }

    /// Records inside the bounding box of `zone`, in input order.
    fn candidates(&self, zone: &ZoneRecord) -> Vec<&'a LandRoleRecord> {
        let Some(rect) = zone.geometry().bounding_rect() else { return Vec::new() };
        let envelope = AABB::from_corners(rect.min().into(), rect.max().into());

        let mut indices = self.rtree.locate_in_envelope_intersecting(&envelope)
            .map(|point| point.idx)
            .collect::<Vec<_>>();
        indices.sort_unstable();
        indices.into_iter().map(|idx| &self.records[idx]).collect()
    }
}

/// Reconcile every zone in input order.
///
/// Entrances are assigned to zones by their zone id; land role by bounding
/// box first, then by exact overlap inside [`ZoneReconciler::validate_zone`].
/// Each zone reports into its own sink, merged in zone order.
pub fn reconcile_zones(
    zones: &[ZoneRecord],
    entrances: &[EntranceRecord],
    land_role: &[LandRoleRecord],
    buildings: &FeatureIndex,
    config: &ReconcileConfig,
) -> Result<Reconciliation, ResolveError> {
    info!(zones = zones.len(), "processing zones with residential data");

    let mut entrances_by_zone: AHashMap<&str, Vec<&EntranceRecord>> = AHashMap::new();
    let mut without_zone = 0usize;
    for entrance in entrances {
        let Some(zone_id) = entrance.zone_id.as_deref() else { without_zone += 1; continue };
        entrances_by_zone.entry(zone_id).or_default().push(entrance);
    }
    if without_zone > 0 { debug!(entrances = without_zone, "entrances without a zone id are ignored") }

    let land_role_index = LandRoleIndex::new(land_role);
    let reconciler = ZoneReconciler::new(buildings, config);
    let mut reconciliation = Reconciliation::default();

    for (i, zone) in zones.iter().enumerate() {
        let zone_entrances = entrances_by_zone.get(zone.id.as_str()).map_or(&[][..], Vec::as_slice);
        let mut diagnostics = Diagnostics::new();
        let residences = reconciler.validate_zone(zone, zone_entrances, land_role_index.candidates(zone), &mut diagnostics)?;

        reconciliation.residences.extend(residences);
        reconciliation.diagnostics.merge(diagnostics);

        if i == 0 || (i + 1) % 10 == 0 || i + 1 == zones.len() {
            info!("zone {}/{}", i + 1, zones.len());
        }
    }

    info!(
        residences = reconciliation.residences.len(),
        errors = reconciliation.diagnostics.error_count(),
        warnings = reconciliation.diagnostics.warnings().count(),
        "done processing zones with residential data",
    );
    Ok(reconciliation)
}
