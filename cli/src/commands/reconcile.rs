use std::path::{Path, PathBuf};

use anyhow::Result;
use placematch::{
    read_features, read_records, reconcile_zones, write_reports, write_residences, EntranceRecord, FeatureIndex,
    LandRoleRecord, ReconcileConfig, ZoneRecord,
};
use tracing::info;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ReconcileArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ReconcileConfig::from_json_file(path)?,
        None => ReconcileConfig::default(),
    };
    if args.lenient { config.lenient_buildings = true }
    let out_path = args.output.clone().unwrap_or("./residences.geojson".into());
    let report_dir = args.report_dir.clone().unwrap_or_else(|| default_report_dir(&out_path));

    let fields = &config.fields;
    let zones = read_records(&args.zones, |feature| ZoneRecord::from_feature(feature, fields))?;
    let entrances = read_records(&args.entrances, |feature| EntranceRecord::from_feature(feature, fields))?;
    let land_role = read_records(&args.land_role, |feature| LandRoleRecord::from_feature(feature, fields))?;
    let buildings = FeatureIndex::new(read_features(&args.buildings)?);
    info!(
        zones = zones.len(),
        entrances = entrances.len(),
        land_role = land_role.len(),
        buildings = buildings.len(),
        "[reconcile] inputs loaded",
    );

    let reconciliation = reconcile_zones(&zones, &entrances, &land_role, &buildings, &config)?;

    info!("[reconcile] writing residences to {}", out_path.display());
    write_residences(&out_path, &reconciliation.residences)?;

    info!("[reconcile] writing reports to {}", report_dir.display());
    write_reports(&report_dir, &reconciliation.diagnostics)?;

    Ok(())
}

fn default_report_dir(out_path: &Path) -> PathBuf {
    out_path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
