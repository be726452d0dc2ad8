use std::path::PathBuf;

/// Dwelling reconciliation CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "placematch", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Match zone, entrance and land role dwellings into residences
    Reconcile(ReconcileArgs),

    /// Split candidate features by overlap with a reference feature
    Split(SplitArgs),
}

#[derive(clap::Args, Debug)]
pub struct ReconcileArgs {
    /// Zones with `flats` and `flats_from_osm` (GeoJSON)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub zones: PathBuf,

    /// Building entrances with `building_id` and `zone_id` (GeoJSON)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub entrances: PathBuf,

    /// Land role points (GeoJSON)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub land_role: PathBuf,

    /// Building footprints, with ids matching the entrances' `building_id` (GeoJSON)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub buildings: PathBuf,

    /// Output residences file, defaults to "./residences.geojson"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// JSON configuration (property names, building buffer)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Skip buildings missing from the building data instead of failing
    #[arg(long)]
    pub lenient: bool,

    /// Directory for errors.md and warnings.md, defaults to the output's directory
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub report_dir: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct SplitArgs {
    /// File whose first feature is the reference (GeoJSON)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub reference: PathBuf,

    /// Candidate features (GeoJSON)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub candidates: PathBuf,

    /// Approximate count the overlapping side should reach
    #[arg(long)]
    pub expected: Option<u32>,

    /// Candidate property holding its count, each candidate counts 1 otherwise
    #[arg(long)]
    pub count_property: Option<String>,

    /// Do not try the convex hull of the reference
    #[arg(long)]
    pub no_convex: bool,

    /// Do not try buffering the reference
    #[arg(long)]
    pub no_buffer: bool,

    /// Largest buffer radius in meters
    #[arg(long)]
    pub max_buffer: Option<f64>,

    /// Points on the reference boundary do not overlap
    #[arg(long)]
    pub exclude_boundary: bool,

    /// Output candidates with an `overlapping` property, defaults to "./split.geojson"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}
