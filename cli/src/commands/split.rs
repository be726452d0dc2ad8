use anyhow::{Context, Result};
use placematch::{
    geoverlap::{split_overlapping, Boundary, SplitOptions},
    read_features, write_features, SpatialFeature,
};
use tracing::info;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::SplitArgs) -> Result<()> {
    let out_path = args.output.clone().unwrap_or("./split.geojson".into());
    let reference = read_features(&args.reference)?.into_iter().next()
        .with_context(|| format!("No reference feature in {}", args.reference.display()))?;
    let candidates = read_features(&args.candidates)?;

    let count = |feature: &SpatialFeature| args.count_property.as_deref().map_or(1, |key| feature.count_property(key));
    let boundary = if args.exclude_boundary { Boundary::Exclude } else { Boundary::Include };
    let mut options = SplitOptions::expecting(args.expected.unwrap_or(0))
        .with_feature_count(&count)
        .with_convex(!args.no_convex)
        .with_buffer(!args.no_buffer)
        .with_boundary(boundary);
    if let Some(meters) = args.max_buffer {
        options = options.with_max_buffer_size(meters);
    }

    info!("[split] splitting {} candidates against {}", candidates.len(), reference.subject());
    let split = split_overlapping(&reference.geometry, candidates, &options);
    info!(overlapping = split.overlapping.len(), not_overlapping = split.not_overlapping.len(), "[split] done");

    let features = split.overlapping.into_iter().map(|feature| feature.with_property("overlapping", true))
        .chain(split.not_overlapping.into_iter().map(|feature| feature.with_property("overlapping", false)))
        .collect::<Vec<_>>();

    info!("[split] writing candidates to {}", out_path.display());
    write_features(&out_path, &features)
}
