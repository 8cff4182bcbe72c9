//! Integration tests for the DIMAP families (DEIMOS-1/2, DZZ-HR, NigeriaSat-2).

use imagery_common::{EpsgCode, ProductTag, SpatialReference};
use ingestion::families::{deimos1, deimos2, kazakhstan, nigeriasat2, DimapFamily};
use ingestion::{CandidateTask, CrawlerConfig, Ingester, IngestOptions, IngestionError, SensorFamily};
use tempfile::TempDir;
use test_utils::{
    assert_approx_eq, assert_coords_approx_eq, fixtures, DataFileRef, DimBand, DimBuilder,
};

fn deimos2_family() -> DimapFamily {
    DimapFamily::new(&deimos2::PROFILE)
}

fn crawl_tasks(family: &dyn SensorFamily, config: &CrawlerConfig) -> Vec<CandidateTask> {
    Ingester::new(family, IngestOptions::default())
        .crawl(config)
        .unwrap()
        .collect()
}

// ============================================================================
// End-to-end scenario
// ============================================================================

#[test]
fn test_four_band_scene_yields_one_ms_item() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::deimos2().write_with_raster(root.path(), "DE2_MS4_L1C.dim");

    let family = deimos2_family();
    let tasks = crawl_tasks(&family, &CrawlerConfig::new([root.path()]));
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].product_tag, ProductTag::Ms);
    assert_eq!(tasks[0].source_path, dim);
    assert_eq!(tasks[0].product_type_hint.as_deref(), Some("L1C"));

    let items = family.build(&tasks[0]);
    assert_eq!(items.len(), 1);
    let item = &items[0];

    assert_eq!(item.source_tag, ProductTag::Ms);
    assert_eq!(item.raster_files.len(), 1);
    assert_eq!(item.raster_files["Raster1"], root.path().join("IMAGE.TIF"));
    assert_eq!(item.key_properties.band_properties.len(), 4);
    assert_eq!(item.footprint.vertex_count(), 4);
    assert!(matches!(item.spatial_reference, SpatialReference::Wkt(_)));

    let json = serde_json::to_value(item).unwrap();
    assert_eq!(json["sourceTag"], "MS");
    assert_eq!(json["keyProperties"]["bandProperties"].as_array().unwrap().len(), 4);
}

#[test]
fn test_scene_metadata_normalized() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::deimos2().write_with_raster(root.path(), "scene.dim");
    let family = deimos2_family();
    let item = family
        .try_build(&CandidateTask::new(&dim, ProductTag::Ms))
        .unwrap()
        .unwrap();

    let props = &item.key_properties;
    assert_eq!(props.sensor_name.as_deref(), Some("DEIMOS-2"));
    assert_eq!(props.product_type.as_deref(), Some("L1C"));
    assert_eq!(
        props.acquisition_date.as_deref(),
        Some("2015-06-21T10:47:32.250")
    );
    assert_approx_eq!(props.sun_elevation.unwrap(), fixtures::scene::SUN_ELEVATION, 1e-9);
    assert_approx_eq!(props.sun_azimuth.unwrap(), fixtures::scene::SUN_AZIMUTH, 1e-9);
    assert_approx_eq!(props.off_nadir.unwrap(), fixtures::scene::VIEWING_ANGLE, 1e-9);
    assert_eq!(props.instrument.as_deref(), Some("HiRAIS"));

    let first = &props.band_properties[0];
    assert_eq!(first.band_name.as_deref(), Some("NearInfrared"));
    assert_eq!(first.band_index, Some(0));
    assert_approx_eq!(first.radiance_gain.unwrap(), 0.01180, 1e-12);
    assert_eq!(first.unit.as_deref(), Some("W/m2/sr/um"));

    let variables = item.variables.unwrap();
    assert_eq!(variables.default_maximum_input, 1023);
    assert_approx_eq!(variables.default_gamma, 1.0, 1e-12);

    let ring = item.footprint.ring();
    assert_coords_approx_eq!((ring[0].x, ring[0].y), fixtures::frame::MADRID[0], 1e-9);
    assert_eq!(ring.first(), ring.last());
}

#[test]
fn test_sun_azimuth_not_taken_from_elevation() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::deimos2()
        .scene_field("SUN_ELEVATION", "45.0")
        .scene_field("SUN_AZIMUTH", "200.0")
        .write_with_raster(root.path(), "scene.dim");
    let item = &deimos2_family().build(&CandidateTask::new(&dim, ProductTag::Ms))[0];
    assert_eq!(item.key_properties.sun_elevation, Some(45.0));
    assert_eq!(item.key_properties.sun_azimuth, Some(200.0));
}

// ============================================================================
// Tagging
// ============================================================================

#[test]
fn test_single_band_is_pan_only() {
    let root = TempDir::new().unwrap();
    DimBuilder::deimos2()
        .nbands(1)
        .write_with_raster(root.path(), "pan.dim");

    let tasks = crawl_tasks(&deimos2_family(), &CrawlerConfig::new([root.path()]));
    let tags: Vec<_> = tasks.iter().map(|t| t.product_tag).collect();
    assert_eq!(tags, vec![ProductTag::Pan]);
}

#[test]
fn test_unsupported_band_count_yields_no_tasks() {
    let root = TempDir::new().unwrap();
    DimBuilder::deimos2()
        .nbands(2)
        .write_with_raster(root.path(), "two.dim");

    let family = deimos2_family();
    let mut crawler = Ingester::new(&family, IngestOptions::default())
        .crawl(&CrawlerConfig::new([root.path()]))
        .unwrap();
    assert!(crawler.next_task().is_none());
    assert_eq!(crawler.stats().paths_seen, 1);
    assert_eq!(crawler.stats().tasks_emitted, 0);
}

#[test]
fn test_multiple_raster_dimensions_expand_path_major() {
    let root = TempDir::new().unwrap();
    DimBuilder::deimos2()
        .nbands_list(&[1, 4])
        .write_with_raster(root.path(), "a_bundle.dim");
    DimBuilder::deimos2().write_with_raster(root.path(), "b_ms.dim");

    let tasks = crawl_tasks(&deimos2_family(), &CrawlerConfig::new([root.path()]));
    let pairs: Vec<_> = tasks
        .iter()
        .map(|t| (t.display_name.as_str(), t.product_tag))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("a_bundle.dim", ProductTag::Ms),
            ("a_bundle.dim", ProductTag::Pan),
            ("b_ms.dim", ProductTag::Ms),
        ]
    );
}

#[test]
fn test_tag_gate_rejects_mismatched_task() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::deimos2().write_with_raster(root.path(), "ms.dim");
    let family = deimos2_family();

    let pan_task = CandidateTask::new(&dim, ProductTag::Pan);
    assert!(family.try_build(&pan_task).unwrap().is_none());
    assert!(family.build(&pan_task).is_empty());
}

#[test]
fn test_undeclared_band_count_builds_requested_tag() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::deimos2()
        .nbands_list(&[])
        .write_with_raster(root.path(), "nobands.dim");
    let family = deimos2_family();

    // Nothing to crawl, but a direct build is not gated
    assert!(family.enumerate_tags(&dim).unwrap().tags.is_empty());
    let items = family.build(&CandidateTask::new(&dim, ProductTag::Pan));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].source_tag, ProductTag::Pan);
}

#[test]
fn test_latin1_document_detected_crawled_and_built() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::deimos2()
        .bands(vec![DimBand {
            index: Some(0),
            description: Some("NIR".into()),
            gain: Some(0.5),
            bias: Some(0.0),
            unit: Some("W/(m\u{b2}\u{b7}sr\u{b7}\u{b5}m)".into()),
        }])
        .write_latin1_with_raster(root.path(), "latin1.dim");
    assert!(std::str::from_utf8(&std::fs::read(&dim).unwrap()).is_err());

    let family = deimos2_family();
    assert!(family.detect(&dim).matches);

    let report = Ingester::new(&family, IngestOptions::default())
        .collect(&CrawlerConfig::new([root.path()]))
        .unwrap();
    assert_eq!(report.tasks_seen, 1);
    assert_eq!(report.items.len(), 1);
    let band = &report.items[0].key_properties.band_properties[0];
    assert_eq!(band.band_name.as_deref(), Some("NearInfrared"));
    assert_eq!(band.unit.as_deref(), Some("W/(m\u{b2}\u{b7}sr\u{b7}\u{b5}m)"));
}

// ============================================================================
// Failure isolation
// ============================================================================

#[test]
fn test_missing_data_file_is_mandatory() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::deimos2()
        .no_data_file()
        .write(root.path(), "broken.dim");
    let family = deimos2_family();
    let task = CandidateTask::new(&dim, ProductTag::Ms);

    let err = family.try_build(&task).unwrap_err();
    assert!(matches!(err, IngestionError::MissingMetadata(_)));
    assert!(family.build(&task).is_empty());
}

#[test]
fn test_missing_raster_on_disk() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::deimos2().write(root.path(), "no_image.dim");
    let err = deimos2_family()
        .try_build(&CandidateTask::new(&dim, ProductTag::Ms))
        .unwrap_err();
    assert!(matches!(err, IngestionError::MissingRaster(_)));
}

#[test]
fn test_bad_candidate_does_not_abort_crawl() {
    let root = TempDir::new().unwrap();
    DimBuilder::deimos2()
        .no_data_file()
        .write(root.path(), "a_broken.dim");
    std::fs::write(root.path().join("b_garbage.dim"), "<Dimap_Document><MISSION>Deimos 2</MISSION><unclosed>").unwrap();
    DimBuilder::deimos2().write_with_raster(root.path(), "c_good.dim");

    let family = deimos2_family();
    let report = Ingester::new(&family, IngestOptions::default())
        .collect(&CrawlerConfig::new([root.path()]))
        .unwrap();

    assert_eq!(report.crawl.paths_seen, 3);
    assert_eq!(report.crawl.paths_skipped, 1);
    assert_eq!(report.tasks_seen, 2);
    assert_eq!(report.tasks_skipped, 1);
    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].item_uri.display_name, "c_good.dim");
}

#[test]
fn test_missing_optional_fields_are_absent() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::deimos2()
        .without_scene_field("SUN_AZIMUTH")
        .without_scene_field("IMAGING_TIME")
        .bands(vec![DimBand {
            index: Some(0),
            description: Some("PAN".into()),
            gain: Some(0.5),
            ..Default::default()
        }])
        .write_with_raster(root.path(), "sparse.dim");

    let items = deimos2_family().build(&CandidateTask::new(&dim, ProductTag::Ms));
    assert_eq!(items.len(), 1);
    let props = &items[0].key_properties;
    assert_eq!(props.sun_azimuth, None);
    assert_eq!(props.acquisition_date.as_deref(), Some("2015-06-21"));
    assert_eq!(props.band_properties.len(), 1);
    assert_eq!(props.band_properties[0].band_name.as_deref(), Some("Panchromatic"));
    assert_eq!(props.band_properties[0].radiance_bias, None);

    let json = serde_json::to_value(&items[0].key_properties).unwrap();
    assert!(json.get("sunAzimuth").is_none());
    assert!(json.get("sunElevation").is_some());
}

#[test]
fn test_partial_frame_vertices_skipped() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::deimos2()
        .frame(&fixtures::frame::MADRID[..3])
        .raw_vertex(Some(-3.74), None)
        .write_with_raster(root.path(), "partial.dim");
    let item = &deimos2_family().build(&CandidateTask::new(&dim, ProductTag::Ms))[0];
    assert_eq!(item.footprint.vertex_count(), 3);
}

#[test]
fn test_degenerate_frame_gives_empty_footprint() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::deimos2()
        .frame(&fixtures::frame::MADRID[..2])
        .write_with_raster(root.path(), "line.dim");
    let items = deimos2_family().build(&CandidateTask::new(&dim, ProductTag::Ms));
    assert_eq!(items.len(), 1);
    assert!(items[0].footprint.is_empty());
}

#[test]
fn test_build_is_deterministic() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::deimos2().write_with_raster(root.path(), "scene.dim");
    let family = deimos2_family();
    let task = CandidateTask::new(&dim, ProductTag::Ms);
    assert_eq!(family.build(&task), family.build(&task));
}

// ============================================================================
// Spatial reference chain
// ============================================================================

#[test]
fn test_srs_prefers_epsg_code() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::deimos2()
        .epsg("EPSG:32630")
        .write_with_raster(root.path(), "scene.dim");
    let item = &deimos2_family().build(&CandidateTask::new(&dim, ProductTag::Ms))[0];
    assert_eq!(item.spatial_reference, SpatialReference::Epsg(EpsgCode(32630)));
}

#[test]
fn test_srs_invalid_code_falls_through_to_wkt() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::deimos2()
        .epsg("EPSG:unknown")
        .write_with_raster(root.path(), "scene.dim");
    let item = &deimos2_family().build(&CandidateTask::new(&dim, ProductTag::Ms))[0];
    match &item.spatial_reference {
        SpatialReference::Wkt(wkt) => assert!(wkt.contains("UTM zone 30N")),
        other => panic!("expected WKT, got {:?}", other),
    }
}

#[test]
fn test_srs_nested_source_wkt() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::deimos2()
        .no_spatial_reference()
        .source_wkt("GEOGCS[\"WGS 84\"]")
        .write_with_raster(root.path(), "scene.dim");
    let item = &deimos2_family().build(&CandidateTask::new(&dim, ProductTag::Ms))[0];
    assert_eq!(
        item.spatial_reference,
        SpatialReference::Wkt("GEOGCS[\"WGS 84\"]".into())
    );
}

#[test]
fn test_srs_unresolved_does_not_fail() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::deimos2()
        .no_spatial_reference()
        .write_with_raster(root.path(), "scene.dim");
    let items = deimos2_family().build(&CandidateTask::new(&dim, ProductTag::Ms));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].spatial_reference, SpatialReference::Unresolved);
}

// ============================================================================
// Other DIMAP missions
// ============================================================================

#[test]
fn test_deimos1_quality_and_epsg() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::deimos1().write_with_raster(root.path(), "d1.dim");
    let family = DimapFamily::new(&deimos1::PROFILE);

    assert!(family.detect(&dim).matches);
    let items = family.build(&CandidateTask::new(&dim, ProductTag::Ms));
    assert_eq!(items.len(), 1);
    let item = &items[0];
    assert_eq!(item.spatial_reference, SpatialReference::Epsg(EpsgCode(32630)));
    assert_eq!(item.key_properties.sensor_azimuth, Some(101.5));
    assert_eq!(item.key_properties.sensor_elevation, Some(78.25));
    assert_eq!(item.key_properties.band_properties.len(), 3);
    assert!(item.variables.is_none());
}

#[test]
fn test_deimos1_without_band_count_is_multispectral() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::deimos1()
        .nbands_list(&[])
        .write_with_raster(root.path(), "d1.dim");
    let family = DimapFamily::new(&deimos1::PROFILE);
    let tags: Vec<_> = family.enumerate_tags(&dim).unwrap().tags.iter().collect();
    assert_eq!(tags, vec![ProductTag::Ms]);
}

#[test]
fn test_dzz_hr_list_and_nested_frame() {
    let root = TempDir::new().unwrap();
    let builder = DimBuilder::dzz_hr();
    let dim = builder.write_with_raster(root.path(), "kz.dim");
    let family = DimapFamily::new(&kazakhstan::PROFILE);

    let items = family.build(&CandidateTask::new(&dim, ProductTag::Ms));
    assert_eq!(items.len(), 1);
    let item = &items[0];
    assert_eq!(item.raster_files["Raster1"], root.path().join("IMAGERY.TIF"));
    assert_eq!(item.footprint.vertex_count(), 4);
    assert_eq!(item.key_properties.viewing_angle_along_track, Some(3.1));
    assert_eq!(item.key_properties.viewing_angle_across_track, Some(-7.4));
    assert_eq!(item.key_properties.theoretical_resolution, Some(6.5));
}

#[test]
fn test_dzz_hr_href_fallback() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::dzz_hr()
        .data_file(DataFileRef::Href("alt.tif".into()))
        .write_with_raster(root.path(), "kz.dim");
    let items = DimapFamily::new(&kazakhstan::PROFILE).build(&CandidateTask::new(&dim, ProductTag::Ms));
    assert_eq!(items[0].raster_files["Raster1"], root.path().join("alt.tif"));
}

#[test]
fn test_nigeriasat2_incidence_angle() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::nigeriasat2().write_with_raster(root.path(), "ns2.dim");
    let family = DimapFamily::new(&nigeriasat2::PROFILE);
    let items = family.build(&CandidateTask::new(&dim, ProductTag::Ms));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].key_properties.incidence_angle, Some(14.8));
    assert_eq!(items[0].key_properties.sensor_name.as_deref(), Some("NigeriaSat-2"));
}

// ============================================================================
// Detection
// ============================================================================

#[test]
fn test_detection_by_mission() {
    let root = TempDir::new().unwrap();
    let d2 = DimBuilder::deimos2().write(root.path(), "d2.dim");
    let ns = DimBuilder::nigeriasat2().write(root.path(), "ns.dim");

    let deimos2 = deimos2_family();
    let nigeria = DimapFamily::new(&nigeriasat2::PROFILE);

    let result = deimos2.detect(&d2);
    assert!(result.matches);
    assert!(result.band_tags.contains(ProductTag::Ms));
    assert!(!deimos2.detect(&ns).matches);
    assert!(nigeria.can_build(&ns));
    assert!(!nigeria.can_build(&d2));
}

#[test]
fn test_detection_io_error_is_distinguishable() {
    let family = deimos2_family();
    let missing = std::path::Path::new("/no/such/scene.dim");

    assert!(!family.detect(missing).matches);
    let err = family.probe(missing).unwrap_err();
    assert_eq!(err.category(), ingestion::ErrorCategory::Io);
}

#[test]
fn test_detection_is_repeatable() {
    let root = TempDir::new().unwrap();
    let dim = DimBuilder::deimos2().write(root.path(), "d2.dim");
    let family = deimos2_family();
    assert_eq!(family.detect(&dim), family.detect(&dim));
}
