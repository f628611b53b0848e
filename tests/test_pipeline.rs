//! Integration test: fill pipeline end-to-end

use gridfill::prelude::*;
use polars::prelude::*;

fn f64_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

fn str_values(df: &DataFrame, name: &str) -> Vec<String> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap().to_string())
        .collect()
}

/// 3x3 grid, identifiers 1..9 bottom-up
fn drive_test_df() -> DataFrame {
    df!(
        "OID" => &[1i64, 2, 3, 4, 5, 6, 7, 8, 9],
        "SS_RSRP" => &[Some(-90.0), None, Some(-96.0), None, None, None, Some(-102.0), None, Some(-108.0)],
        "NETWORK_TYPE" => &[Some("NR"), Some("NR"), None, Some("LTE"), None, Some("NR"), None, None, Some("LTE")],
        "Building_Coverage" => &[0.9, 0.9, 0.9, 0.9, 0.9, 0.9, 0.9, 0.9, 0.9],
        "ALL_EMPTY" => &[None::<f64>, None, None, None, None, None, None, None, None],
    )
    .unwrap()
}

#[test]
fn test_two_by_two_scenario_scatter_order() {
    // OIDs out of order to check values land back on the right record
    let df = df!(
        "OID" => &[4i64, 2, 1, 3],
        "value" => &[None, Some(2.0), None, Some(4.0)],
    )
    .unwrap();
    let config = PipelineConfig::new(2, 2)
        .with_field(FieldSpec::continuous("value"))
        .with_max_rounds(1);

    let output = Pipeline::new(config).unwrap().run(&df).unwrap();

    assert_eq!(
        f64_values(&output.frame, "value"),
        vec![Some(3.0), Some(2.0), Some(3.0), Some(4.0)]
    );
    let oids: Vec<Option<i64>> = output.frame.column("OID").unwrap()
        .as_materialized_series()
        .i64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(oids, vec![Some(4), Some(2), Some(1), Some(3)]);
    assert!(output.report.is_complete());
}

#[test]
fn test_continuous_and_categorical_fill() {
    let config = PipelineConfig::new(3, 3)
        .with_field(FieldSpec::continuous("SS_RSRP"))
        .with_field(FieldSpec::categorical("NETWORK_TYPE"));
    let output = Pipeline::new(config).unwrap().run(&drive_test_df()).unwrap();

    let rsrp = f64_values(&output.frame, "SS_RSRP");
    assert!(rsrp.iter().all(Option::is_some));
    // Centre cell (OID 5) sees all four corners
    assert_eq!(rsrp[4], Some(-99.0));
    // Observed values are untouched
    assert_eq!(rsrp[0], Some(-90.0));

    let net = str_values(&output.frame, "NETWORK_TYPE");
    assert!(net.iter().all(|v| v == "NR" || v == "LTE"));
    assert_eq!(net[0], "NR");
    assert_eq!(net[3], "LTE");

    let table = &output.codecs["NETWORK_TYPE"];
    assert_eq!(table.tokens(), &["LTE", "MISSING", "NR"]);
}

#[test]
fn test_all_missing_field_passes_through() {
    let config = PipelineConfig::new(3, 3)
        .with_field(FieldSpec::continuous("ALL_EMPTY"))
        .with_field(FieldSpec::continuous("SS_RSRP"));
    let output = Pipeline::new(config).unwrap().run(&drive_test_df()).unwrap();

    let report = output.report.field("ALL_EMPTY").unwrap();
    assert_eq!(report.fills_per_round, vec![0]);
    assert_eq!(report.residual_missing, 9);
    assert!(!output.report.is_complete());
    assert_eq!(output.report.incomplete_fields(), vec!["ALL_EMPTY"]);
    assert!(f64_values(&output.frame, "ALL_EMPTY").iter().all(Option::is_none));
}

#[test]
fn test_all_missing_categorical_decodes_to_placeholder() {
    let df = df!(
        "OID" => &[1i64, 2, 3, 4],
        "band" => &[None::<&str>, None, None, None],
    )
    .unwrap();
    let config = PipelineConfig::new(2, 2)
        .with_field(FieldSpec::categorical("band"))
        .with_missing_label("UNKNOWN");
    let output = Pipeline::new(config).unwrap().run(&df).unwrap();

    assert_eq!(str_values(&output.frame, "band"), vec!["UNKNOWN"; 4]);
}

#[test]
fn test_parallel_matches_sequential() {
    let base = PipelineConfig::new(3, 3)
        .with_field(FieldSpec::continuous("SS_RSRP"))
        .with_field(FieldSpec::categorical("NETWORK_TYPE"))
        .with_smoothing(SmoothingSpec::new("Building_Coverage").with_window(3));

    let df = drive_test_df();
    let parallel = Pipeline::new(base.clone().with_parallel(true)).unwrap().run(&df).unwrap();
    let sequential = Pipeline::new(base.with_parallel(false)).unwrap().run(&df).unwrap();

    assert!(parallel.frame.equals_missing(&sequential.frame));
    assert_eq!(parallel.report, sequential.report);
}

#[test]
fn test_smoothing_uses_filled_declared_field() {
    let config = PipelineConfig::new(3, 3)
        .with_field(FieldSpec::continuous("SS_RSRP"))
        .with_smoothing(
            SmoothingSpec::new("SS_RSRP")
                .with_window(3)
                .with_output("RSRP_SMOOTH"),
        );
    let output = Pipeline::new(config).unwrap().run(&drive_test_df()).unwrap();

    let filled = f64_values(&output.frame, "SS_RSRP");
    let smoothed = f64_values(&output.frame, "RSRP_SMOOTH");
    // Centre cell averages the whole filled grid
    let expected: f64 = filled.iter().map(|v| v.unwrap()).sum::<f64>() / 9.0;
    assert!((smoothed[4].unwrap() - expected).abs() < 1e-9);
}

#[test]
fn test_derived_column_default_name() {
    let config = PipelineConfig::new(3, 3).with_smoothing(SmoothingSpec::new("Building_Coverage"));
    let output = Pipeline::new(config).unwrap().run(&drive_test_df()).unwrap();

    let smoothed = f64_values(&output.frame, "Building_Coverage_5x5");
    // 5x5 window over a 3x3 grid: every cell sees all 9 values
    for v in smoothed {
        assert!((v.unwrap() - 0.9 * 9.0 / 25.0).abs() < 1e-12);
    }
}

#[test]
fn test_identifier_errors() {
    let config = PipelineConfig::new(3, 3).with_field(FieldSpec::continuous("SS_RSRP"));
    let pipeline = Pipeline::new(config).unwrap();

    let wrong_grid = PipelineConfig::new(2, 4).with_field(FieldSpec::continuous("SS_RSRP"));
    let err = Pipeline::new(wrong_grid).unwrap().run(&drive_test_df()).unwrap_err();
    assert!(matches!(err, GridFillError::OutOfRange { oid: 9, max: 8 }));

    let short = drive_test_df().head(Some(8));
    let err = pipeline.run(&short).unwrap_err();
    assert!(matches!(err, GridFillError::DimensionMismatch { .. }));
}

#[test]
fn test_smoothing_field_missing_from_table() {
    let config = PipelineConfig::new(3, 3)
        .with_field(FieldSpec::continuous("SS_RSRP"))
        .with_smoothing(SmoothingSpec::new("Nope"));
    let err = Pipeline::new(config).unwrap().run(&drive_test_df()).unwrap_err();
    assert!(matches!(err, GridFillError::MissingField(ref n) if n == "Nope"));
}
