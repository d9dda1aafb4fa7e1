//! End-to-end pipeline tests against fixture files

mod common;

use common::{setup_fixture, GRID_CSV};
use netlimits::core::{
    Config, LimitsError, LimitsPipeline, PipelineInputs, ReferenceSheet, Stage, TrailKind,
};
use netlimits::entities::Judgement;
use std::fs;

fn inputs(fx: &common::Fixture) -> PipelineInputs {
    PipelineInputs {
        grid: fx.grid.clone(),
        reference: fx.reference.clone(),
        vendor: Some(fx.vendor.clone()),
    }
}

// ============================================================================
// Limits and judgements
// ============================================================================

#[test]
fn test_fixture_limits_and_judgements() {
    let fx = setup_fixture();
    let report = LimitsPipeline::new(Config::default())
        .run(&inputs(&fx))
        .unwrap();

    assert_eq!(report.samples_per_set, 3);
    assert_eq!(report.summary.net_count, 3);
    assert_eq!(report.summary.piece_count, 2);
    assert_eq!(report.summary.sets_per_piece, 2);
    assert_eq!(report.summary.total_measurements, 4);
    assert_eq!(report.summary.filtered_out_rows, 1);
    assert_eq!(report.summary.dropped_rows, 0);

    let net1 = &report.rows[0];
    let l1 = net1.limits.unwrap();
    assert_eq!((l1.lsl, l1.usl), (1.226, 1.242));
    assert_eq!((l1.scaled_lsl, l1.scaled_usl), (1226, 1242));
    assert_eq!(l1.internal_pair(), (1221, 1247));
    assert_eq!(net1.vendor.nominal, Some(1234.0));
    assert_eq!(net1.judgement_lsl, Judgement::Ok);
    assert_eq!(net1.judgement_usl, Judgement::Ok);
    assert_eq!(net1.identity.net_name.render(), "VBAT");
    assert_eq!(net1.identity.pin_a.render(), "P1");

    let net2 = &report.rows[1];
    assert_eq!(net2.limits.unwrap().internal_pair(), (2071, 2159));
    assert_eq!(net2.judgement_lsl, Judgement::Ng);
    assert_eq!(net2.judgement_usl, Judgement::Ng);

    let net3 = &report.rows[2];
    assert!(net3.is_sentinel());
    let l3 = net3.limits.unwrap();
    assert_eq!((l3.lsl, l3.usl), (0.0, 0.05));
    assert_eq!(l3.internal_pair(), (0, 50));
    assert_eq!(net3.judgement_lsl, Judgement::CannotJudge);

    assert_eq!(
        report.internal_pairs,
        vec![Some((1221, 1247)), Some((2071, 2159)), Some((0, 50))]
    );
    assert_eq!(report.trail.count(TrailKind::LookupMiss), 1);
    assert_eq!(report.trail.count(TrailKind::ShapeMismatch), 0);
}

#[test]
fn test_statistics_are_per_net() {
    let fx = setup_fixture();
    let report = LimitsPipeline::new(Config::default())
        .run(&inputs(&fx))
        .unwrap();

    let s = &report.statistics[0].stats;
    assert_eq!(s.count, 4);
    assert!((s.mean - 1.234).abs() < 1e-12);
    assert!((s.q1 - 1.2325).abs() < 1e-12);
    assert!((s.q3 - 1.2355).abs() < 1e-12);

    // 0.02 sits outside q3 + 1.5 IQR for the third NET
    let s3 = &report.statistics[2].stats;
    assert_eq!(s3.trimmed_count, 3);
    assert!((s3.trimmed_mean - 0.011).abs() < 1e-12);
}

#[test]
fn test_lsl_never_negative() {
    let fx = setup_fixture();
    // A wide spread on NET 1 pushes mean - 3 sigma below zero
    fs::write(
        &fx.grid,
        "PinA,PinB,Site,Method,Range,Unit,Piece1,Piece2\n\
         P1,N1,1,3,,,0.1,5\n\
         P2,N2,1,3,,,1,1\n\
         P1,N1,1,3,,,0.2,4\n\
         P2,N2,1,3,,,1,1\n",
    )
    .unwrap();
    fs::write(
        &fx.reference,
        ",,x\n,,\n,,\n,,1,A\n,,2,B\n",
    )
    .unwrap();

    let report = LimitsPipeline::new(Config::default())
        .run(&inputs(&fx))
        .unwrap();
    let l = report.rows[0].limits.unwrap();
    assert_eq!(l.lsl, 0.0);
    assert_eq!(l.internal_lsl, -5);
    assert!(l.usl > 0.0);
}

#[test]
fn test_runs_are_deterministic() {
    let fx = setup_fixture();
    let pipeline = LimitsPipeline::new(Config::default());
    let first = pipeline.run(&inputs(&fx)).unwrap();
    let second = pipeline.run(&inputs(&fx)).unwrap();
    assert_eq!(first.records(), second.records());
    assert_eq!(first.input_digest, second.input_digest);
    assert_eq!(first.input_digest.len(), 64);
}

#[test]
fn test_digest_changes_with_input() {
    let fx = setup_fixture();
    let pipeline = LimitsPipeline::new(Config::default());
    let before = pipeline.run(&inputs(&fx)).unwrap().input_digest;
    fs::write(&fx.grid, GRID_CSV.replace("1.231", "1.232")).unwrap();
    let after = pipeline.run(&inputs(&fx)).unwrap().input_digest;
    assert_ne!(before, after);
}

// ============================================================================
// Recoverable conditions
// ============================================================================

#[test]
fn test_missing_vendor_file_misses_every_lookup() {
    let fx = setup_fixture();
    let mut inputs = inputs(&fx);
    inputs.vendor = Some(fx.path("absent.csv"));

    let report = LimitsPipeline::new(Config::default()).run(&inputs).unwrap();
    assert_eq!(report.trail.count(TrailKind::LookupMiss), 3);
    assert!(report.rows.iter().all(|r| r.vendor.nominal.is_none()));
    assert!(report
        .rows
        .iter()
        .all(|r| r.judgement_lsl == Judgement::CannotJudge
            && r.judgement_usl == Judgement::CannotJudge));
    // Limits are still computed
    assert_eq!(report.rows[0].limits.unwrap().internal_pair(), (1221, 1247));
}

#[test]
fn test_trailing_rows_are_dropped_with_warning() {
    let fx = setup_fixture();
    let grid = format!("{}P1,N1,1,3,,mOhm,7,7\n", GRID_CSV);
    fs::write(&fx.grid, grid).unwrap();

    let report = LimitsPipeline::new(Config::default())
        .run(&inputs(&fx))
        .unwrap();
    assert_eq!(report.summary.dropped_rows, 1);
    assert_eq!(report.trail.count(TrailKind::ShapeMismatch), 1);
    // The extra row does not reach NET 1
    assert_eq!(report.statistics[0].stats.count, 4);
}

#[test]
fn test_disabling_the_filter_keeps_every_row() {
    let fx = setup_fixture();
    let config = Config::from_yaml("grid:\n  discriminator_col: null\n").unwrap();
    let report = LimitsPipeline::new(config).run(&inputs(&fx)).unwrap();
    assert_eq!(report.summary.filtered_out_rows, 0);
    // 7 rows with x = 3: two sets, one trailing row
    assert_eq!(report.summary.dropped_rows, 1);
    assert_eq!(report.rows[0].identity.pin_a.render(), "X");
}

// ============================================================================
// Fatal conditions
// ============================================================================

#[test]
fn test_missing_grid_is_input_missing() {
    let fx = setup_fixture();
    let mut inputs = inputs(&fx);
    inputs.grid = fx.path("nope.csv");
    let err = LimitsPipeline::new(Config::default())
        .run(&inputs)
        .unwrap_err();
    assert!(matches!(err.error, LimitsError::InputMissing { stage: Stage::LoadInputs, .. }));
    assert!(err.to_string().contains("grid file not found"));
    assert!(err.trail.is_empty());
}

#[test]
fn test_reference_without_count_is_input_missing() {
    let fx = setup_fixture();
    fs::write(&fx.reference, ",,DCR\n,,No\n,,none\n").unwrap();
    let err = LimitsPipeline::new(Config::default())
        .run(&inputs(&fx))
        .unwrap_err();
    assert_eq!(err.stage(), Stage::LoadInputs);
    assert!(err.to_string().contains("samples-per-set"));
}

#[test]
fn test_all_rows_filtered_is_empty_input() {
    let fx = setup_fixture();
    fs::write(&fx.grid, GRID_CSV.replace(",3,", ",4,")).unwrap();
    let err = LimitsPipeline::new(Config::default())
        .run(&inputs(&fx))
        .unwrap_err();
    assert!(matches!(err.error, LimitsError::EmptyInput { stage: Stage::FilterRows, .. }));
    assert_eq!(err.stage(), Stage::FilterRows);
    let load = &err.trail.entries()[0];
    assert_eq!(load.stage, Stage::LoadInputs);
    assert!(load.message.contains("3 samples per set"));
}

// ============================================================================
// Reference write-back
// ============================================================================

#[test]
fn test_sync_writes_internal_pairs() {
    let fx = setup_fixture();
    let pipeline = LimitsPipeline::new(Config::default());
    let mut report = pipeline.run(&inputs(&fx)).unwrap();
    pipeline.sync_reference(&mut report, &fx.reference);

    let sync = report.sync.clone().unwrap();
    assert!(sync.succeeded);
    assert_eq!(sync.updated_rows, 3);

    let content = fs::read_to_string(&fx.reference).unwrap();
    assert!(content.contains(",,1,VBAT,J1,1,U2,10,,,,1221,1247,1221,1247"));
    assert!(content.contains(",,2,VSYS,J1,2,U2,20,,,,2071,2159,2071,2159"));
    assert!(content.contains(",,3,GND,J1,3,U2,30,,,,0,50,0,50"));
    // Title rows survive untouched
    assert!(content.starts_with(",,DCR,"));

    // The written file still reads back as the same reference
    let reloaded = ReferenceSheet::load(&fx.reference, &Config::default().reference).unwrap();
    assert_eq!(reloaded.samples_per_set(), 3);
}

#[test]
fn test_sync_is_idempotent() {
    let fx = setup_fixture();
    let pipeline = LimitsPipeline::new(Config::default());

    let mut first = pipeline.run(&inputs(&fx)).unwrap();
    pipeline.sync_reference(&mut first, &fx.reference);
    let once = fs::read_to_string(&fx.reference).unwrap();

    let mut second = pipeline.run(&inputs(&fx)).unwrap();
    pipeline.sync_reference(&mut second, &fx.reference);
    let twice = fs::read_to_string(&fx.reference).unwrap();

    assert_eq!(once, twice);
    assert_eq!(first.records(), second.records());
}

#[test]
fn test_sync_failure_is_a_warning() {
    let fx = setup_fixture();
    let pipeline = LimitsPipeline::new(Config::default());
    let mut report = pipeline.run(&inputs(&fx)).unwrap();
    let rows_before = report.records();

    pipeline.sync_reference(&mut report, &fx.path("missing/reference.csv"));

    let sync = report.sync.clone().unwrap();
    assert!(!sync.succeeded);
    assert_eq!(report.trail.count(TrailKind::ExternalWriteFailure), 1);
    assert_eq!(report.records(), rows_before);
}
