//! Batch ingestion tests over CSV fixtures

use tcir_common::scales::ScaleCode;
use tcir_engine::ingest::{ingest, IngestSession, IngestStage};
use tcir_engine::normalizer::percentile_from_standardized;
use tcir_engine::ScoringError;

const SCORES: &str = include_str!("fixtures/scores.csv");
const HEADER: &str = "name,ns_t,ha_t,rd_t,ps_t,sd_t,co_t,st_t";

#[test]
fn test_fixture_partitions_rows() {
    let result = ingest(SCORES).unwrap();

    let names: Vec<&str> = result.valid_records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Kim", "Lee", "Choi, Min"]);
    assert_eq!(
        result.errors,
        vec![
            "Row 5: missing name".to_string(),
            "Row 6 (Jung): non-numeric or missing T-score for HA ('abc')".to_string(),
        ]
    );
}

#[test]
fn test_single_bad_score_rejects_only_that_row() {
    let csv = format!("{HEADER}\nKim,55,abc,48,42,52,58,45\nLee,45,50,52,60,48,40,55\n");
    let result = ingest(&csv).unwrap();

    assert_eq!(result.valid_records.len(), 1);
    assert_eq!(result.valid_records[0].name, "Lee");
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("HA"));
    assert!(result.errors[0].contains("Kim"));
}

#[test]
fn test_percentiles_back_filled_from_t_scores() {
    let result = ingest(SCORES).unwrap();
    let kim = result.record("Kim").unwrap();

    for (scale, score) in &kim.scales {
        assert_eq!(
            score.percentile,
            f64::from(percentile_from_standardized(score.t)),
            "back-filled percentile for {scale}"
        );
    }
    assert_eq!(kim.scales[&ScaleCode::NoveltySeeking].percentile, 84.0);
}

#[test]
fn test_supplied_percentile_kept() {
    let result = ingest(SCORES).unwrap();
    let lee = result.record("Lee").unwrap();
    // T 40 would back-fill to 16
    assert_eq!(lee.scales[&ScaleCode::NoveltySeeking].percentile, 20.0);
}

#[test]
fn test_subscales_parsed_and_bad_values_dropped() {
    let result = ingest(SCORES).unwrap();
    assert_eq!(result.record("Kim").unwrap().subscale("ns1"), Some(12.0));
    assert_eq!(result.record("Kim").unwrap().subscale("ha2"), Some(9.0));
    assert!(result.record("Lee").unwrap().subscales.is_empty());
}

#[test]
fn test_missing_required_column_is_structural() {
    let csv = "name,ns_t,ha_t,ps_t,sd_t,co_t,st_t\nKim,55,50,42,52,58,45\nLee,45,50,60,48,40,55\n";
    let err = ingest(csv).unwrap_err();
    match err {
        ScoringError::MissingColumns(columns) => assert_eq!(columns, vec!["rd_t".to_string()]),
        other => panic!("expected MissingColumns, got {other}"),
    }
    assert_eq!(
        ingest(csv).unwrap_err().to_string(),
        "Missing required columns: rd_t"
    );
}

#[test]
fn test_header_normalization() {
    let csv = "\u{feff}Name, NS_T ,HA_T,RD_T,PS_T,SD_T,CO_T,ST_T\r\n Kim ,55,50,48,42,52,58,45\r\n";
    let result = ingest(csv).unwrap();
    assert_eq!(result.valid_records.len(), 1);
    assert_eq!(result.valid_records[0].name, "Kim");
}

#[test]
fn test_empty_upload() {
    assert!(matches!(ingest(""), Err(ScoringError::EmptyInput)));
}

#[test]
fn test_header_only_upload_is_empty_result() {
    let result = ingest(&format!("{HEADER}\n")).unwrap();
    assert!(result.valid_records.is_empty());
    assert!(!result.has_errors());
}

#[test]
fn test_session_reports_error_flag() {
    let mut session = IngestSession::upload(SCORES);
    session.parse().unwrap();
    session.validate().unwrap();
    assert_eq!(session.stage(), IngestStage::Validated { with_errors: true });
    let result = session.accept().unwrap();
    assert_eq!(result.errors.len(), 2);
    assert_eq!(session.stage(), IngestStage::Accepted);
}

#[test]
fn test_unterminated_quote_keeps_following_rows() {
    let csv = format!("{HEADER}\n\"Kim,55,50,48,42,52,58,45\nLee,55,50,48,42,52,58,45\nPark,60,50,48,42,52,58,45\n");
    let result = ingest(&csv).unwrap();
    assert_eq!(result.errors, vec!["Row 2: unterminated quoted field".to_string()]);
    assert!(result.record("Lee").is_some());
    assert!(result.record("Park").is_some());
}

#[test]
fn test_out_of_range_percentiles_do_not_reach_comparison() {
    let csv = format!("{HEADER},ns_p\nKim,60,50,48,42,52,58,45,150\nLee,40,50,48,42,52,58,45,-30\n");
    let result = ingest(&csv).unwrap();
    let kim = result.record("Kim").unwrap().to_profile(tcir_engine::Convention::Percentile).unwrap();
    let lee = result.record("Lee").unwrap().to_profile(tcir_engine::Convention::Percentile).unwrap();
    let cmp = tcir_engine::dyadic::compare(&kim, &lee).unwrap();
    assert_eq!(cmp.record(ScaleCode::NoveltySeeking).unwrap().gap, 68.0);
}
