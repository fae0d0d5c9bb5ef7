//! 存储池指标推导集成测试

use hsi_metrics::{
    derive_page, derive_pool, round_half_up, CompressionRatio, EngineConfig, MetricsError,
    PoolMetrics, PoolRecord, PoolVariant, RecordPolicy, RowEntry, UnclassifiedPolicy,
};
use serde_json::{json, Value};

fn scenario_a() -> Value {
    json!({
        "poolId": 20,
        "poolName": "FMC_HDP",
        "poolType": "HDP",
        "totalPoolCapacity": 10062024,
        "availableVolumeCapacity": 8838690,
        "availablePhysicalVolumeCapacity": 8838690,
        "usedPhysicalCapacity": 316512,
        "totalPhysicalCapacity": 4910262,
        "availablePhysicalFMCPoolVolumesCapacity": 4910262,
        "usedFMCPoolVolumesCapacity": 1223334,
        "usedPhysicalFMCPoolVolumesCapacity": 316498
    })
}

fn scenario_b() -> Value {
    json!({
        "poolId": 3,
        "poolName": "RT_POOL",
        "poolType": "RT",
        "totalPoolCapacity": 10000000,
        "availableVolumeCapacity": 4000000
    })
}

fn derive(value: Value) -> hsi_metrics::Result<PoolMetrics> {
    let record = PoolRecord::from_json(&value)?;
    derive_pool(&record, &EngineConfig::default()).map(|m| m.expect("not skipped"))
}

fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} ± {}, got {}",
        expected,
        tolerance,
        actual
    );
}

#[test]
fn test_rounding_law() {
    assert_eq!(round_half_up(3.005, 2), 3.01);
    assert_eq!(round_half_up(3.004, 2), 3.0);
}

#[test]
fn test_scenario_a_all_flash() {
    let m = derive(scenario_a()).unwrap();

    assert_eq!(m.variant, PoolVariant::AllFlashCompressed);
    assert_close(m.total_physical_capacity_gb, 4795.18, 0.1);
    assert_close(m.used_physical_capacity_gb, 309.09, 0.1);
    assert_close(m.free_physical_capacity_gb, 8631.53, 0.1);
    assert_close(m.total_compression_ratio.as_f64(), 3.87, 0.1);
    assert_close(m.fmc_compression_ratio.as_f64(), 3.87, 0.1);
    assert_close(m.effective_free_gb, 33404.03, 0.1);
    assert!(!m.fmc_compression_ratio.is_sentinel());
}

#[test]
fn test_scenario_b_tiered() {
    let m = derive(scenario_b()).unwrap();

    assert_eq!(m.variant, PoolVariant::Tiered);
    assert_eq!(m.total_physical_capacity_gb, 9765.63);
    assert_eq!(m.free_physical_capacity_gb, 3906.25);
    assert_eq!(m.used_physical_capacity_gb, 5859.38);
    assert_eq!(m.fmc_compression_ratio, CompressionRatio::Unsupported);
    assert_eq!(m.total_compression_ratio, CompressionRatio::Unsupported);
    assert_eq!(m.fmc_compression_ratio.to_string(), "-1.00");
    assert_eq!(m.effective_free_gb, 3906.25);
    assert!(m.capacity_balanced());
}

#[test]
fn test_scenario_c_division_by_zero() {
    let mut value = scenario_a();
    value["usedPhysicalCapacity"] = json!(0);

    let err = derive(value).unwrap_err();
    match err {
        MetricsError::DivisionByZero { ratio, divisor, pool } => {
            assert_eq!(ratio, "totalCompressionRatio");
            assert_eq!(divisor, "usedPhysicalCapacity");
            assert_eq!(pool.id, Some(20));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_mixed_pool_shares_compressed_formulas() {
    let mut value = scenario_a();
    value["availablePhysicalFMCPoolVolumesCapacity"] = json!(4000000);

    let mixed = derive(value).unwrap();
    let all_flash = derive(scenario_a()).unwrap();

    assert_eq!(mixed.variant, PoolVariant::MixedCompressed);
    assert_eq!(mixed.total_compression_ratio, all_flash.total_compression_ratio);
    assert_eq!(mixed.effective_free_gb, all_flash.effective_free_gb);
}

#[test]
fn test_sentinel_and_balance_for_uncompressed_variants() {
    for pool_type in ["RT", "HDT", "HDP", "HTI"] {
        let m = derive(json!({
            "poolId": 1,
            "poolName": pool_type,
            "poolType": pool_type,
            "totalPoolCapacity": 11739672,
            "availableVolumeCapacity": 2808204
        }))
        .unwrap();

        assert!(m.fmc_compression_ratio.is_sentinel(), "{pool_type}");
        assert!(m.total_compression_ratio.is_sentinel(), "{pool_type}");
        assert!(m.capacity_balanced(), "{pool_type}");
        assert_eq!(m.effective_free_gb, m.free_physical_capacity_gb);
    }
}

#[test]
fn test_page_preserves_order() {
    let page = json!({ "data": [scenario_b(), scenario_a()] });
    let report = derive_page(&page, &EngineConfig::default()).unwrap();

    assert_eq!(report.metrics.len(), 2);
    assert_eq!(report.metrics[0].pool_id, 3);
    assert_eq!(report.metrics[1].pool_id, 20);

    let blocks = report.rows.blocks();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0][1].1, "RT_POOL");
    assert_eq!(blocks[1][1].1, "FMC_HDP");
    assert_eq!(report.rows.entries()[0], RowEntry::Start);
}

#[test]
fn test_unclassified_skipped_by_default() {
    let page = json!({ "data": [
        { "poolId": 9, "poolName": "MF", "poolType": "MF",
          "totalPoolCapacity": 1, "availableVolumeCapacity": 1 },
        scenario_b()
    ] });

    let report = derive_page(&page, &EngineConfig::default()).unwrap();
    assert_eq!(report.metrics.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].pool.id, Some(9));
}

#[test]
fn test_unclassified_error_policy() {
    let page = json!({ "data": [
        { "poolId": 9, "poolName": "MF", "poolType": "MF",
          "totalPoolCapacity": 1, "availableVolumeCapacity": 1 }
    ] });
    let config = EngineConfig {
        unclassified: UnclassifiedPolicy::Error,
        ..EngineConfig::default()
    };

    let err = derive_page(&page, &config).unwrap_err();
    assert!(matches!(err, MetricsError::UnclassifiablePoolType { .. }));
}

#[test]
fn test_invalid_record_policies() {
    let page = json!({ "data": [
        { "poolId": 4, "poolName": "broken", "poolType": "HDP",
          "totalPoolCapacity": "n/a", "availableVolumeCapacity": 1 },
        scenario_b()
    ] });

    let err = derive_page(&page, &EngineConfig::default()).unwrap_err();
    assert!(err.to_string().contains("broken"));
    assert!(err.to_string().contains("totalPoolCapacity"));

    let config = EngineConfig {
        invalid_record: RecordPolicy::Skip,
        ..EngineConfig::default()
    };
    let report = derive_page(&page, &config).unwrap();
    assert_eq!(report.metrics.len(), 1);
    assert_eq!(report.skipped[0].pool.name.as_deref(), Some("broken"));
}

#[test]
fn test_schema_violation_is_fatal() {
    let config = EngineConfig {
        unclassified: UnclassifiedPolicy::Skip,
        invalid_record: RecordPolicy::Skip,
    };

    let err = derive_page(&json!({ "data": [], "total": 0 }), &config).unwrap_err();
    assert!(matches!(err, MetricsError::SchemaViolation(_)));

    let err = derive_page(&json!({ "pools": [] }), &config).unwrap_err();
    assert!(matches!(err, MetricsError::SchemaViolation(_)));
}

#[test]
fn test_empty_page() {
    let report = derive_page(&json!({ "data": [] }), &EngineConfig::default()).unwrap();
    assert!(report.rows.is_empty());
    assert!(report.metrics.is_empty());
}
