// ==========================================
// 计算器会话集成测试
// ==========================================
// 测试目标: SQLite 快照存取 + 迁移 + 编辑写回 + 步骤校验
// ==========================================

mod test_helpers;

use folkcharm_impact::api::{ApiError, CalculatorSession, WizardStep};
use folkcharm_impact::config::EmissionFactors;
use folkcharm_impact::domain::{TransportLeg, WaterEntry};
use folkcharm_impact::repository::{CalculatorStateRepository, MemoryStateStore, StateStore};
use folkcharm_impact::{EmissionCategory, VehicleClass, WaterSource, STATE_STORAGE_KEY};
use test_helpers::{assert_close, create_test_db, sample_record, test_migrator};

#[test]
fn test_session_survives_reopen() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    {
        let repo = CalculatorStateRepository::new(&db_path).unwrap();
        let mut session = CalculatorSession::open(repo, test_migrator()).unwrap();
        session
            .update(|r| {
                r.materials.recycled_yarn.weight_kg = 8.0;
                r.production.sewing_hours = 4.0;
            })
            .unwrap();
        session
            .add_water_entry(WaterEntry::new("Wash", 0.3, WaterSource::Tap))
            .unwrap();
    }

    let repo = CalculatorStateRepository::new(&db_path).unwrap();
    let session = CalculatorSession::open(repo, test_migrator()).unwrap();
    assert_eq!(session.record().materials.recycled_yarn.weight_kg, 8.0);
    assert_eq!(session.record().water.len(), 1);
    assert_eq!(session.storage_key(), STATE_STORAGE_KEY);
}

#[test]
fn test_legacy_snapshot_is_migrated_on_open() {
    folkcharm_impact::logging::init_test();

    let legacy = r#"{
        "materials": {"farmerCotton": {"weight": 100, "farmArea": 0.5}},
        "logistics": {"farmToSpinner": {"distance": 80, "vehicleType": "Light Vehicle"}},
        "delivery": {"finalDistance": 200, "vehicleType": "Heavy Vehicle"}
    }"#;
    let store = MemoryStateStore::with_entry(STATE_STORAGE_KEY, legacy);
    let session = CalculatorSession::open(store, test_migrator()).unwrap();

    assert!(session.record().logistics.is_empty());
    let result = session.results(&EmissionFactors::default());
    assert_close(result.category(EmissionCategory::Materials), 46.875);

    // 打开本身不写回,首次编辑后才以当前形状保存
    let raw = session.store().load_raw(STATE_STORAGE_KEY).unwrap().unwrap();
    assert!(raw.contains("delivery"));
}

#[test]
fn test_corrupt_snapshot_opens_empty() {
    let store = MemoryStateStore::with_entry(STATE_STORAGE_KEY, "{{{");
    let session = CalculatorSession::open(store, test_migrator()).unwrap();
    assert_eq!(session.record(), &test_migrator().default_record());
}

#[test]
fn test_import_replaces_and_persists() {
    let mut session = CalculatorSession::open(MemoryStateStore::new(), test_migrator()).unwrap();
    let raw = serde_json::to_string(&sample_record()).unwrap();
    session.import_snapshot(&raw).unwrap();

    assert_eq!(session.record(), &sample_record());
    let stored = session.store().load_raw(STATE_STORAGE_KEY).unwrap().unwrap();
    assert_eq!(test_migrator().migrate_str(&stored), sample_record());
}

#[test]
fn test_step_validation_through_session() {
    let mut session = CalculatorSession::open(MemoryStateStore::new(), test_migrator()).unwrap();
    session
        .add_transport_leg(TransportLeg::new("Studio", 5.0, 12.0, VehicleClass::Unset))
        .unwrap();

    match session.validate_step(WizardStep::Logistics) {
        Err(ApiError::ValidationFailed { violations, .. }) => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].code, "VEHICLE_REQUIRED");
        }
        other => panic!("Expected ValidationFailed, got {:?}", other),
    }

    // 校验失败不影响计算
    let result = session.results(&EmissionFactors::default());
    assert_eq!(result.category(EmissionCategory::Logistics), 0.0);
}

#[test]
fn test_remove_unknown_entry_is_not_found() {
    let mut session = CalculatorSession::open(MemoryStateStore::new(), test_migrator()).unwrap();
    assert!(matches!(
        session.remove_water_entry("missing"),
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        session.remove_electricity_entry("missing"),
        Err(ApiError::NotFound(_))
    ));
}
