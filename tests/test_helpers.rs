// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、固定日期、测试记录构造
// ==========================================
#![allow(dead_code)]

use chrono::NaiveDate;
use folkcharm_impact::db::{init_schema, open_sqlite_connection};
use folkcharm_impact::domain::{ElectricityEntry, InputRecord, TransportLeg, WaterEntry};
use folkcharm_impact::engine::StateMigrator;
use folkcharm_impact::{VehicleClass, WaterSource};
use rusqlite::Connection;
use std::error::Error;
use tempfile::NamedTempFile;

/// 浮点比较容差
pub const EPS: f64 = 1e-9;

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPS,
        "expected {} but got {}",
        expected,
        actual
    );
}

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(open_sqlite_connection(db_path)?)
}

/// 测试固定日期
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
}

pub fn test_migrator() -> StateMigrator {
    StateMigrator::new(test_today())
}

pub fn empty_record() -> InputRecord {
    InputRecord::empty(test_today())
}

/// 覆盖所有类别的典型批次记录
pub fn sample_record() -> InputRecord {
    let mut r = empty_record();
    r.materials.farmer_cotton.weight_kg = 20.0;
    r.materials.farmer_cotton.farm_area_hectares = 0.5;
    r.materials.recycled_yarn.weight_kg = 10.0;
    r.materials.leftover_cotton.weight_kg = 5.0;

    r.logistics.entries = vec![
        TransportLeg::new("Farm to Spinner", 20.0, 120.0, VehicleClass::Light),
        TransportLeg::new("Spinner to Weaver", 18.0, 300.0, VehicleClass::Heavy),
        TransportLeg::new("Factory to Studio", 10.0, 45.0, VehicleClass::Light),
    ];
    r.electricity.entries = vec![
        ElectricityEntry::new("Studio lighting", 12.5),
        ElectricityEntry::new("Sewing machines", 6.0),
    ];
    r.water.entries = vec![
        WaterEntry::new("Dyeing", 1.2, WaterSource::Soft),
        WaterEntry::new("Washing", 0.8, WaterSource::Tap),
    ];
    r.production.sewing_hours = 16.0;
    r.production.item_quantity = 40;
    r
}
