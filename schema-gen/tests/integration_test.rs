use schemars::schema_for;
use supply_repair::input::RepairConfig;

#[test]
fn test_generate_json_schema() {
    let schema = schema_for!(RepairConfig);
    let json = serde_json::to_value(&schema).unwrap();
    assert!(json["properties"]["ground_source"].is_object());
}
