use schemars::schema_for;
use supply_repair::input::RepairConfig;

fn main() {
    let schema = schema_for!(RepairConfig);
    println!("{}", serde_json::to_string_pretty(&schema).unwrap());
}
