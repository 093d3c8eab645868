use schemalift_core::SchemaModel;
use schemars::schema_for;

fn main() {
    let schema = schema_for!(SchemaModel);
    let json = serde_json::to_string_pretty(&schema).expect("serialize json schema");
    println!("{json}");
}
