use schemalift_core::SchemaModel;
use schemars::schema_for;

#[test]
fn json_schema_describes_top_level_fields() {
    let generated = schema_for!(SchemaModel);
    let json = serde_json::to_value(&generated).expect("serialize generated schema");

    let properties = json
        .get("properties")
        .and_then(|value| value.as_object())
        .expect("object properties");
    for field in ["schema_version", "dialect", "source", "tables", "sequences"] {
        assert!(properties.contains_key(field), "missing {field}");
    }

    let required: Vec<&str> = json["required"]
        .as_array()
        .expect("required list")
        .iter()
        .filter_map(|value| value.as_str())
        .collect();
    assert!(required.contains(&"tables"));
    assert!(!required.contains(&"sequences"));
}
