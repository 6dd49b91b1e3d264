use dhis2eo::integrations::dhis2::records_to_dhis2_json;
use dhis2eo::Record;

fn record(org: &str, period: &str, value: serde_json::Value) -> Record {
    let mut r = Record::new();
    r.set("org_id", org);
    r.set("period", period);
    r.set("temperature", value);
    r
}

#[test]
fn builds_data_value_set_payload() {
    let records = vec![
        record("OU1", "2024-01", serde_json::json!(27.5)),
        record("OU2", "2024-01", serde_json::json!(25.0)),
    ];
    let payload =
        records_to_dhis2_json(&records, "de123", "org_id", "period", "temperature").unwrap();

    assert_eq!(payload.data_values.len(), 2);
    let dv = &payload.data_values[0];
    assert_eq!(dv.data_element, "de123");
    assert_eq!(dv.org_unit, "OU1");
    assert_eq!(dv.period, "202401");
    assert_eq!(dv.value, "27.5");
    // Integral floats lose the trailing .0
    assert_eq!(payload.data_values[1].value, "25");
}

#[test]
fn serializes_with_dhis2_field_names() {
    let records = vec![record("OU1", "2024", serde_json::json!(1.0))];
    let payload =
        records_to_dhis2_json(&records, "de123", "org_id", "period", "temperature").unwrap();
    let json = serde_json::to_value(&payload).unwrap();

    let values = json.get("dataValues").unwrap().as_array().unwrap();
    let first = &values[0];
    assert!(first.get("dataElement").is_some());
    assert!(first.get("orgUnit").is_some());
    assert!(first.get("period").is_some());
    assert!(first.get("value").is_some());
}

#[test]
fn null_and_missing_values_are_dropped() {
    let mut no_value = Record::new();
    no_value.set("org_id", "OU3");
    no_value.set("period", "2024-01");

    let records = vec![
        record("OU1", "2024-01", serde_json::Value::Null),
        no_value,
        record("OU2", "2024-01", serde_json::json!(21.0)),
    ];
    let payload =
        records_to_dhis2_json(&records, "de123", "org_id", "period", "temperature").unwrap();

    assert_eq!(payload.data_values.len(), 1);
    assert_eq!(payload.data_values[0].org_unit, "OU2");
}

#[test]
fn daily_periods_from_datetime_columns() {
    let records = vec![record("OU1", "2024-01-15 00:00:00", serde_json::json!(3))];
    let payload =
        records_to_dhis2_json(&records, "de123", "org_id", "period", "temperature").unwrap();
    assert_eq!(payload.data_values[0].period, "20240115");
}

#[test]
fn small_values_avoid_scientific_notation() {
    let records = vec![record("OU1", "2024-01", serde_json::json!(8.24148e-05))];
    let payload =
        records_to_dhis2_json(&records, "de123", "org_id", "period", "temperature").unwrap();
    assert_eq!(payload.data_values[0].value, "0.0000824148");
}

#[test]
fn unsupported_period_formats_are_errors() {
    let records = vec![record("OU1", "2024-W03", serde_json::json!(1))];
    assert!(records_to_dhis2_json(&records, "de123", "org_id", "period", "temperature").is_err());
}
