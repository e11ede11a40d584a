//! Integration tests for the extract path
//!
//! Sends flows in two batches and checks the emitted aggregates after each.
//! The second batch's output depends on state left by the first.

#[cfg(test)]
mod extract_aggregate_tests {
    use flowagg::config::parse_definitions;
    use flowagg::{BatchAggregator, GenericMap};
    use serde_json::{json, Value};

    const DEFINITIONS: &str = r#"[
        {"name": "bandwidth", "by": ["service"], "operation": "sum", "record_key": "bytes"},
        {"name": "bandwidth_count", "by": ["service"], "operation": "count", "record_key": ""}
    ]"#;

    fn flow(service: &str, bytes: f64) -> GenericMap {
        match json!({"service": service, "bytes": bytes}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn expected(name: &str, service: &str, value: &str, raw: Value, count: &str) -> GenericMap {
        let (record_key, operation) = if name == "bandwidth" {
            ("bytes", "sum")
        } else {
            ("", "count")
        };
        let mut map = GenericMap::new();
        map.insert("name".into(), json!(name));
        map.insert("record_key".into(), json!(record_key));
        map.insert("by".into(), json!("service"));
        map.insert("aggregate".into(), json!(service));
        map.insert("service".into(), json!(service));
        map.insert("operation".into(), json!(operation));
        map.insert("value".into(), json!(value));
        map.insert(format!("{}_value", name), json!(value));
        map.insert("recentRawValues".into(), raw);
        map.insert("count".into(), json!(count));
        map
    }

    /// Order-independent comparison of emitted records
    fn assert_elements_match(mut actual: Vec<GenericMap>, mut expected: Vec<GenericMap>) {
        let sort_key = |m: &GenericMap| format!("{}|{}", m["name"], m["aggregate"]);
        actual.sort_by_key(sort_key);
        expected.sort_by_key(sort_key);
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_two_batch_bandwidth_scenario() {
        let definitions = parse_definitions(DEFINITIONS).unwrap();
        let mut aggregator = BatchAggregator::new(definitions).unwrap();

        let batch1 = vec![
            flow("http", 10.0),
            flow("http", 20.0),
            flow("tcp", 1.0),
            flow("tcp", 2.0),
        ];
        assert_elements_match(
            aggregator.extract(&batch1),
            vec![
                expected("bandwidth", "http", "30.000000", json!([10.0, 20.0]), "2"),
                expected("bandwidth", "tcp", "3.000000", json!([1.0, 2.0]), "2"),
                expected("bandwidth_count", "http", "2.000000", json!([1.0, 1.0]), "2"),
                expected("bandwidth_count", "tcp", "2.000000", json!([1.0, 1.0]), "2"),
            ],
        );

        let batch2 = vec![flow("http", 30.0), flow("tcp", 4.0), flow("tcp", 5.0)];
        assert_elements_match(
            aggregator.extract(&batch2),
            vec![
                expected("bandwidth", "http", "60.000000", json!([30.0]), "3"),
                expected("bandwidth", "tcp", "12.000000", json!([4.0, 5.0]), "4"),
                expected("bandwidth_count", "http", "3.000000", json!([1.0]), "3"),
                expected("bandwidth_count", "tcp", "4.000000", json!([1.0, 1.0]), "4"),
            ],
        );
    }

    #[test]
    fn test_sum_matches_all_valid_inputs_across_batches() {
        let definitions = parse_definitions(DEFINITIONS).unwrap();
        let mut aggregator = BatchAggregator::new(definitions).unwrap();

        let mut total = 0.0;
        let mut last = Vec::new();
        for round in 0..10 {
            let batch: Vec<GenericMap> = (0..round + 1)
                .map(|i| flow("dns", (round * 10 + i) as f64))
                .collect();
            total += batch.iter().map(|r| r["bytes"].as_f64().unwrap()).sum::<f64>();
            last = aggregator.extract(&batch);
        }

        let bandwidth = last
            .iter()
            .find(|r| r["name"] == json!("bandwidth"))
            .unwrap();
        assert_eq!(bandwidth["value"], json!(format!("{:.6}", total)));
        assert_eq!(bandwidth["count"], json!("55"));
        assert_eq!(bandwidth["recentRawValues"].as_array().unwrap().len(), 10);
    }

    #[test]
    fn test_empty_batch_emits_nothing() {
        let definitions = parse_definitions(DEFINITIONS).unwrap();
        let mut aggregator = BatchAggregator::new(definitions).unwrap();

        aggregator.extract(&[flow("http", 10.0)]);
        assert!(aggregator.extract(&[]).is_empty());

        let out = aggregator.extract(&[flow("http", 5.0)]);
        let bandwidth = out.iter().find(|r| r["name"] == json!("bandwidth")).unwrap();
        assert_eq!(bandwidth["value"], json!("15.000000"));
        assert_eq!(bandwidth["count"], json!("2"));
        assert_eq!(bandwidth["recentRawValues"], json!([5.0]));
    }
}
