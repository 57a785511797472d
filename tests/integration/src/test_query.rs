//! Query normalization as seen by a service.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use restbridge_model::RequestEvent;
    use serde_json::{Value, json};

    use crate::{create, memory_adapter, send};

    async fn seeded() -> restbridge_http::Adapter {
        let adapter = memory_adapter(&["people"]);
        create(
            &adapter,
            "/people",
            &json!([
                {"name": "ann", "age": 31, "active": true},
                {"name": "ben", "age": 17, "active": false},
                {"name": "cat", "age": 45, "active": true},
                {"name": "dan", "age": 22, "active": true},
            ]),
        )
        .await;
        adapter
    }

    fn names(body: &Value) -> Vec<String> {
        body["data"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|r| r["name"].as_str().map(str::to_owned))
            .collect()
    }

    #[tokio::test]
    async fn test_should_filter_with_coerced_scalars() {
        let adapter = seeded().await;
        let event = RequestEvent::new("GET", "/people")
            .with_query("active", "false")
            .with_query("age", "17");
        let (_, body) = send(&adapter, event).await;
        assert_eq!(names(&body), vec!["ben"]);
    }

    #[tokio::test]
    async fn test_should_apply_bracket_operators_and_paging() {
        let adapter = seeded().await;
        let event = RequestEvent::new("GET", "/people")
            .with_query("age[$gte]", "18")
            .with_query("$sort[age]", "-1")
            .with_query("$limit", "2");
        let (envelope, body) = send(&adapter, event).await;
        assert_eq!(envelope.status_code, 200);
        assert_eq!(names(&body), vec!["cat", "ann"]);
    }

    #[tokio::test]
    async fn test_should_treat_repeated_values_as_in_list() {
        let adapter = seeded().await;
        let mut multi = BTreeMap::new();
        multi.insert("name".to_owned(), vec!["ann".to_owned(), "dan".to_owned()]);
        multi.insert(
            "$select[]".to_owned(),
            vec!["name".to_owned(), "active".to_owned()],
        );
        let event = RequestEvent {
            multi_value_query_string_parameters: Some(multi),
            ..RequestEvent::new("GET", "/people")
        };

        let (_, body) = send(&adapter, event).await;
        assert_eq!(
            body["data"],
            json!([
                {"id": 0, "name": "ann", "active": true},
                {"id": 3, "name": "dan", "active": true},
            ]),
        );
    }

    #[tokio::test]
    async fn test_should_fall_back_to_single_value_parameters() {
        let adapter = seeded().await;
        let mut single = BTreeMap::new();
        single.insert("name".to_owned(), "cat".to_owned());
        let event = RequestEvent {
            query_string_parameters: Some(single),
            ..RequestEvent::new("GET", "/people")
        };

        let (_, body) = send(&adapter, event).await;
        assert_eq!(names(&body), vec!["cat"]);
    }

    #[tokio::test]
    async fn test_should_ignore_undefined_values() {
        let adapter = seeded().await;
        let event = RequestEvent::new("GET", "/people").with_query("name", "undefined");
        let (_, body) = send(&adapter, event).await;
        assert_eq!(names(&body).len(), 4);
    }

    #[tokio::test]
    async fn test_should_reject_malformed_query_keys() {
        let adapter = seeded().await;
        let event = RequestEvent::new("GET", "/people").with_query("age[$gt", "1");
        let (envelope, body) = send(&adapter, event).await;
        assert_eq!(envelope.status_code, 400);
        assert_eq!(body, json!({"error": "Malformed query parameter: age[$gt"}));
    }

    #[tokio::test]
    async fn test_should_surface_service_query_errors() {
        let adapter = seeded().await;
        let event = RequestEvent::new("GET", "/people").with_query("$limit", "-5");
        let (envelope, body) = send(&adapter, event).await;
        assert_eq!(envelope.status_code, 400);
        assert_eq!(
            body,
            json!({"error": "Invalid query parameter '$limit': expected a non-negative integer"}),
        );
    }
}
