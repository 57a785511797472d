//! End-to-end dispatch tests: routing, method mapping and envelopes.

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use restbridge_model::RequestEvent;
    use serde_json::json;

    use crate::{create, memory_adapter, send};

    #[tokio::test]
    async fn test_should_run_crud_lifecycle() {
        let adapter = memory_adapter(&["users"]);

        let alice = create(&adapter, "/users", &json!({"name": "alice"})).await;
        assert_eq!(alice, json!({"id": 0, "name": "alice"}));

        let (envelope, body) = send(&adapter, RequestEvent::new("GET", "/users/0")).await;
        assert_eq!(envelope.status_code, 200);
        assert_eq!(body, json!({"data": {"id": 0, "name": "alice"}}));

        let (_, body) = send(
            &adapter,
            RequestEvent::new("PATCH", "/users/0").with_body(r#"{"age":30}"#),
        )
        .await;
        assert_eq!(body["data"], json!({"id": 0, "name": "alice", "age": 30}));

        let (_, body) = send(
            &adapter,
            RequestEvent::new("PUT", "/users/0").with_body(r#"{"name":"alicia"}"#),
        )
        .await;
        assert_eq!(body["data"], json!({"id": 0, "name": "alicia"}));

        let (envelope, _) = send(&adapter, RequestEvent::new("DELETE", "/users/0")).await;
        assert_eq!(envelope.status_code, 200);

        let (envelope, body) = send(&adapter, RequestEvent::new("GET", "/users/0")).await;
        assert_eq!(envelope.status_code, 404);
        assert_eq!(body, json!({"error": "No record found for id '0'"}));
    }

    #[tokio::test]
    async fn test_should_return_404_for_unknown_service() {
        let adapter = memory_adapter(&["users"]);
        for path in ["/unknown", "/unknown/7", "/users/7/extra"] {
            let (envelope, body) = send(&adapter, RequestEvent::new("GET", path)).await;
            assert_eq!(envelope.status_code, 404, "path {path}");
            assert_eq!(body, json!({"error": format!("Service not found: {path}")}));
        }
    }

    #[tokio::test]
    async fn test_should_return_404_for_unmapped_verbs() {
        let adapter = memory_adapter(&["users"]);
        for (verb, path) in [
            ("POST", "/users/1"),
            ("PUT", "/users"),
            ("PATCH", "/users"),
            ("HEAD", "/users"),
            ("get", "/users"),
        ] {
            let (envelope, body) = send(&adapter, RequestEvent::new(verb, path)).await;
            assert_eq!(envelope.status_code, 404, "{verb} {path}");
            assert_eq!(body, json!({"error": format!("Method not allowed: {verb}")}));
        }
    }

    #[tokio::test]
    async fn test_should_route_nested_service_paths() {
        let adapter = memory_adapter(&["api/messages", "api"]);
        create(&adapter, "/api/messages", &json!({"text": "hi"})).await;

        let (_, body) = send(&adapter, RequestEvent::new("GET", "/api/messages/0")).await;
        assert_eq!(body["data"]["text"], json!("hi"));

        // `/api/7` resolves to the `api` service with id 7.
        let (envelope, _) = send(&adapter, RequestEvent::new("GET", "/api/7")).await;
        assert_eq!(envelope.status_code, 404);
        let (_, body) = send(&adapter, RequestEvent::new("GET", "/api")).await;
        assert_eq!(body, json!({"data": []}));
    }

    #[tokio::test]
    async fn test_should_distinguish_quoted_and_numeric_ids() {
        let adapter = memory_adapter(&["docs"]);
        create(&adapter, "/docs", &json!({"id": "abc", "v": 1})).await;
        create(&adapter, "/docs", &json!({"id": "my doc", "v": 2})).await;

        let (_, body) = send(&adapter, RequestEvent::new("GET", "/docs/abc")).await;
        assert_eq!(body["data"]["v"], json!(1));
        let (_, body) = send(&adapter, RequestEvent::new("GET", "/docs/'abc'")).await;
        assert_eq!(body["data"]["v"], json!(1));
        let (_, body) = send(&adapter, RequestEvent::new("GET", "/docs/my doc")).await;
        assert_eq!(body["data"]["v"], json!(2));
    }

    #[tokio::test]
    async fn test_should_use_event_path_without_decoding() {
        let adapter = memory_adapter(&["docs"]);
        create(&adapter, "/docs", &json!({"id": "a%41", "v": 1})).await;

        let (envelope, body) = send(&adapter, RequestEvent::new("GET", "/docs/a%41")).await;
        assert_eq!(envelope.status_code, 200);
        assert_eq!(body["data"]["v"], json!(1));

        let (envelope, _) = send(&adapter, RequestEvent::new("GET", "/docs/aA")).await;
        assert_eq!(envelope.status_code, 404);
    }

    #[tokio::test]
    async fn test_should_bulk_create_and_bulk_remove() {
        let adapter = memory_adapter(&["users"]);
        let created = create(
            &adapter,
            "/users",
            &json!([{"role": "admin"}, {"role": "guest"}, {"role": "guest"}]),
        )
        .await;
        assert_eq!(created.as_array().map(Vec::len), Some(3));

        let (_, body) = send(
            &adapter,
            RequestEvent::new("DELETE", "/users").with_query("role", "guest"),
        )
        .await;
        assert_eq!(body["data"].as_array().map(Vec::len), Some(2));

        let (_, body) = send(&adapter, RequestEvent::new("GET", "/users")).await;
        assert_eq!(body, json!({"data": [{"id": 0, "role": "admin"}]}));
    }

    #[tokio::test]
    async fn test_should_decode_base64_bodies() {
        let adapter = memory_adapter(&["users"]);
        let mut event = RequestEvent::new("POST", "/users")
            .with_body(BASE64.encode(br#"{"name":"b64"}"#));
        event.is_base64_encoded = true;

        let (envelope, body) = send(&adapter, event).await;
        assert_eq!(envelope.status_code, 200);
        assert_eq!(body["data"]["name"], json!("b64"));
    }

    #[tokio::test]
    async fn test_should_reject_malformed_bodies() {
        let adapter = memory_adapter(&["users"]);
        let (envelope, body) = send(
            &adapter,
            RequestEvent::new("POST", "/users").with_body("not json"),
        )
        .await;
        assert_eq!(envelope.status_code, 400);
        assert!(
            body["error"]
                .as_str()
                .is_some_and(|m| m.starts_with("Malformed request body")),
        );

        let (envelope, _) = send(
            &adapter,
            RequestEvent::new("POST", "/users").with_body("\"just a string\""),
        )
        .await;
        assert_eq!(envelope.status_code, 400);
    }

    #[tokio::test]
    async fn test_should_accept_deserialized_proxy_events() {
        let adapter = memory_adapter(&["users"]);
        create(&adapter, "/users", &json!({"name": "z"})).await;

        let event: RequestEvent = serde_json::from_value(json!({
            "path": "/users/0",
            "httpMethod": "GET",
            "headers": {"accept": "application/json"},
            "queryStringParameters": null,
            "multiValueQueryStringParameters": null,
            "body": null,
            "isBase64Encoded": false,
        }))
        .unwrap();

        let (envelope, body) = send(&adapter, event).await;
        assert_eq!(envelope.status_code, 200);
        assert_eq!(body["data"]["name"], json!("z"));
    }
}
