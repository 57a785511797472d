//! Setup hook and variable tests against a live adapter.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use futures::future::join_all;
    use restbridge_http::{Adapter, Query, Service, ServiceResult};
    use restbridge_memory::MemoryService;
    use restbridge_model::{RequestEvent, ServiceError, ServiceMethod};
    use serde_json::{Value, json};

    use crate::{memory_registry, send};

    /// Seeds a memory service during setup, then counts finds.
    #[derive(Debug)]
    struct CountingService {
        inner: MemoryService,
        finds: AtomicUsize,
    }

    #[async_trait]
    impl Service for CountingService {
        fn supports(&self, method: ServiceMethod) -> bool {
            matches!(method, ServiceMethod::Find | ServiceMethod::Create)
        }

        async fn find(&self, query: Query) -> ServiceResult {
            self.finds.fetch_add(1, Ordering::SeqCst);
            self.inner.find(query).await
        }

        async fn create(&self, data: Value, query: Query) -> ServiceResult {
            self.inner.create(data, query).await
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_should_finish_setup_before_concurrent_first_requests() {
        let service = Arc::new(CountingService {
            inner: MemoryService::default(),
            finds: AtomicUsize::new(0),
        });
        let registry = memory_registry(&[]);
        registry.register("todos", Arc::clone(&service) as Arc<dyn Service>);

        let runs = Arc::new(AtomicUsize::new(0));
        let adapter = {
            let runs = Arc::clone(&runs);
            let service = Arc::clone(&service);
            Adapter::builder(registry)
                .setup(move |vars| async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    service
                        .inner
                        .insert(json!({"title": "seeded"}))
                        .map_err(anyhow::Error::from)?;
                    vars.set("seeded", true);
                    Ok(())
                })
                .build()
        };

        let requests = (0..20).map(|_| {
            let adapter = adapter.clone();
            tokio::spawn(async move {
                adapter.handle(&RequestEvent::new("GET", "/todos")).await
            })
        });
        for result in join_all(requests).await {
            let envelope = result.unwrap();
            assert_eq!(envelope.status_code, 200);
            assert_eq!(
                envelope.json_body().unwrap(),
                json!({"data": [{"id": 0, "title": "seeded"}]}),
            );
        }

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(service.finds.load(Ordering::SeqCst), 20);
        assert_eq!(adapter.get("seeded"), Some(json!(true)));
    }

    #[tokio::test]
    async fn test_should_fail_every_request_after_setup_error() {
        let adapter = Adapter::builder(memory_registry(&["users"]))
            .setup(|_vars| async { Err(anyhow::anyhow!("database unreachable")) })
            .build();

        assert!(adapter.ready().await.is_err());
        for event in [
            RequestEvent::new("GET", "/users"),
            RequestEvent::new("GET", "/unknown"),
        ] {
            let (envelope, body) = send(&adapter, event).await;
            assert_eq!(envelope.status_code, 500);
            assert_eq!(body, json!({"error": "Setup failed: database unreachable"}));
        }
    }

    #[tokio::test]
    async fn test_should_share_variables_between_setup_and_callers() {
        let adapter = Adapter::builder(memory_registry(&["users"]))
            .variable("region", "eu")
            .setup(|vars| async move {
                let region = vars.get_as::<String>("region")?.unwrap_or_default();
                vars.set("endpoint", format!("https://{region}.example.com"));
                Ok(())
            })
            .build();

        adapter.ready().await.unwrap();
        assert_eq!(
            adapter.get("endpoint"),
            Some(json!("https://eu.example.com")),
        );

        let handle = adapter.clone();
        handle.set("region", "us");
        assert_eq!(adapter.get("region"), Some(json!("us")));
    }

    #[tokio::test]
    async fn test_should_hand_out_reusable_handlers() {
        let adapter = Adapter::new(memory_registry(&["users"]));
        let handler = adapter.handler();

        let created = handler(RequestEvent::new("POST", "/users").with_body(r#"{"n":1}"#)).await;
        assert_eq!(created.status_code, 200);

        let again = handler.clone();
        let listed = again(RequestEvent::new("GET", "/users")).await;
        assert_eq!(listed.json_body().unwrap(), json!({"data": [{"id": 0, "n": 1}]}));
    }

    #[tokio::test]
    async fn test_should_pass_through_service_status_codes() {
        #[derive(Debug)]
        struct Conflict;

        #[async_trait]
        impl Service for Conflict {
            fn supports(&self, method: ServiceMethod) -> bool {
                method == ServiceMethod::Create
            }

            async fn create(&self, _data: Value, _query: Query) -> ServiceResult {
                Err(ServiceError::with_code(409, "already exists"))
            }
        }

        #[derive(Debug)]
        struct Weird;

        #[async_trait]
        impl Service for Weird {
            fn supports(&self, method: ServiceMethod) -> bool {
                method == ServiceMethod::Create
            }

            async fn create(&self, _data: Value, _query: Query) -> ServiceResult {
                Err(ServiceError::with_code(42, "odd code"))
            }
        }

        let registry = memory_registry(&[]);
        registry
            .register("conflict", Arc::new(Conflict))
            .register("weird", Arc::new(Weird));
        let adapter = Adapter::new(registry);

        let (envelope, body) = send(&adapter, RequestEvent::new("POST", "/conflict")).await;
        assert_eq!(envelope.status_code, 409);
        assert_eq!(body, json!({"error": "already exists"}));

        let (envelope, _) = send(&adapter, RequestEvent::new("POST", "/weird")).await;
        assert_eq!(envelope.status_code, 500);
    }
}
