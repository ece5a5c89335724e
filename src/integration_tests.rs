#[cfg(test)]
mod integration_tests {
    use crate::api::create_router;
    use crate::engine::elastic::ElasticEngine;
    use crate::search::{SearchLimits, SearchService};
    use crate::storage::{models::Node, sqlite::SqliteNodeStore};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use mockito::{Matcher, Mock, Server, ServerGuard};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    /// Router backed by a mock search engine and a file-based node store
    async fn create_test_app(server: &ServerGuard, max_depth: u64) -> (Router, TempDir) {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nodes.db");
        let nodes = SqliteNodeStore::new(&format!("sqlite:{}", db_path.display()))
            .await
            .unwrap();
        nodes
            .upsert_node(&Node::new(300, "python").with_titles(Some("Python".to_string()), None))
            .await
            .unwrap();

        let engine = ElasticEngine::new(&server.url(), "topic", Duration::from_secs(5)).unwrap();
        let service = SearchService::new(
            Arc::new(engine),
            Arc::new(nodes),
            SearchLimits::default().with_max_depth(max_depth),
        );

        (create_router(service, true), temp_dir)
    }

    async fn mock_analyze(server: &mut ServerGuard, tokens: usize) -> Mock {
        let tokens: Vec<Value> = (0..tokens)
            .map(|i| json!({ "token": format!("t{}", i), "position": i }))
            .collect();
        server
            .mock("POST", "/topic/_analyze")
            .match_body(Matcher::PartialJson(json!({ "analyzer": "ik_smart" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "tokens": tokens }).to_string())
            .create_async()
            .await
    }

    fn search_response(total: u64) -> String {
        json!({
            "took": 4,
            "timed_out": false,
            "hits": {
                "total": total,
                "hits": [{
                    "_index": "topic",
                    "_type": "topic",
                    "_id": "1001",
                    "_score": 61.2,
                    "_source": {
                        "title": "Python 异步框架",
                        "content": "asyncio",
                        "created": "2018-05-01T10:00:00",
                        "id": 1001,
                        "node": 300,
                        "replies": 12,
                        "member": "someone"
                    },
                    "highlight": { "title": ["<em>Python</em> 异步框架"] }
                }]
            }
        })
        .to_string()
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_ping() {
        let server = Server::new_async().await;
        let (app, _dir) = create_test_app(&server, 1000).await;

        let response = app
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"pong");
    }

    /// Full flow: analyze, node resolution, compiled filter, normalized result
    #[tokio::test]
    async fn test_search_flow() {
        let mut server = Server::new_async().await;
        let analyze = mock_analyze(&mut server, 2).await;
        let search = server
            .mock("POST", "/topic/_search")
            .match_body(Matcher::PartialJson(json!({
                "from": 0,
                "size": 20,
                "query": {
                    "function_score": {
                        "query": {
                            "bool": {
                                "must": [{ "term": { "node": 300 } }],
                                "minimum_should_match": 1
                            }
                        }
                    }
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(search_response(1))
            .expect(1)
            .create_async()
            .await;

        let (app, _dir) = create_test_app(&server, 1000).await;
        let (status, body) = get(app, "/api/search?q=python%20async&size=20&node=Python").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["took"], 4);
        assert_eq!(body["timed_out"], false);
        assert_eq!(body["total"], 1);
        assert_eq!(body["hits"][0]["id"], 1001);
        assert_eq!(body["hits"][0]["node"], 300);
        assert_eq!(body["hits"][0]["replies"], 12);
        assert_eq!(body["hits"][0]["highlight"]["title"][0], "<em>Python</em> 异步框架");
        assert!(body["hits"][0].get("_source").is_none());

        analyze.assert_async().await;
        search.assert_async().await;
    }

    #[tokio::test]
    async fn test_parameter_aliases_and_chronological_sort() {
        let mut server = Server::new_async().await;
        mock_analyze(&mut server, 1).await;
        let search = server
            .mock("POST", "/topic/_search")
            .match_body(Matcher::PartialJson(json!({
                "from": 10,
                "size": 5,
                "sort": [{ "created": { "order": "asc" } }]
            })))
            .with_status(200)
            .with_body(search_response(40))
            .expect(1)
            .create_async()
            .await;

        let (app, _dir) = create_test_app(&server, 1000).await;
        let (status, _) = get(
            app,
            "/api/search?keyword=rust&offset=10&limit=5&sort=created&order=1&operator=bogus",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        search.assert_async().await;
    }

    /// Admission failures never touch the engine
    #[tokio::test]
    async fn test_rejections_skip_engine() {
        let cases = [
            ("/api/search", "Missing search keyword"),
            ("/api/search?q=", "Missing search keyword"),
            ("/api/search?q=rust&from=abc", "Wrong parameters"),
            ("/api/search?q=rust&from=-1", "Wrong parameters"),
            ("/api/search?q=rust&from=195&size=10", "Too deep paging parameters"),
            ("/api/search?q=rust&size=51", "Too large size"),
        ];

        for (uri, message) in cases {
            let mut server = Server::new_async().await;
            let analyze = server
                .mock("POST", "/topic/_analyze")
                .expect(0)
                .create_async()
                .await;
            let search = server
                .mock("POST", "/topic/_search")
                .expect(0)
                .create_async()
                .await;

            let (app, _dir) = create_test_app(&server, 200).await;
            let (status, body) = get(app, uri).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["message"], message, "{}", uri);
            analyze.assert_async().await;
            search.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_too_many_clauses() {
        let mut server = Server::new_async().await;
        mock_analyze(&mut server, 31).await;
        let search = server
            .mock("POST", "/topic/_search")
            .expect(0)
            .create_async()
            .await;

        let (app, _dir) = create_test_app(&server, 1000).await;
        let (status, body) = get(app, "/api/search?q=short").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Too long keyword");
        search.assert_async().await;
    }

    #[tokio::test]
    async fn test_engine_error_is_service_unavailable() {
        let mut server = Server::new_async().await;
        mock_analyze(&mut server, 1).await;
        server
            .mock("POST", "/topic/_search")
            .with_status(500)
            .with_body(
                json!({
                    "error": { "type": "search_phase_execution_exception", "reason": "all shards failed" },
                    "status": 500
                })
                .to_string(),
            )
            .create_async()
            .await;

        let (app, _dir) = create_test_app(&server, 1000).await;
        let (status, body) = get(app, "/api/search?q=rust").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["message"], "Search engine error");
        assert_eq!(body["detail"]["reason"], "all shards failed");
    }

    #[tokio::test]
    async fn test_malformed_engine_response_is_generic_failure() {
        let mut server = Server::new_async().await;
        mock_analyze(&mut server, 1).await;
        server
            .mock("POST", "/topic/_search")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let (app, _dir) = create_test_app(&server, 1000).await;
        let (status, body) = get(app, "/api/search?q=rust").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({ "message": "Something went wrong" }));
    }

    #[tokio::test]
    async fn test_page_view() {
        let mut server = Server::new_async().await;
        mock_analyze(&mut server, 1).await;
        let search = server
            .mock("POST", "/topic/_search")
            .match_body(Matcher::PartialJson(json!({ "from": 140, "size": 10 })))
            .with_status(200)
            .with_body(search_response(5000))
            .expect(1)
            .create_async()
            .await;

        let (app, _dir) = create_test_app(&server, 200).await;
        let (status, body) = get(app, "/?q=python&page=15").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["total"], 5000);
        assert_eq!(body["pages"], json!([12, 13, 14, 15, 16, 17, 18]));
        assert_eq!(body["current"], 15);
        assert_eq!(body["has_previous"], true);
        assert_eq!(body["has_next"], true);
        search.assert_async().await;
    }

    #[tokio::test]
    async fn test_page_view_landing_and_bad_page() {
        let server = Server::new_async().await;
        let (app, _dir) = create_test_app(&server, 200).await;

        let (status, body) = get(app.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["result"].is_null());
        assert_eq!(body["pages"], json!([]));

        let (status, body) = get(app.clone(), "/?q=rust&page=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Wrong parameters");

        let (status, _) = get(app, "/?q=rust&page=two").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_engine_timeout_is_service_unavailable() {
        let url = crate::engine::elastic::tests::silent_listener().await;
        let nodes = SqliteNodeStore::new("sqlite::memory:").await.unwrap();
        let engine = ElasticEngine::new(&url, "topic", Duration::from_millis(100)).unwrap();
        let service = SearchService::new(Arc::new(engine), Arc::new(nodes), SearchLimits::default());
        let app = create_router(service, true);

        let (status, body) = get(app, "/api/search?q=rust").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({ "message": "Read search result timeout" }));
    }
}
