//! End-to-end GraphQL tests over HTTP with axum-test

mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use common::*;
use linkfeed::prelude::*;
use serde_json::{Value, json};

// =============================================================================
// Helpers
// =============================================================================

async fn create_test_server_with(config: AppConfig) -> (TestServer, Fixture) {
    let fx = fixture().await;

    let (_host, app) = ServerBuilder::new()
        .with_config(config)
        .with_shared_store(fx.store.clone())
        .build()
        .expect("Failed to build app");

    let server = TestServer::new(app).expect("Failed to create test server");
    (server, fx)
}

async fn create_test_server() -> (TestServer, Fixture) {
    create_test_server_with(test_config()).await
}

fn authorization(value: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        HeaderValue::from_str(value).expect("invalid header value"),
    )
}

async fn graphql(server: &TestServer, query: &str, variables: Value) -> Value {
    let response = server
        .post("/graphql")
        .json(&json!({ "query": query, "variables": variables }))
        .await;
    response.assert_status_ok();
    response.json()
}

async fn graphql_as(server: &TestServer, auth: &str, query: &str, variables: Value) -> Value {
    let (name, value) = authorization(auth);
    let response = server
        .post("/graphql")
        .add_header(name, value)
        .json(&json!({ "query": query, "variables": variables }))
        .await;
    response.assert_status_ok();
    response.json()
}

fn error_code(body: &Value) -> &str {
    body["errors"][0]["extensions"]["code"]
        .as_str()
        .unwrap_or_default()
}

fn link_ids(links: &Value) -> Vec<i64> {
    links
        .as_array()
        .expect("links should be an array")
        .iter()
        .map(|l| l["id"].as_i64().expect("id should be an integer"))
        .collect()
}

const POST_MUTATION: &str = r#"
    mutation Post($description: String!, $url: String!) {
        post(description: $description, url: $url) {
            id
            description
            url
            createdAt
            postedBy { id name }
            voters { id }
        }
    }
"#;

// =============================================================================
// Health and schema routes
// =============================================================================

mod route_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoints() {
        let (server, _) = create_test_server().await;

        for path in ["/health", "/healthz"] {
            let response = server.get(path).await;
            response.assert_status_ok();

            let body: Value = response.json();
            assert_eq!(body["status"], "ok");
            assert_eq!(body["service"], "linkfeed");
            assert_eq!(body["storage"], "in-memory");
        }
    }

    #[tokio::test]
    async fn test_schema_sdl() {
        let (server, _) = create_test_server().await;

        let response = server.get("/graphql/schema").await;
        response.assert_status_ok();

        let sdl = response.text();
        for needle in ["type Feed", "type Link", "type User", "enum Sort", "input LinkOrderByInput"] {
            assert!(sdl.contains(needle), "SDL is missing {}", needle);
        }
    }

    #[tokio::test]
    async fn test_playground_enabled() {
        let (server, _) = create_test_server().await;

        let response = server.get("/graphql").await;
        response.assert_status_ok();
        assert!(response.text().contains("GraphQL Playground"));
    }

    #[tokio::test]
    async fn test_playground_disabled() {
        let mut config = test_config();
        config.graphql.playground = false;
        let (server, _) = create_test_server_with(config).await;

        let response = server.get("/graphql").await;
        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    }
}

// =============================================================================
// feed over HTTP
// =============================================================================

mod feed_tests {
    use super::*;

    #[tokio::test]
    async fn test_feed_with_all_arguments() {
        let (server, _) = create_test_server().await;

        let body = graphql(
            &server,
            r#"
            query Feed($filter: String, $skip: Int, $take: Int, $orderBy: [LinkOrderByInput!]) {
                feed(filter: $filter, skip: $skip, take: $take, orderBy: $orderBy) {
                    id
                    count
                    links { id description url }
                }
            }
            "#,
            json!({
                "filter": "https://",
                "skip": 1,
                "take": 2,
                "orderBy": [{ "description": "asc" }]
            }),
        )
        .await;

        assert!(body.get("errors").is_none(), "unexpected errors: {}", body);
        let feed = &body["data"]["feed"];
        assert_eq!(feed["count"], 5);
        assert_eq!(link_ids(&feed["links"]), vec![5, 1]);
        assert!(feed["id"].as_str().unwrap().starts_with("main-feed:"));
    }

    #[tokio::test]
    async fn test_feed_multi_key_order_literal() {
        let (server, _) = create_test_server().await;

        let body = graphql(
            &server,
            "{ feed(orderBy: [{ createdAt: desc }]) { links { id } } }",
            json!({}),
        )
        .await;

        assert_eq!(link_ids(&body["data"]["feed"]["links"]), vec![5, 4, 3, 2, 1]);
    }

    #[tokio::test]
    async fn test_feed_negative_skip() {
        let (server, _) = create_test_server().await;

        let body = graphql(&server, "{ feed(skip: -1) { count } }", json!({})).await;

        assert_eq!(error_code(&body), "INVALID_ARGUMENT");
        assert_eq!(body["errors"][0]["extensions"]["argument"], "skip");
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_feed_order_entry_with_two_fields() {
        let (server, _) = create_test_server().await;

        let body = graphql(
            &server,
            "{ feed(orderBy: [{ description: asc, url: desc }]) { count } }",
            json!({}),
        )
        .await;

        assert_eq!(error_code(&body), "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_feed_unknown_order_field_is_invalid_argument() {
        let (server, _) = create_test_server().await;

        let body = graphql(
            &server,
            "{ feed(orderBy: [{ title: asc }]) { count } }",
            json!({}),
        )
        .await;

        assert_eq!(error_code(&body), "INVALID_ARGUMENT");
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_feed_unknown_sort_value_is_invalid_argument() {
        let (server, _) = create_test_server().await;

        let body = graphql(
            &server,
            "{ feed(orderBy: [{ description: ascending }]) { count } }",
            json!({}),
        )
        .await;

        assert_eq!(error_code(&body), "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_feed_unknown_order_field_in_variables_is_invalid_argument() {
        let (server, _) = create_test_server().await;

        let body = graphql(
            &server,
            "query ($order: [LinkOrderByInput!]) { feed(orderBy: $order) { count } }",
            json!({ "order": [{ "title": "asc" }] }),
        )
        .await;

        assert_eq!(error_code(&body), "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_syntax_error_has_parse_code() {
        let (server, _) = create_test_server().await;

        let body = graphql(&server, "{ feed(take: ) { count }", json!({})).await;

        assert_eq!(error_code(&body), "GRAPHQL_PARSE_FAILED");
    }

    #[tokio::test]
    async fn test_nested_relations() {
        let (server, fx) = create_test_server().await;
        fx.store.add_vote(fx.bob.id, 1).await.unwrap();

        let body = graphql(
            &server,
            r#"{
                feed(take: 1) {
                    links {
                        id
                        postedBy { name links { id } }
                        voters { name }
                    }
                }
            }"#,
            json!({}),
        )
        .await;

        let link = &body["data"]["feed"]["links"][0];
        assert_eq!(link["id"], 1);
        assert_eq!(link["postedBy"]["name"], "Alice");
        assert_eq!(link_ids(&link["postedBy"]["links"]), vec![1, 3, 5]);
        assert_eq!(link["voters"], json!([{ "name": "Bob" }]));
    }

    #[tokio::test]
    async fn test_query_depth_is_limited() {
        let mut config = test_config();
        config.graphql.max_depth = 3;
        let (server, _) = create_test_server_with(config).await;

        let body = graphql(
            &server,
            "{ feed { links { postedBy { links { id } } } } }",
            json!({}),
        )
        .await;

        assert!(body["errors"].as_array().is_some_and(|e| !e.is_empty()));
    }
}

// =============================================================================
// singleLink over HTTP
// =============================================================================

mod single_link_tests {
    use super::*;

    #[tokio::test]
    async fn test_single_link_found() {
        let (server, _) = create_test_server().await;

        let body = graphql(
            &server,
            "query One($id: Int!) { singleLink(id: $id) { id url postedBy { email } } }",
            json!({ "id": 2 }),
        )
        .await;

        let link = &body["data"]["singleLink"];
        assert_eq!(link["url"], "https://go.dev");
        assert_eq!(link["postedBy"]["email"], "bob@example.com");
    }

    #[tokio::test]
    async fn test_single_link_missing_is_null() {
        let (server, _) = create_test_server().await;

        let body = graphql(&server, "{ singleLink(id: 404) { id } }", json!({})).await;

        assert!(body.get("errors").is_none());
        assert!(body["data"]["singleLink"].is_null());
    }
}

// =============================================================================
// post over HTTP
// =============================================================================

mod post_tests {
    use super::*;

    fn variables() -> Value {
        json!({ "description": "Axum", "url": "https://github.com/tokio-rs/axum" })
    }

    #[tokio::test]
    async fn test_post_without_authorization() {
        let (server, fx) = create_test_server().await;

        let body = graphql(&server, POST_MUTATION, variables()).await;

        assert_eq!(error_code(&body), "UNAUTHENTICATED");
        assert_eq!(fx.store.count_links(None).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_post_with_bearer_token() {
        let (server, fx) = create_test_server().await;
        let auth = format!("Bearer {}", token(fx.alice.id));

        let body = graphql_as(&server, &auth, POST_MUTATION, variables()).await;

        assert!(body.get("errors").is_none(), "unexpected errors: {}", body);
        let link = &body["data"]["post"];
        assert_eq!(link["id"], 6);
        assert_eq!(link["postedBy"]["name"], "Alice");
        assert_eq!(link["voters"], json!([]));
        assert!(link["createdAt"].as_str().is_some());

        let feed = graphql(&server, "{ feed { count } }", json!({})).await;
        assert_eq!(feed["data"]["feed"]["count"], 6);
    }

    #[tokio::test]
    async fn test_post_with_bare_token() {
        let (server, fx) = create_test_server().await;

        let body = graphql_as(&server, &token(fx.bob.id), POST_MUTATION, variables()).await;

        assert_eq!(body["data"]["post"]["postedBy"]["name"], "Bob");
    }

    #[tokio::test]
    async fn test_post_with_token_signed_by_other_secret() {
        let (server, fx) = create_test_server().await;
        let forged = sign(&json!({ "userId": fx.alice.id }), "not-the-secret");

        let body = graphql_as(&server, &format!("Bearer {}", forged), POST_MUTATION, variables()).await;

        assert_eq!(error_code(&body), "UNAUTHENTICATED");
        assert_eq!(fx.store.count_links(None).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_post_with_token_missing_user_id() {
        let (server, _) = create_test_server().await;
        let token = sign(&json!({ "sub": "alice" }), SECRET);

        let body = graphql_as(&server, &format!("Bearer {}", token), POST_MUTATION, variables()).await;

        assert_eq!(error_code(&body), "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn test_post_for_unknown_user() {
        let (server, fx) = create_test_server().await;

        let body = graphql_as(&server, &token(42), POST_MUTATION, variables()).await;

        assert_eq!(error_code(&body), "UNAUTHENTICATED");
        assert!(
            body["errors"][0]["message"]
                .as_str()
                .unwrap()
                .contains("no longer exists")
        );
        assert_eq!(fx.store.count_links(None).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_garbage_authorization_does_not_break_queries() {
        let (server, _) = create_test_server().await;

        let body = graphql_as(&server, "Bearer garbage", "{ feed { count } }", json!({})).await;

        assert_eq!(body["data"]["feed"]["count"], 5);
    }
}
