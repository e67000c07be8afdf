//! Wire-level checks of what the reqwest transport actually sends.

use readinglist_core::{
    Auth, ClientConfig, Headers, HttpMethod, Query, ReadingListClient, RequestOptions,
    ReqwestTransport, ResponseBehavior, Transport,
};
use serde_json::{json, Value};
use wiremock::matchers::{
    basic_auth, bearer_token, body_json, body_string, header, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, auth: Auth) -> ReadingListClient {
    ReadingListClient::new(ClientConfig::new(&format!("{}/v1", server.uri())).auth(auth))
}

#[tokio::test]
async fn list_sends_basic_auth_query_and_accept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/articles"))
        .and(query_param("_limit", "3"))
        .and(basic_auth("alice", "secret"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let filters = Query::from([("_limit".to_string(), "3".to_string())]);
    let body = client(&server, Auth::basic("alice", "secret"))
        .list_articles(Some(filters))
        .await
        .unwrap();
    assert_eq!(body, json!({"items": []}));
}

#[tokio::test]
async fn create_sends_json_body_with_bearer_token() {
    let server = MockServer::start().await;
    let article = json!({"url": "http://localhost/1", "title": "Page", "added_by": "alice"});
    Mock::given(method("POST"))
        .and(path("/v1/articles"))
        .and(bearer_token("t0k"))
        .and(header("content-type", "application/json"))
        .and(body_json(&article))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "a1"})))
        .expect(1)
        .mount(&server)
        .await;

    let body = client(&server, Auth::bearer("t0k"))
        .create_article(&article)
        .await
        .unwrap();
    assert_eq!(body["id"], "a1");
}

#[tokio::test]
async fn update_caller_header_overrides_default_on_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/v1/articles/a1"))
        .and(header("response-behavior", "diff"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"favorite": true})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new(&format!("{}/v1", server.uri()))
        .default_header("Response-Behavior", "full");
    let body = ReadingListClient::new(config)
        .update_article("a1", &json!({"favorite": true}), Some(ResponseBehavior::Diff.headers()))
        .await
        .unwrap();
    assert_eq!(body, json!({"favorite": true}));

    let received = server.received_requests().await.unwrap();
    let values: Vec<_> = received[0].headers.get_all("response-behavior").iter().collect();
    assert_eq!(values.len(), 1);
}

#[tokio::test]
async fn server_errors_and_plain_text_resolve() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/__heartbeat__"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/articles"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client(&server, Auth::basic("alice", ""));
    assert_eq!(client.heartbeat().await.unwrap(), json!("Service Unavailable"));
    assert_eq!(client.delete_all_articles().await.unwrap(), Value::Null);
}

#[tokio::test]
async fn each_call_issues_exactly_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"code": 500})))
        .expect(1)
        .mount(&server)
        .await;

    let body = client(&server, Auth::bearer("x"))
        .describe_service()
        .await
        .unwrap();
    assert_eq!(body["code"], 500);
}

#[tokio::test]
async fn raw_mode_sends_and_returns_text_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notes"))
        .and(body_string("plain note"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"stays":"text"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let options = RequestOptions {
        method: HttpMethod::Post,
        uri: format!("{}/notes", server.uri()),
        json: false,
        auth: None,
        query: None,
        body: Some(json!("plain note")),
        headers: Headers::new(),
    };
    let response = ReqwestTransport::new().send(&options).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!(r#"{"stays":"text"}"#));

    let received = server.received_requests().await.unwrap();
    let accept = received[0].headers.get("accept").map(|v| v.to_str().unwrap().to_string());
    assert_ne!(accept.as_deref(), Some("application/json"));
    assert!(received[0].headers.get("content-type").is_none());
}
