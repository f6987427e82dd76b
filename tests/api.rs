use std::{net::SocketAddr, sync::Arc, time::Duration};

use pdnsapi::{AppState, api, config::AppConfig, powerdns::client::PowerDnsClient};
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ZONE_PATH: &str = "/api/v1/servers/localhost/zones/example.com.";

struct TestApp {
    addr: SocketAddr,
    http: reqwest::Client,
    upstream: MockServer,
}

/// Serve the router on a loopback port against the given upstream base URL.
async fn serve(pdns_url: String, auth_token: &str) -> SocketAddr {
    let config = AppConfig {
        pdns_url,
        pdns_server_id: "localhost".into(),
        pdns_timeout: Duration::from_secs(5),
        auth_token: auth_token.into(),
        listen: "127.0.0.1:0".parse().unwrap(),
    };
    let pdns = PowerDnsClient::new(
        &config.pdns_url,
        "test-key",
        &config.pdns_server_id,
        config.pdns_timeout,
    )
    .unwrap();
    let state = Arc::new(AppState { config, pdns });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, api::create_router(state).into_make_service())
            .await
            .unwrap();
    });
    addr
}

impl TestApp {
    async fn spawn(auth_token: &str) -> Self {
        let upstream = MockServer::start().await;
        let addr = serve(format!("{}/api/v1", upstream.uri()), auth_token).await;
        Self {
            addr,
            http: reqwest::Client::new(),
            upstream,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

#[tokio::test]
async fn health_is_never_gated() {
    let app = TestApp::spawn("s3cret").await;
    let res = app.http.get(app.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn wrong_bearer_token_never_reaches_upstream() {
    let app = TestApp::spawn("s3cret").await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&app.upstream)
        .await;

    let res = app
        .http
        .get(app.url("/zones"))
        .bearer_auth("wrongvalue")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.http.get(app.url("/zones")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Rejected before the body is even looked at.
    let res = app
        .http
        .post(app.url("/example.com/create"))
        .header("Authorization", "Bearer wrongvalue")
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn matching_bearer_token_proceeds() {
    let app = TestApp::spawn("s3cret").await;
    Mock::given(method("GET"))
        .and(path("/api/v1/servers/localhost/zones"))
        .and(header("X-API-Key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let res = app
        .http
        .get(app.url("/zones"))
        .bearer_auth("s3cret")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn list_zones_keeps_every_upstream_field() {
    let app = TestApp::spawn("").await;
    Mock::given(method("GET"))
        .and(path("/api/v1/servers/localhost/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "example.com.", "name": "example.com.", "kind": "Native", "serial": 1, "dnssec": false}
        ])))
        .mount(&app.upstream)
        .await;

    let body: Value = app
        .http
        .get(app.url("/zones"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        body,
        json!([
            {"id": "example.com.", "name": "example.com.", "kind": "Native", "serial": 1, "dnssec": false}
        ])
    );
}

#[tokio::test]
async fn create_zone_defaults_kind() {
    let app = TestApp::spawn("").await;
    Mock::given(method("POST"))
        .and(path("/api/v1/servers/localhost/zones"))
        .and(body_json(json!({
            "name": "example.com.",
            "kind": "Native",
            "nameservers": ["ns1.example.net."]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "example.com.", "name": "example.com.", "kind": "Native", "rrsets": []
        })))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let res = app
        .http
        .post(app.url("/zones"))
        .json(&json!({"name": "example.com", "nameservers": ["ns1.example.net."]}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["name"], "example.com.");
}

#[tokio::test]
async fn create_zone_without_name_is_bad_request() {
    let app = TestApp::spawn("").await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.upstream)
        .await;

    let res = app
        .http
        .post(app.url("/zones"))
        .json(&json!({"kind": "Master"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("name is required"));
}

#[tokio::test]
async fn update_zone_sends_partial_patch() {
    let app = TestApp::spawn("").await;
    Mock::given(method("PATCH"))
        .and(path(ZONE_PATH))
        .and(body_json(json!({"account": "ops"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let res = app
        .http
        .patch(app.url("/zones/example.com"))
        .json(&json!({"account": "ops"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn delete_zone_is_forwarded() {
    let app = TestApp::spawn("").await;
    Mock::given(method("DELETE"))
        .and(path(ZONE_PATH))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let res = app
        .http
        .delete(app.url("/zones/example.com."))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn zone_records_are_returned() {
    let app = TestApp::spawn("").await;
    let zone = json!({
        "id": "example.com.",
        "name": "example.com.",
        "kind": "Native",
        "serial": 2024010101,
        "dnssec": true,
        "rrsets": [{
            "name": "www.example.com.", "type": "A", "ttl": 300,
            "records": [{"content": "192.0.2.1", "disabled": false}], "comments": []
        }]
    });
    Mock::given(method("GET"))
        .and(path(ZONE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(&zone))
        .mount(&app.upstream)
        .await;

    for route in ["/zones/example.com/records/", "/zones/example.com/records"] {
        let body: Value = app
            .http
            .get(app.url(route))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, zone);
    }
}

#[tokio::test]
async fn encoded_zone_name_stays_inside_zones_collection() {
    let app = TestApp::spawn("").await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&app.upstream)
        .await;

    let res = app
        .http
        .get(app.url("/zones/..%2Fconfig%3F/records/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let received = app.upstream.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let url = &received[0].url;
    assert_eq!(url.path(), "/api/v1/servers/localhost/zones/..%2Fconfig%3F.");
    assert_eq!(url.query(), None);
}

#[tokio::test]
async fn blank_zone_name_is_rejected() {
    let app = TestApp::spawn("").await;

    for (req, route) in [
        (app.http.get(app.url("/zones/%20/records/")), "records"),
        (app.http.delete(app.url("/zones/%20")), "zone"),
        (
            app.http
                .post(app.url("/%20/create"))
                .json(&json!({"name": "x", "type": "A", "value": "1.2.3.4"})),
            "simple",
        ),
    ] {
        let res = req.send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{route}");
    }
    assert!(app.upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn rrset_create_patches_one_replace() {
    let app = TestApp::spawn("").await;
    Mock::given(method("PATCH"))
        .and(path(ZONE_PATH))
        .and(body_json(json!({"rrsets": [{
            "name": "www.",
            "type": "A",
            "changetype": "REPLACE",
            "records": [{"content": "1.2.3.4", "disabled": false}]
        }]})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let res = app
        .http
        .post(app.url("/zones/example.com/records/"))
        .json(&json!({"name": "www", "type": "a", "contents": ["1.2.3.4"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn rrset_create_with_empty_contents_is_rejected() {
    let app = TestApp::spawn("").await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&app.upstream)
        .await;

    let res = app
        .http
        .post(app.url("/zones/example.com/records/"))
        .json(&json!({"name": "www", "type": "A", "contents": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rrset_update_uses_record_id() {
    let app = TestApp::spawn("").await;
    Mock::given(method("PATCH"))
        .and(path(ZONE_PATH))
        .and(body_json(json!({"rrsets": [{
            "name": "www.example.com.",
            "type": "AAAA",
            "ttl": 120,
            "changetype": "REPLACE",
            "records": [{"content": "2001:db8::1", "disabled": true}]
        }]})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let res = app
        .http
        .patch(app.url("/zones/example.com/records/www.example.com:aaaa"))
        .json(&json!({"ttl": 120, "contents": ["2001:db8::1"], "disabled": true}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn rrset_delete_by_record_id() {
    let app = TestApp::spawn("").await;
    Mock::given(method("PATCH"))
        .and(path(ZONE_PATH))
        .and(body_json(json!({"rrsets": [{
            "name": "api.", "type": "CNAME", "changetype": "DELETE"
        }]})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let res = app
        .http
        .delete(app.url("/zones/example.com/records/api:cname"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn malformed_record_id_is_rejected() {
    let app = TestApp::spawn("").await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&app.upstream)
        .await;

    for id in ["www", ":A", "www:"] {
        let res = app
            .http
            .delete(app.url(&format!("/zones/example.com/records/{id}")))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "id {id:?}");
    }
}

#[tokio::test]
async fn upstream_rejection_is_forwarded_verbatim() {
    let app = TestApp::spawn("").await;
    Mock::given(method("PATCH"))
        .and(path(ZONE_PATH))
        .respond_with(
            ResponseTemplate::new(422)
                .insert_header("content-type", "application/json")
                .set_body_string(r#"{"error":"conflict"}"#),
        )
        .mount(&app.upstream)
        .await;

    let res = app
        .http
        .post(app.url("/example.com/create"))
        .json(&json!({"name": "x", "type": ["A"], "value": "9.9.9.9"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.text().await.unwrap(), r#"{"error":"conflict"}"#);

    let res = app
        .http
        .post(app.url("/zones/example.com/records/"))
        .json(&json!({"name": "www", "type": "A", "contents": ["1.2.3.4"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.text().await.unwrap(), r#"{"error":"conflict"}"#);
}

#[tokio::test]
async fn simple_create_fans_out_in_one_call() {
    let app = TestApp::spawn("").await;
    let record = json!([{"content": "9.9.9.9", "disabled": false}]);
    Mock::given(method("PATCH"))
        .and(path(ZONE_PATH))
        .and(body_json(json!({"rrsets": [
            {"name": "x.", "type": "A", "ttl": 300, "changetype": "REPLACE", "records": record},
            {"name": "x.", "type": "AAAA", "ttl": 300, "changetype": "REPLACE", "records": record}
        ]})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let res = app
        .http
        .post(app.url("/example.com/create"))
        .json(&json!({"name": "x", "type": ["A", "AAAA"], "value": "9.9.9.9", "ttl": 300}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({"status": "ok", "zone": "example.com.", "name": "x.", "types": ["A", "AAAA"]})
    );
}

#[tokio::test]
async fn simple_delete_fans_out_deletes() {
    let app = TestApp::spawn("").await;
    Mock::given(method("PATCH"))
        .and(path(ZONE_PATH))
        .and(body_json(json!({"rrsets": [
            {"name": "x.", "type": "A", "changetype": "DELETE"},
            {"name": "x.", "type": "TXT", "changetype": "DELETE"}
        ]})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let res = app
        .http
        .post(app.url("/example.com./delete"))
        .json(&json!({"name": "x", "type": ["a", "txt"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["types"], json!(["A", "TXT"]));
}

#[tokio::test]
async fn simple_endpoints_work_for_zone_named_zones() {
    let app = TestApp::spawn("").await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/servers/localhost/zones/zones."))
        .and(body_json(json!({"rrsets": [
            {"name": "x.", "type": "TXT", "changetype": "DELETE"}
        ]})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let res = app
        .http
        .post(app.url("/zones/delete"))
        .json(&json!({"name": "x", "type": "txt"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({"status": "ok", "zone": "zones.", "name": "x.", "types": ["TXT"]})
    );

    let res = app
        .http
        .post(app.url("/zones/rename"))
        .json(&json!({"name": "x", "type": "txt"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn simple_update_requires_value() {
    let app = TestApp::spawn("").await;
    let res = app
        .http
        .post(app.url("/example.com/update"))
        .json(&json!({"name": "x", "type": ["A"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = TestApp::spawn("").await;
    let res = app
        .http
        .post(app.url("/zones"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    // Grab a free port and release it so nothing is listening there.
    let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead_url = format!("http://{}/api/v1", closed.local_addr().unwrap());
    drop(closed);
    let addr = serve(dead_url, "").await;

    let res = reqwest::get(format!("http://{addr}/zones")).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("upstream unreachable"));
}

#[tokio::test]
async fn undecodable_success_is_bad_gateway() {
    let app = TestApp::spawn("").await;
    Mock::given(method("GET"))
        .and(path("/api/v1/servers/localhost/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&app.upstream)
        .await;

    let res = app.http.get(app.url("/zones")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["upstream_status"], 200);
}
