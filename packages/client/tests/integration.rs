use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use etcdv2_client::{ClientConfig, EtcdClient, Error, Precondition, ReqwestTransport, Ttl};

fn set_body() -> serde_json::Value {
    json!({
        "action": "set",
        "node": {
            "key": "/sample",
            "value": "Hello world",
            "modifiedIndex": 7,
            "createdIndex": 7
        }
    })
}

fn config(locations: &[String]) -> ClientConfig {
    ClientConfig::new(locations.to_vec())
        .with_update_locations(false)
        .with_connect_timeout(Duration::from_millis(200))
        .with_read_timeout(Duration::from_millis(500))
}

#[tokio::test]
async fn test_get() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/keys/sample"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "action": "get",
            "node": {"key": "/sample", "value": "v", "modifiedIndex": 2, "createdIndex": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let locations = vec![server.uri()];
    let value = tokio::task::spawn_blocking(move || {
        let client = EtcdClient::new(config(&locations)).unwrap();
        client.get("sample").unwrap().node.value
    })
    .await
    .unwrap();

    assert_eq!(value.as_deref(), Some("v"));
}

#[tokio::test]
async fn test_put_with_unset_ttl_wire_format() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v2/keys/sample"))
        .and(query_param("ttl", ""))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("value=Hello+world"))
        .respond_with(ResponseTemplate::new(200).set_body_json(set_body()))
        .expect(1)
        .mount(&server)
        .await;

    let locations = vec![server.uri()];
    let result = tokio::task::spawn_blocking(move || {
        let client = EtcdClient::new(config(&locations)).unwrap();
        client.put_with_ttl("sample", "Hello world", Ttl::from_raw(-1))
    })
    .await
    .unwrap();

    assert_eq!(result.unwrap().node.modified_index, 7);
}

#[tokio::test]
async fn test_put_without_ttl_sends_no_ttl() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v2/keys/sample"))
        .and(query_param_is_missing("ttl"))
        .and(body_string("value=Hello+world"))
        .respond_with(ResponseTemplate::new(201).set_body_json(set_body()))
        .expect(1)
        .mount(&server)
        .await;

    let locations = vec![server.uri()];
    let result = tokio::task::spawn_blocking(move || {
        let client = EtcdClient::new(config(&locations)).unwrap();
        client.put("sample", "Hello world")
    })
    .await
    .unwrap();

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_compare_and_swap_with_ttl_and_prev_value() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v2/keys/sample"))
        .and(query_param("ttl", "60"))
        .and(query_param("prevValue", "Hello etcd"))
        .and(body_string("value=Hello+world"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "action": "compareAndSwap",
            "node": {"key": "/sample", "value": "Hello world", "ttl": 60,
                     "modifiedIndex": 8, "createdIndex": 7},
            "prevNode": {"key": "/sample", "value": "Hello etcd",
                         "modifiedIndex": 7, "createdIndex": 7}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let locations = vec![server.uri()];
    let response = tokio::task::spawn_blocking(move || {
        let client = EtcdClient::new(config(&locations)).unwrap();
        client
            .compare_and_swap_with_ttl(
                "sample",
                "Hello world",
                60u64,
                Precondition::PrevValue("Hello etcd".to_string()),
            )
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(response.action, "compareAndSwap");
    assert_eq!(response.prev_node.unwrap().value.as_deref(), Some("Hello etcd"));
}

#[tokio::test]
async fn test_put_dir_with_ttl_body() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v2/keys/queue"))
        .and(body_string("dir=true&ttl=60"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "action": "set",
            "node": {"key": "/queue", "dir": true, "ttl": 60, "modifiedIndex": 9, "createdIndex": 9}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let locations = vec![server.uri()];
    let response = tokio::task::spawn_blocking(move || {
        let client = EtcdClient::new(config(&locations)).unwrap();
        client.put_dir_with_ttl("queue", 60u64).unwrap()
    })
    .await
    .unwrap();

    assert!(response.node.dir);
}

#[tokio::test]
async fn test_put_dir_with_unset_ttl_over_custom_client() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v2/keys/queue"))
        .and(query_param_is_missing("ttl"))
        .and(header("user-agent", "etcdv2-client-tests"))
        .and(body_string("dir=true&ttl="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "action": "update",
            "node": {"key": "/queue", "dir": true, "modifiedIndex": 10, "createdIndex": 9}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let locations = vec![server.uri()];
    let response = tokio::task::spawn_blocking(move || {
        let http = reqwest::blocking::Client::builder()
            .user_agent("etcdv2-client-tests")
            .timeout(Duration::from_millis(500))
            .build()
            .unwrap();
        let transport = Arc::new(ReqwestTransport::with_client(http));
        let client = EtcdClient::with_transport(config(&locations), transport).unwrap();
        client.put_dir_with_ttl("queue", Ttl::from_raw(-1)).unwrap()
    })
    .await
    .unwrap();

    assert!(response.node.dir);
    assert_eq!(response.node.ttl, None);
}

#[tokio::test]
async fn test_etcd_error_is_not_failed_over() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/keys/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errorCode": 100,
            "message": "Key not found",
            "cause": "/missing",
            "index": 12
        })))
        .expect(1)
        .mount(&first)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(set_body()))
        .expect(0)
        .mount(&second)
        .await;

    let locations = vec![first.uri(), second.uri()];
    let error = tokio::task::spawn_blocking(move || {
        let config = config(&locations)
            .with_retry_count(3)
            .with_retry_duration(Duration::from_secs(30));
        let client = EtcdClient::new(config).unwrap();
        client.get("missing").unwrap_err()
    })
    .await
    .unwrap();

    assert_eq!(error.status(), Some(404));
    let etcd_error = error.etcd_error().unwrap();
    assert!(etcd_error.is_key_not_found());
    assert_eq!(etcd_error.index, 12);
}

#[tokio::test]
async fn test_fails_over_after_read_timeout() {
    let slow = MockServer::start().await;
    let healthy = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/keys/sample"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(set_body())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&slow)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/keys/sample"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "action": "get",
            "node": {"key": "/sample", "value": "v"}
        })))
        .expect(1)
        .mount(&healthy)
        .await;

    let locations = vec![slow.uri(), healthy.uri()];
    let (value, current) = tokio::task::spawn_blocking(move || {
        let config = config(&locations)
            .with_retry_count(1)
            .with_retry_duration(Duration::from_secs(30));
        let client = EtcdClient::new(config).unwrap();
        let value = client.get("sample").unwrap().node.value;
        (value, client.current_location())
    })
    .await
    .unwrap();

    assert_eq!(value.as_deref(), Some("v"));
    assert_eq!(current.port(), url_port(&healthy.uri()));
}

#[tokio::test]
async fn test_unreachable_endpoints_exhaust_budget() {
    // Nothing listens on port 1.
    let locations = vec!["http://127.0.0.1:1".to_string(), "http://127.0.0.1:1/".to_string()];

    let error = tokio::task::spawn_blocking(move || {
        let config = config(&locations)
            .with_retry_count(3)
            .with_retry_duration(Duration::from_secs(5));
        let client = EtcdClient::new(config).unwrap();
        client.get("sample").unwrap_err()
    })
    .await
    .unwrap();

    assert!(matches!(error, Error::Transport(_)));
}

#[tokio::test]
async fn test_refresh_replaces_endpoints_with_live_members() {
    let seed = MockServer::start().await;
    let member = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/members"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "members": [
                {
                    "id": "272e204152",
                    "name": "infra1",
                    "peerURLs": ["http://127.0.0.1:2380"],
                    "clientURLs": [member.uri(), "http://127.0.0.1:1"]
                }
            ]
        })))
        .expect(1)
        .mount(&seed)
        .await;

    Mock::given(method("GET"))
        .and(path("/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "etcdserver": "2.3.7",
            "etcdcluster": "2.3.0"
        })))
        .expect(1)
        .mount(&member)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/keys/sample"))
        .respond_with(ResponseTemplate::new(200).set_body_json(set_body()))
        .expect(1)
        .mount(&member)
        .await;

    let locations = vec![seed.uri()];
    let member_port = url_port(&member.uri());
    let (ports, value) = tokio::task::spawn_blocking(move || {
        let client = EtcdClient::new(config(&locations)).unwrap();
        client.refresh_members().unwrap();
        let ports: Vec<_> = client.locations().iter().map(|url| url.port()).collect();
        let value = client.get("sample").unwrap().node.value;
        (ports, value)
    })
    .await
    .unwrap();

    assert_eq!(ports, vec![member_port]);
    assert_eq!(value.as_deref(), Some("Hello world"));
}

fn url_port(uri: &str) -> Option<u16> {
    url::Url::parse(uri).unwrap().port()
}
