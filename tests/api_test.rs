use std::time::Duration;

use regatta_admin::models::{AthletePayload, EventPayload, VesselPayload};
use regatta_admin::{ApiClient, ApiError, Athlete, Event};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.uri(), None).unwrap()
}

#[tokio::test]
async fn lists_athletes_with_their_vessels() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/atletas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "_id": "a1",
                "nome": "Jane Doe",
                "cpf": "123.456.789-00",
                "embarcacoes": [{"_id": "v1", "nome": "Swift", "codigo": "BR-12"}],
                "__v": 0
            },
            {"_id": "a2", "nome": "John Roe", "cpf": "987.654.321-00"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let athletes = client(&server).list::<Athlete>().await.unwrap();

    assert_eq!(athletes.len(), 2);
    assert_eq!(athletes[0].name, "Jane Doe");
    assert_eq!(athletes[0].vessels[0].id.as_deref(), Some("v1"));
    assert_eq!(athletes[0].vessels[0].code, "BR-12");
    assert!(athletes[1].vessels.is_empty());
}

#[tokio::test]
async fn create_posts_the_payload_without_ids() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/atletas"))
        .and(body_json(json!({
            "nome": "Jane Doe",
            "cpf": "123.456.789-00",
            "embarcacoes": [{"nome": "Swift", "codigo": "BR-12"}]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": "a1"})))
        .expect(1)
        .mount(&server)
        .await;

    let payload = AthletePayload {
        name: "Jane Doe".into(),
        cpf: "123.456.789-00".into(),
        vessels: vec![VesselPayload {
            id: None,
            name: "Swift".into(),
            code: "BR-12".into(),
        }],
    };
    client(&server).create::<Athlete>(&payload).await.unwrap();
}

#[tokio::test]
async fn update_puts_to_the_record_path() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/eventos/e1"))
        .and(body_json(json!({
            "nome": "Regatta",
            "dataEvento": "2024-06-01",
            "inicioInscricoes": "2024-05-01",
            "fimInscricoes": "2024-05-20"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let payload = EventPayload {
        name: "Regatta".into(),
        event_date: "2024-06-01".into(),
        registration_start: "2024-05-01".into(),
        registration_end: "2024-05-20".into(),
    };
    client(&server)
        .update::<Event>("e1", &payload)
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_targets_one_record() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/atletas/a1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).delete::<Athlete>("a1").await.unwrap();
}

#[tokio::test]
async fn base_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/regatta/api/eventos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&format!("{}/regatta", server.uri()), None).unwrap();
    let events = client.list::<Event>().await.unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn error_status_carries_the_response_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/eventos"))
        .respond_with(ResponseTemplate::new(400).set_body_string("nome is required"))
        .mount(&server)
        .await;

    let payload = EventPayload {
        name: String::new(),
        event_date: "2024-06-01".into(),
        registration_start: "2024-05-01".into(),
        registration_end: "2024-05-20".into(),
    };
    let err = client(&server)
        .create::<Event>(&payload)
        .await
        .unwrap_err();

    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(message, "nome is required");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn empty_error_body_falls_back_to_the_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/atletas"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client(&server).list::<Athlete>().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Server responded with 503 Service Unavailable: Service Unavailable"
    );
}

#[tokio::test]
async fn malformed_collection_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/eventos"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).list::<Event>().await.unwrap_err();
    assert!(matches!(err, ApiError::Http(_)));
}

#[tokio::test]
async fn timeout_applies_to_slow_responses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/eventos"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri(), Some(Duration::from_millis(100))).unwrap();
    let err = client.list::<Event>().await.unwrap_err();
    match err {
        ApiError::Http(inner) => assert!(inner.is_timeout()),
        other => panic!("unexpected error: {other:?}"),
    }
}
