use std::sync::Arc;

use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value};
use speculoos::prelude::*;

use crate::helpers::{
    build_app, fake_registration, BrokenParticipantStore, InMemoryParticipantStore,
    SavedParticipant,
};

#[actix_web::test]
async fn valid_registration_is_saved() {
    let store = Arc::new(InMemoryParticipantStore::default());
    let app = test::init_service(build_app(store.clone(), None)).await;

    let request = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({
            "name": " Rudolph ",
            "address": "1 Reindeer Lane, North Pole",
            "email": "rudolph@santa.org"
        }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_that(&response.status()).is_equal_to(StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_that(&body).is_equal_to(json!({"message": "Registration successful!"}));

    assert_that(&store.participants()).is_equal_to(vec![SavedParticipant {
        name: "Rudolph".to_owned(),
        address: "1 Reindeer Lane, North Pole".to_owned(),
        email: "rudolph@santa.org".to_owned(),
    }]);
}

#[actix_web::test]
async fn invalid_registration_returns_the_errors() {
    let store = Arc::new(InMemoryParticipantStore::default());
    let app = test::init_service(build_app(store.clone(), None)).await;

    let request = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({
            "name": "Grinch",
            "address": "   ",
            "email": "grinch-at-mount-crumpit"
        }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_that(&response.status()).is_equal_to(StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_that(&body).is_equal_to(json!({
        "address": ["This field may not be blank."],
        "email": ["Enter a valid email address."]
    }));
    assert_that(&store.participants()).is_empty();
}

#[actix_web::test]
async fn missing_fields_are_reported() {
    let store = Arc::new(InMemoryParticipantStore::default());
    let app = test::init_service(build_app(store.clone(), None)).await;

    let request = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({"name": "Blitzen", "email": null, "favourite_cookie": "gingerbread"}))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_that(&response.status()).is_equal_to(StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_that(&body).is_equal_to(json!({
        "address": ["This field is required."],
        "email": ["This field may not be null."]
    }));
    assert_that(&store.participants()).is_empty();
}

#[actix_web::test]
async fn null_characters_are_refused_before_the_database() {
    let store = Arc::new(InMemoryParticipantStore::default());
    let app = test::init_service(build_app(store.clone(), None)).await;

    let request = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({
            "name": "Ru\u{0}dolph",
            "address": "Stable\u{0} 1",
            "email": "rudolph@santa.org"
        }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_that(&response.status()).is_equal_to(StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_that(&body).is_equal_to(json!({
        "address": ["Null characters are not allowed."],
        "name": ["Null characters are not allowed."]
    }));
    assert_that(&store.participants()).is_empty();
}

#[actix_web::test]
async fn email_without_dotted_domain_is_refused() {
    let store = Arc::new(InMemoryParticipantStore::default());
    let app = test::init_service(build_app(store.clone(), None)).await;

    let request = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({
            "name": "Rudolph",
            "address": "1 Reindeer Lane",
            "email": "rudolph@northpole"
        }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_that(&response.status()).is_equal_to(StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_that(&body).is_equal_to(json!({"email": ["Enter a valid email address."]}));
    assert_that(&store.participants()).is_empty();
}

#[actix_web::test]
async fn malformed_payload_is_a_bad_request() {
    let store = Arc::new(InMemoryParticipantStore::default());
    let app = test::init_service(build_app(store.clone(), None)).await;

    let payloads = [
        (ContentType::json(), "name=Prancer".to_owned()),
        (ContentType::json(), r#"{"name": 42, "address": "x", "email": "x@y.z"}"#.to_owned()),
        (ContentType::plaintext(), fake_registration().to_string()),
    ];

    for (content_type, payload) in payloads {
        let request = test::TestRequest::post()
            .uri("/api/users")
            .insert_header(content_type)
            .set_payload(payload.clone())
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_that(&response.status())
            .named(&payload)
            .is_equal_to(StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(response).await;
        assert_that(&body.get("detail")).named(&payload).is_some();
    }

    assert_that(&store.participants()).is_empty();
}

#[actix_web::test]
async fn same_person_can_register_twice() {
    let store = Arc::new(InMemoryParticipantStore::default());
    let app = test::init_service(build_app(store.clone(), None)).await;
    let registration = fake_registration();

    for _ in 0..2 {
        let request = test::TestRequest::post()
            .uri("/api/users")
            .set_json(&registration)
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_that(&response.status()).is_equal_to(StatusCode::OK);
    }

    let participants = store.participants();
    assert_that(&participants).has_length(2);
    assert_that(&participants[0]).is_equal_to(&participants[1]);
}

#[actix_web::test]
async fn database_failure_is_not_leaked() {
    let app = test::init_service(build_app(Arc::new(BrokenParticipantStore), None)).await;

    let request = test::TestRequest::post()
        .uri("/api/users")
        .set_json(fake_registration())
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_that(&response.status()).is_equal_to(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(response).await;
    assert_that(&body["type"]).is_equal_to(json!("/problem/database"));
    assert_that(&body.to_string()).does_not_contain("timed out");
}

#[actix_web::test]
async fn ping_answers() {
    let app = test::init_service(build_app(Arc::new(BrokenParticipantStore), None)).await;

    let request = test::TestRequest::get().uri("/api/ping").to_request();
    let response = test::call_service(&app, request).await;

    assert_that(&response.status()).is_equal_to(StatusCode::OK);
    let body = test::read_body(response).await;
    assert_that(&body.is_empty()).is_false();
}
