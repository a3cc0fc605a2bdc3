//! HTTP-level tests for `/api/records` in both modes.

mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use serde_json::{json, Value};

async fn create_drive(app: &TestApp, body: Value) -> String {
    let response = app
        .request_authenticated(Method::POST, "/api/records?mode=drives", Some(body))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["ok"], true);
    body["id"].as_str().expect("created id").to_string()
}

#[tokio::test]
async fn drives_listing_requires_a_date_range() {
    let app = TestApp::new().await;

    for uri in [
        "/api/records",
        "/api/records?mode=drives&start=2024-01-01",
        "/api/records?mode=drives&end=2024-01-31",
        "/api/records?mode=drives&start=&end=",
    ] {
        let response = app.request_authenticated(Method::GET, uri, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body = response_json(response).await;
        assert_eq!(body["rows"], json!([]), "{uri}");
        assert!(body["error"].as_str().unwrap().contains("start e end"));
    }
}

#[tokio::test]
async fn records_require_a_token() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/records?mode=loss", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(Method::GET, "/api/records?mode=loss", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_mode_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(Method::GET, "/api/records?mode=perdas", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("mode"));
}

#[tokio::test]
async fn drive_lifecycle_create_list_patch_delete() {
    let app = TestApp::new().await;

    let id = create_drive(
        &app,
        json!({
            "data": "2024-03-10",
            "usina": " ufv-sol ",
            "cliente": "élis",
            "equipamento": "INV-03",
            "alarme": "",
            "problema_identificado": "Falha de comunicação no inversor",
            "chamado": "1234"
        }),
    )
    .await;

    // outside the window
    create_drive(&app, json!({ "data": "2024-05-01", "usina": "UFV-LUA" })).await;

    let response = app
        .request_authenticated(
            Method::GET,
            "/api/records?mode=drives&start=2024-03-01&end=2024-03-31",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], id.as_str());
    assert_eq!(rows[0]["usina"], "UFV-SOL");
    assert_eq!(rows[0]["cliente"], "ÉLIS");
    assert_eq!(rows[0]["alarme"], Value::Null);
    assert_eq!(rows[0]["chamado"], 1234);

    let patch = json!({ "solucao_imediata": "Reinício remoto", "ignored": "x" });
    for _ in 0..2 {
        let response = app
            .request_authenticated(
                Method::PATCH,
                &format!("/api/records/{id}?mode=drives"),
                Some(patch.clone()),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response_json(response).await, json!({ "ok": true }));
    }

    let response = app
        .request_authenticated(
            Method::GET,
            "/api/records?mode=drives&start=2024-03-01&end=2024-03-31&q=REIN",
            None,
        )
        .await;
    let body = response_json(response).await;
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["solucao_imediata"], "Reinício remoto");
    assert_eq!(rows[0]["equipamento"], "INV-03");

    let response = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/records/{id}?mode=drives"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request_authenticated(
            Method::GET,
            "/api/records?mode=drives&start=2024-03-01&end=2024-03-31",
            None,
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["rows"], json!([]));
}

#[tokio::test]
async fn drives_search_matches_ticket_number() {
    let app = TestApp::new().await;
    create_drive(
        &app,
        json!({ "data": "2024-03-10", "usina": "UFV-SOL", "chamado": 98765 }),
    )
    .await;
    create_drive(&app, json!({ "data": "2024-03-11", "usina": "UFV-SOL" })).await;

    let response = app
        .request_authenticated(
            Method::GET,
            "/api/records?start=2024-03-01&end=2024-03-31&q=876",
            None,
        )
        .await;
    let body = response_json(response).await;
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["chamado"], 98765);
}

#[tokio::test]
async fn drives_listing_is_newest_first_and_paginated() {
    let app = TestApp::new().await;
    for day in ["2024-03-01", "2024-03-03", "2024-03-02"] {
        create_drive(&app, json!({ "data": day, "usina": "UFV-SOL" })).await;
    }

    let response = app
        .request_authenticated(
            Method::GET,
            "/api/records?start=2024-03-01&end=2024-03-31&limit=2&offset=0",
            None,
        )
        .await;
    let body = response_json(response).await;
    let dates: Vec<&str> = body["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["data"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-03-03", "2024-03-02"]);

    let response = app
        .request_authenticated(
            Method::GET,
            "/api/records?start=2024-03-01&end=2024-03-31&limit=abc&offset=2",
            None,
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["rows"].as_array().unwrap().len(), 1);
    assert_eq!(body["rows"][0]["data"], "2024-03-01");
}

#[tokio::test]
async fn create_requires_date_and_plant() {
    let app = TestApp::new().await;

    for body in [
        json!({ "usina": "UFV-SOL" }),
        json!({ "data": "2024-03-10" }),
        json!({ "data": "2024-03-10", "usina": "   " }),
        json!({ "data": "ontem", "usina": "UFV-SOL" }),
    ] {
        let response = app
            .request_authenticated(Method::POST, "/api/records?mode=drives", Some(body.clone()))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }
}

#[tokio::test]
async fn malformed_json_body_is_a_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .request_raw(Method::POST, "/api/records?mode=drives", "{\"data\": \"2024-03-10\",")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn non_object_json_body_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(Method::POST, "/api/records", Some(json!([1, 2, 3])))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("objeto JSON"));
}

#[tokio::test]
async fn search_finds_accented_text_in_either_case() {
    let app = TestApp::new().await;
    create_drive(
        &app,
        json!({
            "data": "2024-03-10",
            "usina": "UFV-SOL",
            "cliente": "élis",
            "problema_identificado": "MANUTENÇÃO preventiva"
        }),
    )
    .await;
    create_drive(&app, json!({ "data": "2024-03-11", "usina": "UFV-LUA" })).await;

    for q in ["%C3%89LIS", "%C3%A9lis", "MANUTEN%C3%87%C3%83O", "manuten%C3%A7%C3%A3o", "Preventiva"] {
        let response = app
            .request_authenticated(
                Method::GET,
                &format!("/api/records?start=2024-03-01&end=2024-03-31&q={q}"),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK, "{q}");
        let body = response_json(response).await;
        let rows = body["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 1, "q={q}");
        assert_eq!(rows[0]["cliente"], "ÉLIS");
    }
}

#[tokio::test]
async fn invalid_ids_and_empty_patches_are_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::PATCH,
            "/api/records/1%3BDROP%20TABLE%20acionamentos?mode=drives",
            Some(json!({ "alarme": "x" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request_authenticated(Method::DELETE, "/api/records/not-a-uuid?mode=loss", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let id = create_drive(&app, json!({ "data": "2024-03-10", "usina": "UFV-SOL" })).await;
    let response = app
        .request_authenticated(
            Method::PATCH,
            &format!("/api/records/{id}?mode=drives"),
            Some(json!({ "unknown": 1 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Nenhum campo para atualizar");
}

#[tokio::test]
async fn loss_mode_parses_components_loosely() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/records",
            Some(json!({
                "mode": "loss",
                "data": "10/03/2024",
                "usina": "ufv-sol",
                "cmp": "1.234,5",
                "skid": 2,
                "inversor": "n/a",
                "string": "0,75"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = response_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    // loss listing does not need a date range
    let response = app
        .request_authenticated(Method::GET, "/api/records?mode=loss&usina=UFV-SOL", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let row = &body["rows"][0];
    assert_eq!(row["id"], id.as_str());
    assert_eq!(row["data"], "2024-03-10");
    assert_eq!(row["cmp"], 1234.5);
    assert_eq!(row["skid"], 2.0);
    assert_eq!(row["inversor"], Value::Null);
    assert_eq!(row["string"], 0.75);

    let response = app
        .request_authenticated(
            Method::PATCH,
            &format!("/api/records/{id}?mode=loss"),
            Some(json!({ "tcu": "3,5" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request_authenticated(Method::GET, "/api/records?mode=loss&q=3.5", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["rows"][0]["tcu"], 3.5);

    let response = app
        .request_authenticated(Method::DELETE, &format!("/api/records/{id}?mode=loss"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request_authenticated(Method::GET, "/api/records?mode=loss", None)
        .await;
    assert_eq!(response_json(response).await["rows"], json!([]));
}
