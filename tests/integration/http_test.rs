//! HTTP service tests.
//!
//! Drives the router in-process against the in-memory catalogs; no database
//! or socket is needed.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use zoo_reports::db::{FailingCatalog, MockCatalog};
use zoo_reports::server::responses::CONNECTION_DETAIL;
use zoo_reports::server::{router, SharedCatalog};

const ORIGIN: &str = "http://localhost:5173";

fn mock_app() -> (Arc<MockCatalog>, Router) {
    let mock = Arc::new(MockCatalog::seeded());
    let catalog: SharedCatalog = mock.clone();
    (mock, router(catalog, ORIGIN).unwrap())
}

fn failing_app() -> Router {
    router(Arc::new(FailingCatalog), ORIGIN).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_json(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn kion(habitat_id: i32) -> Value {
    json!({
        "nome": "Kion",
        "especie": "Panthera leo",
        "sexo": "M",
        "dt_nasc": "2024-05-10",
        "dt_entrada": "2025-07-28",
        "peso": 150.5,
        "obs": "Filho de Simba",
        "id_hab": habitat_id
    })
}

#[tokio::test]
async fn test_root_liveness() {
    let (_, app) = mock_app();
    let (status, body) = send(app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"mensagem": "API do Zoológico está rodando!"}));
}

#[tokio::test]
async fn test_foods_by_supplier() {
    let (_, app) = mock_app();
    let (status, body) = send(app, get("/fornecedor/5/alimentos")).await;
    assert_eq!(status, StatusCode::OK);

    let mut items = body.as_array().unwrap().clone();
    items.sort_by(|a, b| a["nome_alimento"].as_str().cmp(&b["nome_alimento"].as_str()));
    assert_eq!(
        items,
        vec![
            json!({"nome_alimento": "Carne bovina", "quantidade_kg": 25.0}),
            json!({"nome_alimento": "Frango", "quantidade_kg": 10.5}),
        ]
    );
}

#[tokio::test]
async fn test_collection_routes_shapes() {
    let (_, app) = mock_app();

    let (_, body) = send(app.clone(), get("/funcionarios/emails-tardios")).await;
    assert_eq!(
        body,
        json!([{"email": "carla@zoo.br"}, {"email": "diego@zoo.br"}])
    );

    let (_, body) = send(app.clone(), get("/cuidadores/ranking")).await;
    assert_eq!(body[0], json!({"nome": "Bruno Lima", "animais_cuidados": 3}));

    let (_, body) = send(app.clone(), get("/faxineiros/ranking")).await;
    assert_eq!(
        body[0],
        json!({"nome": "Carla Dias", "habitats_higienizados": 2})
    );

    let (_, body) = send(app.clone(), get("/habitats/medicados")).await;
    assert_eq!(body, json!([{"nome": "Floresta Tropical"}, {"nome": "Savana"}]));

    let (_, body) = send(app.clone(), get("/animais/resumo")).await;
    assert_eq!(body.as_array().unwrap().len(), 5);
    assert_eq!(body[0]["nome_animal"], json!("Simba"));
    assert_eq!(body[0]["qtd_produtos_consumidos"], json!(2));

    let (_, body) = send(app.clone(), get("/animais/ranking-alimentos")).await;
    assert_eq!(body.as_array().unwrap().len(), 7);
    assert_eq!(body[0]["ranking_consumo"], json!(1));

    let (_, body) = send(app, get("/funcionarios")).await;
    assert_eq!(body[0]["data_admissao"], json!("2023-01-10"));
}

#[tokio::test]
async fn test_lookups_and_not_found() {
    let (_, app) = mock_app();

    let (status, body) = send(app.clone(), get("/fornecedor/5/info")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "nome": "Nutri Fauna",
            "email": "pedidos@nutrifauna.com.br",
            "telefone": "(61) 3333-0005"
        })
    );

    let (status, body) = send(app.clone(), get("/fornecedor/9/info")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Fornecedor não encontrado."}));

    let (status, body) = send(app.clone(), get("/animal/4/fornecedor-principal")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"telefone": "(61) 3333-0005"}));

    let (status, _) = send(app, get("/animal/5/fornecedor-principal")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_animal_missing_habitat_is_bad_request() {
    let (mock, app) = mock_app();

    let (status, body) = send(app, with_json(Method::POST, "/animal/", kion(99))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("99"));
    assert_eq!(mock.animal_count(), 5);
}

#[tokio::test]
async fn test_post_animal() {
    let (mock, app) = mock_app();

    let (status, body) = send(app, with_json(Method::POST, "/animal/", kion(1))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["msg"].as_str().unwrap().contains("sucesso"));
    assert_eq!(mock.animal_count(), 6);
}

#[tokio::test]
async fn test_put_product_quantity() {
    let (mock, app) = mock_app();

    let (status, body) = send(
        app.clone(),
        with_json(
            Method::PUT,
            "/produto/",
            json!({"id_produto": 1, "nova_quantidade": 80}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["msg"].as_str().unwrap().contains("sucesso"));

    let (status, body) = send(
        app.clone(),
        with_json(
            Method::PUT,
            "/produto/",
            json!({"id_produto": 1, "nova_quantidade": -10}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
    assert_eq!(mock.product_quantity(1), Some(80));

    let (status, _) = send(
        app,
        with_json(
            Method::PUT,
            "/produto/",
            json!({"id_produto": 42, "nova_quantidade": 5}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_habitat_then_list() {
    let (_, app) = mock_app();

    let new = json!({
        "nome": "Pântano",
        "tipo": "Alagado",
        "localizacao": "Setor Oeste",
        "temp_media": 26.5
    });
    let (status, body) = send(app.clone(), with_json(Method::POST, "/habitats", new)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"mensagem": "Habitat adicionado com sucesso!"}));

    let (_, body) = send(app, get("/habitats")).await;
    let stored = body
        .as_array()
        .unwrap()
        .iter()
        .find(|h| h["nome"] == "Pântano")
        .cloned()
        .unwrap();
    assert_eq!(
        stored,
        json!({
            "id_habitat": 4,
            "nome": "Pântano",
            "tipo": "Alagado",
            "localizacao": "Setor Oeste",
            "temp_media": 26.5
        })
    );
}

#[tokio::test]
async fn test_post_employee_duplicate_reports_erro() {
    let (_, app) = mock_app();

    let employee = json!({
        "nome": "Outra Ana",
        "data_admissao": "2025-07-29",
        "cpf": "111.111.111-11",
        "email": "outra@zoo.br",
        "endereco": "Rua B"
    });
    let (status, body) = send(app, with_json(Method::POST, "/funcionarios", employee)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["erro"].as_str().unwrap().contains("funcionario_cpf_key"));
}

#[tokio::test]
async fn test_malformed_body_never_reaches_catalog() {
    let (mock, app) = mock_app();

    let mut body = kion(1);
    body["dt_nasc"] = json!("10/05/2024");
    let (status, _) = send(app, with_json(Method::POST, "/animal/", body)).await;
    assert!(status.is_client_error());
    assert_eq!(mock.animal_count(), 5);
}

#[tokio::test]
async fn test_unreachable_store_mapping() {
    let app = failing_app();

    let (status, body) = send(app.clone(), get("/habitats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(app.clone(), get("/fornecedor/5/alimentos")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(app.clone(), get("/fornecedor/1/info")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"detail": CONNECTION_DETAIL}));

    let (status, _) = send(app.clone(), get("/funcionarios")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = send(app.clone(), get("/produtos")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = send(app.clone(), with_json(Method::POST, "/animal/", kion(1))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let habitat = json!({
        "nome": "Pântano",
        "tipo": "Alagado",
        "localizacao": "Setor Oeste",
        "temp_media": 26.5
    });
    let (status, body) = send(app, with_json(Method::POST, "/habitats", habitat)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"mensagem": "Erro de conexão."}));
}

#[tokio::test]
async fn test_cors_allows_only_configured_origin() {
    let preflight = |origin: &str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/produto/")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap()
    };

    let (_, app) = mock_app();
    let response = app.clone().oneshot(preflight(ORIGIN)).await.unwrap();
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        ORIGIN
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );

    let response = app.oneshot(preflight("http://evil.example")).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
