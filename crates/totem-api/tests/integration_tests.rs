//! Integration tests driving the full router with the in-memory catalog.
//!
//! Each test builds its own app over a temporary public directory, so
//! sessions, rate limits and icon files never leak between tests.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use totem_api::config::AppConfig;
use totem_api::state::AppState;

const INDEX_MARKER: &str = "<!-- kiosk -->";
const LOGIN_MARKER: &str = "<!-- login -->";
const ADMIN_MARKER: &str = "<!-- admin -->";

struct TestApp {
    router: Router,
    dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        Self::configured(|_| {})
    }

    fn configured(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let public = dir.path().join("public");
        std::fs::create_dir_all(public.join("icons")).unwrap();
        std::fs::write(public.join("index.html"), INDEX_MARKER).unwrap();
        std::fs::write(public.join("login.html"), LOGIN_MARKER).unwrap();
        std::fs::write(public.join("admin.html"), ADMIN_MARKER).unwrap();
        std::fs::write(public.join("kiosk.js"), "// kiosk").unwrap();

        let mut config = AppConfig {
            icons_dir: public.join("icons"),
            public_dir: public,
            ..AppConfig::default()
        };
        adjust(&mut config);
        let router = totem_api::app(AppState::with_config(config, None));
        Self { router, dir }
    }

    fn icons_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("public").join("icons")
    }

    async fn send(&self, request: Request<Body>) -> axum::response::Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.send(request).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Log in with the default password and return the `Cookie` header value.
    async fn login(&self) -> String {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"password": "admin"}).to_string()))
            .unwrap();
        let response = self.send(request).await;
        assert_eq!(response.status(), StatusCode::OK);
        session_cookie(&response)
    }
}

fn session_cookie(response: &axum::response::Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn multipart_upload(filename: &str, bytes: &[u8], cookie: &str) -> Request<Body> {
    let boundary = "totemboundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(header::COOKIE, cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

// -- Health -------------------------------------------------------------------

#[tokio::test]
async fn health_probes() {
    let app = TestApp::new();
    let response = app.send(get("/health/liveness")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");

    let response = app.send(get("/health/readiness")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ready");
}

#[tokio::test]
async fn metrics_endpoint_renders() {
    let app = TestApp::new();
    let response = app.send(get("/metrics")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Access control -----------------------------------------------------------

#[tokio::test]
async fn public_reads_carry_cache_header() {
    let app = TestApp::new();
    let response = app.send(get("/api/tramites")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=10, stale-while-revalidate=20"
    );
    assert_eq!(
        response.headers()[header::X_CONTENT_TYPE_OPTIONS],
        "nosniff"
    );
}

#[tokio::test]
async fn admin_routes_require_session() {
    let app = TestApp::new();

    let (status, body) = app
        .call(Method::POST, "/api/tramites", Some(json!({"titulo": "X"})), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    assert_eq!(body["error"]["message"], "Not authenticated");

    for uri in ["/api/modulos", "/api/requisitos", "/api/tramite-modulo"] {
        let (status, _) = app.call(Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }

    let (status, _) = app.call(Method::DELETE, "/api/tramites/1", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forged_cookie_is_rejected() {
    let app = TestApp::new();
    let cookie = format!("totem.sid={}", uuid::Uuid::new_v4());
    let (status, _) = app
        .call(Method::GET, "/api/modulos", None, Some(&cookie))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// -- Session ------------------------------------------------------------------

#[tokio::test]
async fn login_sets_hardened_cookie() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"password": "admin"}).to_string()))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("totem.sid="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new();
    let (status, body) = app
        .call(Method::POST, "/api/login", Some(json!({"password": "nope"})), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn auth_check_and_logout() {
    let app = TestApp::new();

    let (_, body) = app.call(Method::GET, "/api/auth-check", None, None).await;
    assert_eq!(body["authenticated"], false);

    let cookie = app.login().await;
    let (_, body) = app
        .call(Method::GET, "/api/auth-check", None, Some(&cookie))
        .await;
    assert_eq!(body["authenticated"], true);

    let (status, _) = app
        .call(Method::POST, "/api/logout", None, Some(&cookie))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .call(Method::GET, "/api/auth-check", None, Some(&cookie))
        .await;
    assert_eq!(body["authenticated"], false);
}

#[tokio::test]
async fn login_regenerates_session() {
    let app = TestApp::new();
    let first = app.login().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, &first)
        .body(Body::from(json!({"password": "admin"}).to_string()))
        .unwrap();
    let response = app.send(request).await;
    let second = session_cookie(&response);
    assert_ne!(first, second);

    let (_, body) = app
        .call(Method::GET, "/api/auth-check", None, Some(&first))
        .await;
    assert_eq!(body["authenticated"], false);
    let (_, body) = app
        .call(Method::GET, "/api/auth-check", None, Some(&second))
        .await;
    assert_eq!(body["authenticated"], true);
}

#[tokio::test]
async fn login_is_rate_limited() {
    let app = TestApp::new();
    for _ in 0..20 {
        let (status, _) = app
            .call(Method::POST, "/api/login", Some(json!({"password": "nope"})), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (status, body) = app
        .call(Method::POST, "/api/login", Some(json!({"password": "admin"})), None)
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        body["error"]["message"],
        "Too many login attempts. Try again later."
    );
}

fn login_from(forwarded_for: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", forwarded_for)
        .body(Body::from(json!({ "password": password }).to_string()))
        .unwrap()
}

#[tokio::test]
async fn rotating_forwarded_for_does_not_reset_login_limit() {
    let app = TestApp::new();
    for i in 0..20 {
        let response = app.send(login_from(&format!("198.51.100.{i}"), "nope")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    let response = app.send(login_from("198.51.100.200", "admin")).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn trusted_proxy_limits_on_the_hop_it_appended() {
    let app = TestApp::configured(|config| config.trusted_proxy_hops = 1);
    for i in 0..20 {
        let spoofed = format!("10.9.9.{i}, 203.0.113.5");
        let response = app.send(login_from(&spoofed, "nope")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    let response = app.send(login_from("10.9.9.99, 203.0.113.5", "admin")).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let response = app.send(login_from("203.0.113.6", "admin")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Procedures ---------------------------------------------------------------

#[tokio::test]
async fn tramite_crud() {
    let app = TestApp::new();
    let cookie = app.login().await;

    let (status, created) = app
        .call(
            Method::POST,
            "/api/tramites",
            Some(json!({"titulo": "  Testamento ", "icono": ""})),
            Some(&cookie),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["titulo"], "Testamento");
    assert!(created["icono"].is_null());
    let id = created["id"].as_i64().unwrap();

    let (status, detail) = app
        .call(Method::GET, &format!("/api/tramites/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["titulo"], "Testamento");
    assert!(detail["requisitos"].as_array().unwrap().is_empty());
    assert!(detail["modulos"].as_array().unwrap().is_empty());

    let (status, updated) = app
        .call(
            Method::PUT,
            &format!("/api/tramites/{id}"),
            Some(json!({"titulo": "Testamento público abierto"})),
            Some(&cookie),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["titulo"], "Testamento público abierto");

    let (_, list) = app.call(Method::GET, "/api/tramites", None, None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["titulo"], "Testamento público abierto");

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/tramites/{id}"), None, Some(&cookie))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/tramites/{id}"), None, Some(&cookie))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .call(Method::GET, &format!("/api/tramites/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn invalid_input_is_unprocessable() {
    let app = TestApp::new();
    let cookie = app.login().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/tramites",
            Some(json!({"titulo": "   "})),
            Some(&cookie),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/tramites")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, &cookie)
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = app
        .call(Method::GET, "/api/tramites/abc", None, None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn update_missing_tramite_is_not_found() {
    let app = TestApp::new();
    let cookie = app.login().await;
    let (status, _) = app
        .call(
            Method::PUT,
            "/api/tramites/404",
            Some(json!({"titulo": "X"})),
            Some(&cookie),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Counters, requirements, associations -------------------------------------

#[tokio::test]
async fn modulos_list_in_counter_order() {
    let app = TestApp::new();
    let cookie = app.login().await;
    for (nombre, numero) in [("Ventanilla", "Módulo 10"), ("Caja", "Módulo 2"), ("Recepción", "")] {
        let (status, _) = app
            .call(
                Method::POST,
                "/api/modulos",
                Some(json!({"nombre": nombre, "numero": numero, "piso": "Planta baja"})),
                Some(&cookie),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, list) = app
        .call(Method::GET, "/api/modulos", None, Some(&cookie))
        .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["nombre"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Caja", "Ventanilla", "Recepción"]);
    assert!(list[2]["numero"].is_null());
}

#[tokio::test]
async fn requisitos_are_appended_in_order() {
    let app = TestApp::new();
    let cookie = app.login().await;
    let (_, tramite) = app
        .call(
            Method::POST,
            "/api/tramites",
            Some(json!({"titulo": "Poder notarial"})),
            Some(&cookie),
        )
        .await;
    let tramite_id = tramite["id"].as_i64().unwrap();

    let mut ids = Vec::new();
    for texto in ["INE vigente", "CURP", "Comprobante de domicilio"] {
        let (status, requisito) = app
            .call(
                Method::POST,
                "/api/requisitos",
                Some(json!({"tramite_id": tramite_id, "texto": texto})),
                Some(&cookie),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(requisito["sort_order"].as_i64().unwrap(), ids.len() as i64);
        ids.push(requisito["id"].as_i64().unwrap());
    }

    // Move the first requirement to the end; texto-only edits keep position.
    let (status, moved) = app
        .call(
            Method::PUT,
            &format!("/api/requisitos/{}", ids[0]),
            Some(json!({"texto": "INE o pasaporte", "sort_order": 9})),
            Some(&cookie),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["sort_order"], 9);

    let (_, kept) = app
        .call(
            Method::PUT,
            &format!("/api/requisitos/{}", ids[1]),
            Some(json!({"texto": "CURP certificada"})),
            Some(&cookie),
        )
        .await;
    assert_eq!(kept["sort_order"], 1);

    let (_, list) = app
        .call(
            Method::GET,
            &format!("/api/requisitos?tramite_id={tramite_id}"),
            None,
            Some(&cookie),
        )
        .await;
    let texts: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["texto"].as_str().unwrap())
        .collect();
    assert_eq!(
        texts,
        vec!["CURP certificada", "Comprobante de domicilio", "INE o pasaporte"]
    );

    let (_, detail) = app
        .call(Method::GET, &format!("/api/tramites/{tramite_id}"), None, None)
        .await;
    assert_eq!(detail["requisitos"].as_array().unwrap().len(), 3);
    assert_eq!(detail["requisitos"][2]["texto"], "INE o pasaporte");
}

#[tokio::test]
async fn requisito_for_unknown_tramite_is_not_found() {
    let app = TestApp::new();
    let cookie = app.login().await;
    let (status, _) = app
        .call(
            Method::POST,
            "/api/requisitos",
            Some(json!({"tramite_id": 77, "texto": "INE"})),
            Some(&cookie),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn associations_lifecycle() {
    let app = TestApp::new();
    let cookie = app.login().await;
    let (_, tramite) = app
        .call(
            Method::POST,
            "/api/tramites",
            Some(json!({"titulo": "Compraventa"})),
            Some(&cookie),
        )
        .await;
    let (_, modulo) = app
        .call(
            Method::POST,
            "/api/modulos",
            Some(json!({"nombre": "Escrituración", "numero": "3"})),
            Some(&cookie),
        )
        .await;
    let link = json!({"tramite_id": tramite["id"], "modulo_id": modulo["id"]});

    let (status, _) = app
        .call(Method::POST, "/api/tramite-modulo", Some(link.clone()), Some(&cookie))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .call(Method::POST, "/api/tramite-modulo", Some(link.clone()), Some(&cookie))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, _) = app
        .call(
            Method::POST,
            "/api/tramite-modulo",
            Some(json!({"tramite_id": tramite["id"], "modulo_id": 999})),
            Some(&cookie),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, detail) = app
        .call(
            Method::GET,
            &format!("/api/tramites/{}", tramite["id"]),
            None,
            None,
        )
        .await;
    assert_eq!(detail["modulos"][0]["nombre"], "Escrituración");

    let (_, list) = app
        .call(
            Method::GET,
            &format!("/api/tramite-modulo?modulo_id={}", modulo["id"]),
            None,
            Some(&cookie),
        )
        .await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let path = format!("/api/tramite-modulo/{}/{}", tramite["id"], modulo["id"]);
    let (status, _) = app.call(Method::GET, &path, None, Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.call(Method::DELETE, &path, None, Some(&cookie)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.call(Method::GET, &path, None, Some(&cookie)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tramite_delete_cascades() {
    let app = TestApp::new();
    let cookie = app.login().await;
    let (_, tramite) = app
        .call(
            Method::POST,
            "/api/tramites",
            Some(json!({"titulo": "Donación"})),
            Some(&cookie),
        )
        .await;
    let (_, modulo) = app
        .call(
            Method::POST,
            "/api/modulos",
            Some(json!({"nombre": "Caja"})),
            Some(&cookie),
        )
        .await;
    app.call(
        Method::POST,
        "/api/requisitos",
        Some(json!({"tramite_id": tramite["id"], "texto": "INE"})),
        Some(&cookie),
    )
    .await;
    app.call(
        Method::POST,
        "/api/tramite-modulo",
        Some(json!({"tramite_id": tramite["id"], "modulo_id": modulo["id"]})),
        Some(&cookie),
    )
    .await;

    // Warm the caches before deleting.
    app.call(Method::GET, "/api/requisitos", None, Some(&cookie)).await;
    app.call(Method::GET, "/api/tramite-modulo", None, Some(&cookie)).await;

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/tramites/{}", tramite["id"]),
            None,
            Some(&cookie),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, requisitos) = app
        .call(Method::GET, "/api/requisitos", None, Some(&cookie))
        .await;
    assert!(requisitos.as_array().unwrap().is_empty());
    let (_, links) = app
        .call(Method::GET, "/api/tramite-modulo", None, Some(&cookie))
        .await;
    assert!(links.as_array().unwrap().is_empty());
}

// -- Kiosk --------------------------------------------------------------------

#[tokio::test]
async fn kiosk_config_is_public() {
    let app = TestApp::new();
    let (status, config) = app.call(Method::GET, "/api/kiosk/config", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(config["cards_per_page"], 8);
    assert_eq!(config["modal_timeout_ms"], 300_000);
    assert_eq!(config["speech"]["lang"], "es-MX");
}

#[tokio::test]
async fn kiosk_pages() {
    let app = TestApp::new();
    let cookie = app.login().await;
    for n in 1..=10 {
        app.call(
            Method::POST,
            "/api/tramites",
            Some(json!({"titulo": format!("Trámite {n}")})),
            Some(&cookie),
        )
        .await;
    }

    let (status, first) = app.call(Method::GET, "/api/kiosk/pages/0", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["page_count"], 2);
    assert_eq!(first["range"], "1-8 / 10");
    assert_eq!(first["cards"].as_array().unwrap().len(), 8);
    assert_eq!(first["cards"][0]["numero"], 1);
    assert_eq!(first["nav"]["prev"], false);
    assert_eq!(first["nav"]["next"], true);

    let (_, second) = app.call(Method::GET, "/api/kiosk/pages/1", None, None).await;
    assert_eq!(second["range"], "9-10 / 10");
    assert_eq!(second["cards"][0]["numero"], 9);
    assert_eq!(second["cards"][1]["titulo"], "Trámite 10");
    assert_eq!(second["nav"]["prev"], true);
    assert_eq!(second["nav"]["next"], false);

    let (status, _) = app.call(Method::GET, "/api/kiosk/pages/2", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn kiosk_empty_catalog() {
    let app = TestApp::new();
    let (status, page) = app.call(Method::GET, "/api/kiosk/pages/0", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["range"], "0-0 / 0");
    assert!(page["cards"].as_array().unwrap().is_empty());
    assert_eq!(page["nav"]["prev"], false);
    assert_eq!(page["nav"]["next"], false);
}

// -- Uploads ------------------------------------------------------------------

#[tokio::test]
async fn upload_and_delete_icon() {
    let app = TestApp::new();
    let cookie = app.login().await;

    let response = app
        .send(multipart_upload("Escudo.PNG", b"\x89PNG fake", &cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let filename = body["filename"].as_str().unwrap().to_string();
    assert!(filename.ends_with(".png"));
    assert_eq!(body["url"], format!("/icons/{filename}"));
    assert!(app.icons_dir().join(&filename).exists());

    let response = app.send(get(&format!("/icons/{filename}"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=604800, immutable"
    );

    let uri = format!("/api/upload/{filename}");
    let (status, _) = app.call(Method::DELETE, &uri, None, Some(&cookie)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!app.icons_dir().join(&filename).exists());

    let (status, _) = app.call(Method::DELETE, &uri, None, Some(&cookie)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_rejects_unsupported_type() {
    let app = TestApp::new();
    let cookie = app.login().await;
    let response = app.send(multipart_upload("payload.exe", b"MZ", &cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_requires_session() {
    let app = TestApp::new();
    let response = app.send(multipart_upload("a.png", b"png", "totem.sid=x")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn icon_delete_rejects_traversal() {
    let app = TestApp::new();
    let cookie = app.login().await;
    std::fs::write(app.dir.path().join("public").join("secret.png"), "x").unwrap();

    let (status, body) = app
        .call(Method::DELETE, "/api/upload/..%2Fsecret.png", None, Some(&cookie))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_UPLOAD");
    assert!(app.dir.path().join("public").join("secret.png").exists());

    let (status, _) = app
        .call(Method::DELETE, "/api/upload/notes.txt", None, Some(&cookie))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// -- Pages --------------------------------------------------------------------

#[tokio::test]
async fn kiosk_page_is_served_uncached() {
    let app = TestApp::new();
    let response = app.send(get("/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
    assert!(body_text(response).await.contains(INDEX_MARKER));
}

#[tokio::test]
async fn admin_page_requires_session() {
    let app = TestApp::new();
    let response = app.send(get("/admin")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(LOGIN_MARKER));

    let cookie = app.login().await;
    let request = Request::builder()
        .uri("/admin")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert!(body_text(response).await.contains(ADMIN_MARKER));
}

#[tokio::test]
async fn static_assets_are_immutable() {
    let app = TestApp::new();
    let response = app.send(get("/kiosk.js")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=604800, immutable"
    );

    let response = app.send(get("/missing.js")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_is_public() {
    let app = TestApp::new();
    let (status, doc) = app.call(Method::GET, "/api/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/tramites"].is_object());
}
