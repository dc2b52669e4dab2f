// Shared test helpers: an in-process identity federation served by axum.
//
// The routes mimic a SAML service provider, its identity provider and the
// Azure AD realm discovery endpoints closely enough to drive every resolver
// kind over real HTTP.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Form, Path, Query},
    http::{
        header::{COOKIE, HOST, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;

use sso_probe::fetch::ProbeContext;
use sso_probe::initialization::init_probe_context;
use sso_probe::Config;

/// A running test federation.
pub struct TestServer {
    pub base: String,
    /// Requests served by `/count`
    pub hits: Arc<AtomicUsize>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// A fresh context with default settings, as one sequence run would get.
pub fn probe_context() -> ProbeContext {
    init_probe_context(&Config::default()).expect("Failed to build probe context")
}

/// Returns a base URL nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get address");
    drop(listener);
    format!("http://{}", addr)
}

fn host(headers: &HeaderMap) -> String {
    headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("127.0.0.1")
        .to_string()
}

fn cookie_names(headers: &HeaderMap) -> Vec<String> {
    let mut names: Vec<String> = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|c| c.trim().split('=').next())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    names.sort();
    names
}

fn has_cookie(headers: &HeaderMap, name: &str) -> bool {
    cookie_names(headers).iter().any(|n| n == name)
}

async fn sp_secure() -> Response {
    (
        [(SET_COOKIE, "sp_session=s1; Path=/")],
        Redirect::temporary("/idp/login"),
    )
        .into_response()
}

async fn idp_login() -> Response {
    (
        [(SET_COOKIE, "idp_session=i1; Path=/")],
        Html(
            r#"<html><body>
<form action="/idp/auth" method="post">
<input type="hidden" name="execution" value="e1s1"/>
<input type="text" name="j_username"/>
</form>
</body></html>"#,
        ),
    )
        .into_response()
}

async fn idp_auth(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Response {
    let logged_in = has_cookie(&headers, "idp_session")
        && form.get("execution").map(String::as_str) == Some("e1s1")
        && form.get("j_username").map(String::as_str) == Some("probe");
    if !logged_in {
        return (StatusCode::UNAUTHORIZED, "Login failed").into_response();
    }
    let action = format!("http://{}/sp/acs", host(&headers))
        .replace(':', "&#x3a;")
        .replace('/', "&#x2f;");
    Html(format!(
        r#"<html><body onload="document.forms[0].submit()">
<form action="{action}" method="post">
<input type="hidden" name="RelayState" value="cookie&#x3a;1"/>
<input type="hidden" name="SAMLResponse" value="PHNhbWw&#x2b;&amp;x"/>
</form>
</body></html>"#
    ))
    .into_response()
}

async fn sp_acs(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Response {
    let valid = has_cookie(&headers, "sp_session")
        && form.get("SAMLResponse").map(String::as_str) == Some("PHNhbWw+&x")
        && form.get("RelayState").map(String::as_str) == Some("cookie:1");
    if !valid {
        return (StatusCode::FORBIDDEN, "Invalid assertion").into_response();
    }
    Redirect::to("/sp/home").into_response()
}

async fn sp_home(headers: HeaderMap) -> Response {
    if has_cookie(&headers, "sp_session") {
        "Welcome probe".into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "No session").into_response()
    }
}

async fn chain(Path(hops): Path<u32>, headers: HeaderMap) -> Response {
    if hops > 0 {
        (
            [(SET_COOKIE, format!("hop{hops}=1; Path=/"))],
            Redirect::temporary(&format!("/chain/{}", hops - 1)),
        )
            .into_response()
    } else {
        format!("cookies: {}", cookie_names(&headers).join(",")).into_response()
    }
}

async fn azure_home_realm(headers: HeaderMap) -> String {
    format!(
        r#"{{"NameSpaceType":"Federated","AuthURL":"http://{}/idp/login"}}"#,
        host(&headers)
    )
}

async fn azure_login() -> Html<&'static str> {
    Html(r#"<form><input type="hidden" name="ctx" value="rQIIAbc"/></form>"#)
}

async fn azure_userrealm(
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if query.get("stsRequest").map(String::as_str) != Some("rQIIAbc")
        || query.get("api-version").map(String::as_str) != Some("2.1")
    {
        return (StatusCode::BAD_REQUEST, "bad realm query").into_response();
    }
    azure_home_realm(headers).await.into_response()
}

/// Starts the federation on an ephemeral port and returns its handle.
pub async fn start_federation_server() -> TestServer {
    let hits = Arc::new(AtomicUsize::new(0));

    let app = Router::new()
        .route("/sp/secure", get(sp_secure))
        .route("/sp/acs", post(sp_acs))
        .route("/sp/home", get(sp_home))
        .route("/idp/login", get(idp_login))
        .route("/idp/auth", post(idp_auth))
        .route("/chain/{hops}", get(chain))
        .route("/loop", get(|| async { Redirect::temporary("/loop") }))
        .route("/azure/realm", get(azure_home_realm))
        .route(
            "/azure/managed",
            get(|| async { r#"{"NameSpaceType":"Managed"}"# }),
        )
        .route("/azure/login", get(azure_login))
        .route("/azure/userrealm/", get(azure_userrealm))
        .route(
            "/form",
            get(|| async {
                Html(r#"<form action="/a"><input name="p" value="v"></form>"#)
            }),
        )
        .route("/search", get(|| async { r#"<a key="/x">next</a>"# }))
        .route("/empty", get(|| async { "" }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(60)).await;
                "slow"
            }),
        )
        .route(
            "/hang",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                "too late"
            }),
        )
        .route(
            "/count",
            get({
                let hits = Arc::clone(&hits);
                move || async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    "ok"
                }
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get address");
    let base = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Server failed to start");
    });

    // Give server time to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    TestServer { base, hits }
}
