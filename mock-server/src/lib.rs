use axum::{
    extract::{Path, RawQuery},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    #[serde(rename = "inputVal")]
    pub input_val: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/submit", post(echo_json))
        .route("/form", post(echo_form))
        .route("/query", get(echo_query))
        .route("/headers/{name}", get(echo_header))
        .route("/greeting.xml", get(greeting_xml))
        .route("/missing", get(missing))
        .route("/moved", get(moved))
        .route("/slow", get(slow))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo_json(Json(input): Json<Submission>) -> Json<Submission> {
    Json(input)
}

async fn echo_form(Form(pairs): Form<Vec<(String, String)>>) -> Form<Vec<(String, String)>> {
    Form(pairs)
}

async fn echo_query(RawQuery(query): RawQuery) -> String {
    query.unwrap_or_default()
}

async fn echo_header(Path(name): Path<String>, headers: HeaderMap) -> String {
    headers
        .get_all(name.as_str())
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join(",")
}

async fn greeting_xml() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/xml")],
        "<Greeting><name>world</name></Greeting>",
    )
}

async fn missing() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}

async fn moved() -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [(header::LOCATION, "/submit")],
        "moved",
    )
}

// Stalls long enough that any sane client deadline fires first.
async fn slow() -> &'static str {
    tokio::time::sleep(std::time::Duration::from_secs(60)).await;
    "late"
}
