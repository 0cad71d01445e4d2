use std::net::SocketAddr;

use axum::{Json, Router, http::StatusCode, routing::post};
use base64::Engine;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;

use heightlab::config::{NoiseParams, OffsetSpec};
use heightlab::noise::NoiseAlgorithm;
use heightlab::render;
use heightlab::session::EditorSession;

#[derive(Deserialize)]
struct GenerateRequest {
    seed: Option<u64>,
    width: Option<usize>,
    height: Option<usize>,
    algorithm: Option<NoiseAlgorithm>,
    octaves: Option<u32>,
    persistence: Option<f64>,
    frequency_scale: Option<f64>,
    /// Offset text field: empty/"random" or a number.
    offset: Option<String>,
}

#[derive(Serialize)]
struct GenerateResponse {
    layers: Vec<Layer>,
    timings: Vec<TimingEntry>,
    width: usize,
    height: usize,
    frequency_offset: f64,
}

#[derive(Serialize)]
struct Layer {
    name: String,
    data_url: String,
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

#[derive(Deserialize)]
struct ExportRequest {
    #[serde(flatten)]
    generate: GenerateRequest,
    /// "obj" or "stl".
    format: String,
}

#[derive(Serialize)]
struct ExportResponse {
    filename: String,
    data: String,
    vertices: usize,
    triangles: usize,
}

fn params_from(req: &GenerateRequest) -> NoiseParams {
    let defaults = NoiseParams::default();
    NoiseParams {
        algorithm: req.algorithm.unwrap_or(defaults.algorithm),
        octaves: req.octaves.unwrap_or(defaults.octaves),
        persistence: req.persistence.unwrap_or(defaults.persistence),
        frequency_scale: req.frequency_scale.unwrap_or(defaults.frequency_scale),
        offset: req
            .offset
            .as_deref()
            .map(heightlab::session::offset_from_text)
            .unwrap_or(OffsetSpec::Randomize),
    }
    .clamped()
}

fn generate_session(req: &GenerateRequest) -> EditorSession {
    let seed = req.seed.unwrap_or(42);
    let width = req.width.unwrap_or(512);
    let height = req.height.unwrap_or(512);

    let mut session = EditorSession::new(seed);
    session.create_map(width, height);
    session
}

fn encode_png(rgba: &[u8], w: usize, h: usize) -> String {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    encoder
        .write_image(rgba, w as u32, h as u32, image::ExtendedColorType::Rgba8)
        .expect("PNG encode failed");
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    format!("data:image/png;base64,{}", b64)
}

async fn generate_handler(Json(req): Json<GenerateRequest>) -> Json<GenerateResponse> {
    let response = tokio::task::spawn_blocking(move || {
        let params = params_from(&req);
        let mut session = generate_session(&req);

        let t = std::time::Instant::now();
        session.generate(&params).expect("map exists");
        let generate_ms = t.elapsed().as_secs_f64() * 1000.0;

        let map = session.map().expect("map exists");
        let (width, height) = (map.width(), map.height());

        let t = std::time::Instant::now();
        let layers = vec![
            Layer {
                name: "heightmap".into(),
                data_url: encode_png(&render::render_grayscale(map), width, height),
            },
            Layer {
                name: "shaded".into(),
                data_url: encode_png(&render::render_shaded(map), width, height),
            },
        ];
        let render_ms = t.elapsed().as_secs_f64() * 1000.0;

        GenerateResponse {
            layers,
            timings: vec![
                TimingEntry {
                    name: "generate".into(),
                    ms: generate_ms,
                },
                TimingEntry {
                    name: "render".into(),
                    ms: render_ms,
                },
            ],
            width,
            height,
            frequency_offset: session.noise_offset(),
        }
    })
    .await
    .unwrap();

    Json(response)
}

async fn export_handler(
    Json(req): Json<ExportRequest>,
) -> Result<Json<ExportResponse>, (StatusCode, String)> {
    let format = req.format.to_ascii_lowercase();
    if format != "obj" && format != "stl" {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("unknown export format: {format}"),
        ));
    }

    let response = tokio::task::spawn_blocking(move || {
        let params = params_from(&req.generate);
        let mut session = generate_session(&req.generate);
        session.generate(&params).expect("map exists");

        let mesh = session.mesh().expect("map exists");
        let data = match format.as_str() {
            "obj" => heightlab::mesh::encode_obj(&mesh),
            _ => heightlab::mesh::encode_stl(&mesh),
        };

        ExportResponse {
            filename: format!("terrain.{format}"),
            data,
            vertices: mesh.vertices.len(),
            triangles: mesh.triangle_count(),
        }
    })
    .await
    .unwrap();

    Ok(Json(response))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let frontend = ServeDir::new("frontend");

    let app = Router::new()
        .route("/api/generate", post(generate_handler))
        .route("/api/export", post(export_handler))
        .fallback_service(frontend);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    tracing::info!("heightlab server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
