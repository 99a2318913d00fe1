//! Run with: cargo run --bin smoke -- [path/to/audio.wav]
//!
//! Talks to a running proxy (PROXY_URL, default http://localhost:5000) and
//! reports round-trip latency for /healthz, /chat and optionally /transcribe.

use anyhow::{bail, Context};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Instant;

struct Proxy {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl Proxy {
    fn post(&self, path: &str) -> RequestBuilder {
        let request = self.client.post(format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => request.header("X-App-Token", token),
            None => request,
        }
    }
}

async fn check_health(proxy: &Proxy) -> anyhow::Result<()> {
    let body: Value = proxy
        .client
        .get(format!("{}/healthz", proxy.base_url))
        .send()
        .await?
        .json()
        .await?;

    println!("Health: {}", body);

    if body["upstream_configured"] != json!(true) {
        println!("⚠️  Upstream credential is not configured on the server.");
    }
    Ok(())
}

async fn check_chat(proxy: &Proxy) -> anyhow::Result<()> {
    let start = Instant::now();

    let response = proxy
        .post("/chat")
        .json(&json!({ "message": "Say hello in one short sentence." }))
        .send()
        .await
        .context("Chat request failed")?;

    let status = response.status();
    let body: Value = response.json().await?;
    let elapsed = start.elapsed().as_millis();

    if !status.is_success() {
        bail!("Chat returned {}: {}", status, body);
    }

    println!("⏱️  /chat: {}ms ({})", elapsed, body["model"]);
    println!("📝 {}\n", body["reply"].as_str().unwrap_or_default());
    Ok(())
}

async fn check_transcribe(proxy: &Proxy, path: &Path) -> anyhow::Result<()> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "audio.wav".to_string());

    let form = Form::new().part("file", Part::bytes(data).file_name(file_name));

    let start = Instant::now();
    let response = proxy
        .post("/transcribe")
        .multipart(form)
        .send()
        .await
        .context("Transcribe request failed")?;

    let status = response.status();
    let body: Value = response.json().await?;
    let elapsed = start.elapsed().as_millis();

    if !status.is_success() {
        bail!("Transcribe returned {}: {}", status, body);
    }

    println!("⏱️  /transcribe: {}ms", elapsed);
    println!("📝 {}\n", body["text"].as_str().unwrap_or_default());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let proxy = Proxy {
        client: Client::new(),
        base_url: std::env::var("PROXY_URL")
            .unwrap_or_else(|_| "http://localhost:5000".to_string())
            .trim_end_matches('/')
            .to_string(),
        token: std::env::var("APP_TOKEN").ok().filter(|t| !t.is_empty()),
    };

    println!("\n🧪 Smoke testing {}\n", proxy.base_url);

    check_health(&proxy).await?;
    check_chat(&proxy).await?;

    if let Some(audio) = std::env::args().nth(1) {
        check_transcribe(&proxy, Path::new(&audio)).await?;
    }

    println!("{:-<60}", "");
    println!("✅ Proxy responded to every check.");
    Ok(())
}
