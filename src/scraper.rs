use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{info, warn};

/// A website publishing FISPQ sheets as linked PDFs.
pub struct Source {
    pub name: &'static str,
    pub index_url: &'static str,
}

pub const SOURCES: &[Source] = &[
    Source {
        name: "cipa",
        index_url: "https://sites.usp.br/cipa-ffclrp/fispq/",
    },
    Source {
        name: "labsynth",
        index_url: "https://www.labsynth.com.br/fispq/",
    },
];

#[derive(Debug)]
pub struct PdfLink {
    pub url: String,
    pub file_name: String,
}

static HREF_PDF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)href\s*=\s*["']([^"']+\.pdf)["']"#).unwrap());
static SANITIZE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w.\-]+").unwrap());

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: u32 = 2;
const BASE_BACKOFF_MS: u64 = 2000;

pub fn client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent("Mozilla/5.0 (X11; Linux x86_64) fispq_scraper/0.1")
        .build()
        .context("failed to build HTTP client")
}

/// Fetches a source's index page and returns its PDF links, deduplicated, in
/// page order, with sanitized local file names.
pub async fn discover_links(client: &reqwest::Client, source: &Source) -> Result<Vec<PdfLink>> {
    info!("Fetching index page: {}", source.index_url);
    let body = client
        .get(source.index_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
        .with_context(|| format!("failed to fetch index page for {}", source.name))?;

    let links = extract_pdf_links(source, &body);
    info!("{}: {} PDF links found", source.name, links.len());
    Ok(links)
}

fn extract_pdf_links(source: &Source, body: &str) -> Vec<PdfLink> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for caps in HREF_PDF_RE.captures_iter(body) {
        let url = resolve_url(source.index_url, &caps[1]);
        if !seen.insert(url.clone()) {
            continue;
        }
        let file_name = link_file_name(source.name, links.len() + 1, &url);
        links.push(PdfLink { url, file_name });
    }
    links
}

/// Resolves an href against the index page URL without pulling in a full URL
/// parser; the sources only use absolute, root-relative, and relative links.
fn resolve_url(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{rest}");
    }
    if href.starts_with('/') {
        let origin_end = base
            .find("://")
            .and_then(|i| base[i + 3..].find('/').map(|j| i + 3 + j))
            .unwrap_or(base.len());
        return format!("{}{}", &base[..origin_end], href);
    }
    match base.rfind('/') {
        Some(i) => format!("{}{}", &base[..i + 1], href),
        None => format!("{base}/{href}"),
    }
}

fn link_file_name(source: &str, index: usize, url: &str) -> String {
    let stem = url
        .rsplit('/')
        .next()
        .unwrap_or("")
        .trim_end_matches(".pdf")
        .trim_end_matches(".PDF");
    let safe = SANITIZE_RE.replace_all(stem, "_");
    let safe: String = safe.chars().take(40).collect();
    let safe = safe.trim_matches('_');
    if safe.is_empty() {
        format!("{source}_{index:03}.pdf")
    } else {
        format!("{source}_{index:03}_{safe}.pdf")
    }
}

/// Downloads one PDF, retrying transient failures with exponential backoff.
pub async fn download_with_retry(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    let mut attempt = 0;
    loop {
        match download_once(client, url).await {
            Ok(bytes) => return Ok(bytes),
            Err(e) if attempt < MAX_RETRIES => {
                let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
                warn!(
                    "Download failed for {} (attempt {}/{}): {}. Backing off {:.1}s",
                    url,
                    attempt + 1,
                    MAX_RETRIES,
                    e,
                    backoff.as_secs_f64()
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn download_once(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request failed for {url}"))?
        .error_for_status()
        .with_context(|| format!("bad status for {url}"))?;
    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("failed to read body of {url}"))?;
    Ok(bytes.to_vec())
}

// ── Tests ──
