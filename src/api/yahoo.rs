// ============================================================================
// Client Yahoo Finance
// ============================================================================
// (symbole, IntervalRequest) -> Series prête pour le moteur
//
// Étapes :
// 1. URL chart Yahoo : interval = granularité, range = profondeur d'historique
// 2. Désérialisation JSON dans des DTO explicites (serde)
// 3. Coercition : prix absents -> 0 (placeholders éliminés à la normalisation)
// 4. Normalisation (filtre + tri), puis fenêtre de la requête
//
// CONCEPTS RUST :
// 1. async/await : le réseau ne bloque que le thread worker
// 2. anyhow::Context : chaque étape qui peut échouer dit laquelle a échoué
// 3. #[instrument] : span tracing avec symbole et requête
// ============================================================================

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::models::{Bar, IntervalRequest, Series};

/// Endpoint chart v8 de Yahoo Finance
pub const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

// ============================================================================
// DTO de la réponse Yahoo
// ============================================================================
// Seuls les champs utilisés sont déclarés : serde ignore le reste.
// Toutes les séries de prix sont Option<Vec<Option<f64>>> car Yahoo renvoie
// des null au milieu des tableaux (barres sans cotation).
// ============================================================================

#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Meta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Meta {
    symbol: String,
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

// ============================================================================
// API publique
// ============================================================================

/// Crée le client HTTP (un par worker, réutilisé pour toutes les requêtes)
pub fn build_client(user_agent: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .build()
        .context("Échec de la création du client HTTP")
}

/// Récupère la série d'un symbole pour une requête
///
/// # Exemple
/// let client = build_client(DEFAULT_USER_AGENT)?;
/// let series = fetch_series(&client, "^GSPC", request).await?;
#[instrument(skip(client), fields(scale = request.scale.label(), start = request.start, end_fix = request.end_fix))]
pub async fn fetch_series(client: &reqwest::Client, symbol: &str, request: IntervalRequest) -> Result<Series> {
    let url = build_yahoo_url(YAHOO_CHART_URL, symbol, request);
    fetch_series_at(client, &url, request).await
}

/// Récupère et convertit la réponse d'une URL chart déjà construite
pub async fn fetch_series_at(client: &reqwest::Client, url: &str, request: IntervalRequest) -> Result<Series> {
    debug!(url = %url, "Sending HTTP request to Yahoo Finance");
    let response = client
        .get(url)
        .send()
        .await
        .context("Échec de la requête HTTP vers Yahoo Finance")?;

    let status = response.status();
    debug!(status = %status, "Received HTTP response");

    if !status.is_success() {
        error!(status = %status, "Yahoo Finance returned error status");
        anyhow::bail!("Yahoo Finance a retourné une erreur : HTTP {}", status);
    }

    let body = response
        .text()
        .await
        .context("Échec de la lecture de la réponse Yahoo")?;

    let series = series_from_json(&body, request)?;
    info!(bars = series.len(), "Successfully fetched series");
    Ok(series)
}

/// Construit l'URL chart pour un symbole et une requête
///
/// Le `^` des indices est encodé (%5E) ; `range` dépend de la granularité.
pub fn build_yahoo_url(base: &str, symbol: &str, request: IntervalRequest) -> String {
    format!(
        "{}/{}?interval={}&range={}",
        base.trim_end_matches('/'),
        symbol.replace('^', "%5E"),
        request.scale.to_yahoo_string(),
        request.scale.yahoo_range()
    )
}

/// Convertit un corps JSON Yahoo en série fenêtrée
pub fn series_from_json(body: &str, request: IntervalRequest) -> Result<Series> {
    let response: YahooResponse =
        serde_json::from_str(body).context("Échec du parsing JSON de la réponse Yahoo")?;

    let raw = raw_bars(response)?;
    let total = raw.len();
    let series = Series::normalize(raw);

    if series.len() < total {
        warn!(dropped = total - series.len(), total, "Dropped bars with missing prices");
    }

    let windowed = request.window(series.bars());
    debug!(normalized = series.len(), windowed = windowed.len(), "Applied request window");

    // La fenêtre d'une série triée reste triée et valide
    Ok(Series::normalize(windowed.iter().copied()))
}

/// Extrait les barres brutes (non filtrées) de la réponse
///
/// Les prix absents deviennent 0 : Bar::is_valid les rejettera.
fn raw_bars(response: YahooResponse) -> Result<Vec<Bar>> {
    if let Some(err) = response.chart.error {
        let code = err.code.unwrap_or_default();
        let description = err.description.unwrap_or_default();
        error!(%code, %description, "Yahoo Finance returned a chart error");
        anyhow::bail!("Yahoo Finance : {} ({})", description, code);
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .context("Aucune donnée retournée par Yahoo Finance")?;

    debug!(symbol = %result.meta.symbol, price = ?result.meta.regular_market_price, "Parsing chart result");

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    // CONCEPT RUST : closure qui capture par référence
    let price = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten().unwrap_or(0.0);

    Ok(timestamps
        .iter()
        .enumerate()
        .map(|(i, &timestamp)| {
            Bar::new(
                timestamp,
                price(&opens, i),
                price(&highs, i),
                price(&lows, i),
                price(&closes, i),
                volumes.get(i).copied().flatten().unwrap_or(0),
            )
        })
        .collect())
}

// ============================================================================
// Tests unitaires
// ============================================================================
