/// Enrichment level applied to each submission before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enrichment {
    /// Store the raw submission only.
    None,
    /// One AI call: summary + image prompt, no image generation.
    Summarize,
    /// Summary plus a generated illustration.
    SummarizeAndImage,
}

impl Enrichment {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Enrichment::None),
            "summarize" => Some(Enrichment::Summarize),
            "image" => Some(Enrichment::SummarizeAndImage),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub google_credentials_json: String,
    pub spreadsheet_id: String,
    pub sheet_range: String,
    pub openai_api_key: String,
    pub enrichment: Enrichment,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok();

        let google_credentials_json = std::env::var("GOOGLE_APPLICATION_CREDENTIALS_JSON")
            .map_err(|_| "GOOGLE_APPLICATION_CREDENTIALS_JSON must be set")?;

        let spreadsheet_id =
            std::env::var("SPREADSHEET_ID").map_err(|_| "SPREADSHEET_ID must be set")?;

        let sheet_range = std::env::var("SHEET_RANGE").unwrap_or_else(|_| "Sheet1".to_string());

        // No startup check: a missing key surfaces as an auth failure on the
        // first AI call, and the `none` mode never touches it.
        let openai_api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();

        let enrichment = match std::env::var("ENRICHMENT") {
            Ok(raw) => Enrichment::parse(&raw).ok_or_else(|| {
                format!("ENRICHMENT must be none, summarize or image (got {raw:?})")
            })?,
            Err(_) => Enrichment::SummarizeAndImage,
        };

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5001".to_string())
            .parse()
            .unwrap_or(5001);

        Ok(Self {
            google_credentials_json,
            spreadsheet_id,
            sheet_range,
            openai_api_key,
            enrichment,
            host,
            port,
        })
    }
}
