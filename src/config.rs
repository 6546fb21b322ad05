use crate::mapping::{CustomFieldCodes, LeadMapping, MappingSettings};

#[derive(Debug, Clone)]
pub struct Config {
    pub bitrix_webhook_url: String,
    pub port: u16,
    pub lead_mapping: LeadMapping,
    pub mapping_settings: MappingSettings,
}

impl Config {
    /// Loads configuration from `.env` (if present) and the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Fails if `BITRIX_WEBHOOK_URL` is missing or malformed, so the server
    /// never binds without a destination for leads.
    pub fn from_vars<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CustomFieldCodes::default();

        let config = Self {
            bitrix_webhook_url: lookup("BITRIX_WEBHOOK_URL")
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "BITRIX_WEBHOOK_URL is not set. Please check your environment variables."
                    )
                })
                .and_then(|url| {
                    let url = url.trim().to_string();
                    if url.is_empty() {
                        anyhow::bail!("BITRIX_WEBHOOK_URL cannot be empty");
                    }
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("BITRIX_WEBHOOK_URL must start with http:// or https://");
                    }
                    url::Url::parse(&url).map_err(|e| {
                        anyhow::anyhow!("BITRIX_WEBHOOK_URL is not a valid URL: {}", e)
                    })?;
                    Ok(url)
                })?,
            port: lookup("PORT")
                .unwrap_or_else(|| "5000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            lead_mapping: lookup("LEAD_MAPPING")
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.parse::<LeadMapping>())
                .transpose()?
                .unwrap_or_default(),
            mapping_settings: MappingSettings {
                source_id: lookup("BITRIX_SOURCE_ID")
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| MappingSettings::DEFAULT_SOURCE_ID.to_string()),
                custom_fields: CustomFieldCodes {
                    nationality: custom_field_code(
                        &lookup,
                        "BITRIX_FIELD_NATIONALITY",
                        defaults.nationality,
                    )?,
                    tenure: custom_field_code(&lookup, "BITRIX_FIELD_TENURE", defaults.tenure)?,
                    lead_type: custom_field_code(
                        &lookup,
                        "BITRIX_FIELD_TYPE",
                        defaults.lead_type,
                    )?,
                },
            },
        };

        let codes = &config.mapping_settings.custom_fields;
        if codes.nationality == codes.tenure
            || codes.nationality == codes.lead_type
            || codes.tenure == codes.lead_type
        {
            anyhow::bail!(
                "BITRIX_FIELD_NATIONALITY, BITRIX_FIELD_TENURE and BITRIX_FIELD_TYPE must be distinct, got '{}', '{}', '{}'",
                codes.nationality,
                codes.tenure,
                codes.lead_type
            );
        }

        // Log successful configuration load (host only, the webhook path carries the secret)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Bitrix webhook host: {}",
            url::Url::parse(&config.bitrix_webhook_url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_default()
        );
        tracing::debug!("Lead mapping profile: {}", config.lead_mapping);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

fn custom_field_code<F>(lookup: &F, key: &str, default: String) -> anyhow::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|s| s.trim().to_string()) {
        None => Ok(default),
        Some(code) if code.is_empty() => Ok(default),
        Some(code) if code.starts_with("UF_CRM_") => Ok(code),
        Some(code) => anyhow::bail!(
            "{} must be a Bitrix custom field code (UF_CRM_...), got '{}'",
            key,
            code
        ),
    }
}
