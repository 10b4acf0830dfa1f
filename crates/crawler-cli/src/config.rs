use crawler_types::{SiteConfigMap, SiteConfig};
use std::collections::HashMap;
use std::path::Path;

/// Top-level app config file: site map plus deployment settings not tied
/// to any one site.
#[derive(Debug, serde::Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sites: HashMap<String, SiteConfig>,
    pub database_url: String,
    pub s3_bucket: String,
    #[serde(default)]
    pub s3_endpoint: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    "crawler/0.1".to_string()
}

pub fn load(path: &Path) -> anyhow::Result<AppConfig> {
    let raw = std::fs::read_to_string(path).map_err(|err| anyhow::anyhow!("failed to read config {}: {err}", path.display()))?;
    let mut config: AppConfig = serde_yaml::from_str(&raw)?;
    config.sites = normalize_sites(config.sites);
    Ok(config)
}

fn normalize_sites(sites: SiteConfigMap) -> SiteConfigMap {
    crawler_types::normalize(sites)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yaml_and_fills_blank_source_name_from_key() {
        let yaml = r#"
database_url: "postgres://localhost/crawler"
s3_bucket: "content"
sites:
  bbc:
    feed_url: "https://bbc.com/feed.xml"
    cron: "*/5 * * * *"
"#;
        let mut config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        config.sites = normalize_sites(config.sites);

        assert_eq!(config.user_agent, "crawler/0.1");
        let bbc = config.sites.get("bbc").unwrap();
        assert_eq!(bbc.source_name, "bbc");
        assert_eq!(bbc.spider, "rss");
        assert_eq!(bbc.concurrency, 2);
    }
}
