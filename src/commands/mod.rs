pub mod fields;
pub mod schema;
pub mod sync;

use anyhow::Result;
use trending_sync::notion::NotionClient;
use trending_sync::Config;

/// Notion client built from the `[notion]` and `[network]` sections.
pub(crate) fn notion_client(config: &Config) -> Result<NotionClient> {
    let client = NotionClient::new(
        config.notion_token()?,
        config.network.timeout(),
        config.network.proxy.as_deref(),
    )?;
    Ok(client
        .with_base_url(config.notion.api_url.as_str())
        .with_version(config.notion.version.as_str()))
}
