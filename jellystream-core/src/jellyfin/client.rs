//! Narrow Jellyfin HTTP client (component A). Only the calls the schedule
//! generator, pool builder, and stream proxy actually need.

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::MediaServerConfig;
use crate::error::{Error, Result};

use super::types::{JellyfinItem, JellyfinItemsPage, JellyfinLibrariesResponse, JellyfinLibrary, JellyfinUser};

const PAGE_SIZE: i64 = 500;
const ITEM_FIELDS: &str = "RunTimeTicks,Genres,SeriesName,ParentIndexNumber,IndexNumber,Path,MediaSources";

pub struct JellyfinClient {
    base_url: String,
    api_key: String,
    configured_user_id: String,
    user_id: OnceCell<String>,
    client_name: String,
    device_name: String,
    device_id: String,
    version: String,
    http: reqwest::Client,
}

impl JellyfinClient {
    #[must_use]
    pub fn new(config: &MediaServerConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            configured_user_id: config.user_id.clone(),
            user_id: OnceCell::new(),
            client_name: "JellyStream".to_string(),
            device_name: "JellyStream Server".to_string(),
            device_id: uuid::Uuid::new_v4().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// `Authorization: MediaBrowser Token="...", Client="...", Device="...",
    /// DeviceId="...", Version="..."` per the original integration.
    fn auth_header(&self) -> String {
        format!(
            "MediaBrowser Token=\"{}\", Client=\"{}\", Device=\"{}\", DeviceId=\"{}\", Version=\"{}\"",
            self.api_key, self.client_name, self.device_name, self.device_id, self.version
        )
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
    }

    pub async fn get_users(&self) -> Result<Vec<JellyfinUser>> {
        debug!("jellyfin get_users");
        let users: Vec<JellyfinUser> = self
            .request(reqwest::Method::GET, "/Users")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(users)
    }

    /// Auto-discover and memoize the user id for the client's lifetime if
    /// none was configured (spec §6 `MEDIA_SERVER_USER_ID`).
    pub async fn ensure_user_id(&self) -> Result<String> {
        if !self.configured_user_id.is_empty() {
            return Ok(self.configured_user_id.clone());
        }
        self.user_id
            .get_or_try_init(|| async {
                let users = self.get_users().await?;
                let first = users.into_iter().next().ok_or_else(|| {
                    Error::ExternalServer("no users found on Jellyfin server".to_string())
                })?;
                info!(user_id = %first.id, "auto-detected Jellyfin user");
                Ok(first.id)
            })
            .await
            .cloned()
    }

    pub async fn get_libraries(&self) -> Result<Vec<JellyfinLibrary>> {
        let user_id = self.ensure_user_id().await?;
        let resp: JellyfinLibrariesResponse = self
            .request(reqwest::Method::GET, &format!("/Users/{user_id}/Views"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp.items)
    }

    /// One page of `/Users/{id}/Items`.
    #[allow(clippy::too_many_arguments)]
    async fn query_items_page(
        &self,
        parent_id: &str,
        recursive: bool,
        include_item_types: &str,
        genres: &[String],
        start_index: i64,
        limit: i64,
    ) -> Result<JellyfinItemsPage> {
        let user_id = self.ensure_user_id().await?;
        let mut req = self
            .request(reqwest::Method::GET, &format!("/Users/{user_id}/Items"))
            .query(&[
                ("ParentId", parent_id),
                ("Recursive", if recursive { "true" } else { "false" }),
                ("IncludeItemTypes", include_item_types),
                ("Fields", ITEM_FIELDS),
                ("StartIndex", &start_index.to_string()),
                ("Limit", &limit.to_string()),
                ("SortBy", "SortName"),
                ("SortOrder", "Ascending"),
            ]);
        if !genres.is_empty() {
            req = req.query(&[("Genres", genres.join(","))]);
        }
        let page: JellyfinItemsPage = req.send().await?.error_for_status()?.json().await?;
        Ok(page)
    }

    /// Page through `/Users/{id}/Items` in fixed-size batches until
    /// `TotalRecordCount` is reached (spec §4.2 step 1).
    pub async fn get_all_items(
        &self,
        parent_id: &str,
        recursive: bool,
        include_item_types: &str,
        genres: &[String],
    ) -> Result<Vec<JellyfinItem>> {
        let mut out = Vec::new();
        let mut start_index = 0i64;
        loop {
            let page = self
                .query_items_page(parent_id, recursive, include_item_types, genres, start_index, PAGE_SIZE)
                .await?;
            let got = page.items.len() as i64;
            out.extend(page.items);
            start_index += got;
            if got == 0 || start_index >= page.total_record_count {
                break;
            }
        }
        Ok(out)
    }

    pub async fn get_item_info(&self, item_id: &str) -> Result<JellyfinItem> {
        let user_id = self.ensure_user_id().await?;
        let item: JellyfinItem = self
            .request(reqwest::Method::GET, &format!("/Users/{user_id}/Items/{item_id}"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(item)
    }

    /// Direct-stream URL supporting HTTP Range seeks (spec §4.6 step 2).
    #[must_use]
    pub fn direct_stream_url(&self, item_id: &str) -> String {
        format!("{}/Videos/{}/stream?api_key={}", self.base_url, item_id, self.api_key)
    }

    pub async fn register_tuner_host(&self, url: &str, friendly_name: &str) -> Result<serde_json::Value> {
        let payload = serde_json::json!({
            "Url": url,
            "Type": "m3u",
            "FriendlyName": friendly_name,
            "Source": "JellyStream",
            "EnableStreamLooping": true,
            "AllowHWTranscoding": false,
            "AllowStreamSharing": true,
            "ImportFavoritesOnly": false,
        });
        let resp: serde_json::Value = self
            .request(reqwest::Method::POST, "/LiveTv/TunerHosts")
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        info!(id = ?resp.get("Id"), "registered Jellyfin tuner host");
        Ok(resp)
    }

    pub async fn unregister_tuner_host(&self, tuner_host_id: &str) -> Result<bool> {
        let resp = self
            .request(reqwest::Method::DELETE, "/LiveTv/TunerHosts")
            .query(&[("id", tuner_host_id)])
            .send()
            .await?;
        let success = resp.status() == reqwest::StatusCode::NO_CONTENT;
        if !success {
            warn!(status = %resp.status(), "unregister_tuner_host did not return 204");
        }
        Ok(success)
    }

    pub async fn register_listing_provider(&self, xmltv_url: &str, friendly_name: &str) -> Result<serde_json::Value> {
        let payload = serde_json::json!({
            "Type": "xmltv",
            "Path": xmltv_url,
            "ListingsId": friendly_name,
        });
        let resp: serde_json::Value = self
            .request(reqwest::Method::POST, "/LiveTv/ListingProviders")
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        info!(id = ?resp.get("Id"), "registered Jellyfin listing provider");
        Ok(resp)
    }

    pub async fn unregister_listing_provider(&self, provider_id: &str) -> Result<bool> {
        let resp = self
            .request(reqwest::Method::DELETE, "/LiveTv/ListingProviders")
            .query(&[("id", provider_id)])
            .send()
            .await?;
        Ok(resp.status() == reqwest::StatusCode::NO_CONTENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(base_url: String) -> JellyfinClient {
        JellyfinClient::new(&MediaServerConfig {
            url: base_url,
            api_key: "testkey".to_string(),
            user_id: String::new(),
        })
    }

    #[tokio::test]
    async fn ensure_user_id_auto_discovers_first_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"Id": "user-1", "Name": "admin"}
            ])))
            .mount(&server)
            .await;

        let client = client_for(server.uri());
        let user_id = client.ensure_user_id().await.unwrap();
        assert_eq!(user_id, "user-1");

        // second call is memoized, no new request needed to succeed again
        let user_id_again = client.ensure_user_id().await.unwrap();
        assert_eq!(user_id_again, "user-1");
    }

    #[tokio::test]
    async fn get_all_items_pages_until_total_reached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"Id": "user-1", "Name": "admin"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Users/user-1/Items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Items": [{"Id": "a", "Name": "A", "Type": "Movie", "RunTimeTicks": 36_000_000_000i64}],
                "TotalRecordCount": 1,
            })))
            .mount(&server)
            .await;

        let client = client_for(server.uri());
        let items = client.get_all_items("lib-1", true, "Movie,Episode", &[]).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "a");
    }

    #[test]
    fn direct_stream_url_includes_api_key() {
        let client = client_for("http://jf.local".to_string());
        let url = client.direct_stream_url("item-42");
        assert_eq!(url, "http://jf.local/Videos/item-42/stream?api_key=testkey");
    }
}
