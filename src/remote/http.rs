//! Reqwest-backed implementations of the capability traits.
//!
//! Both clients speak a JSON wire shape and map HTTP statuses onto the
//! engine's error taxonomy: 401 means the bearer credential is gone
//! (fatal), 403/404 are resource-scoped and recoverable per image.

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::types::{
    AttachmentId, ColumnId, DestinationColumn, ImageDownload, NewRow, RowId, SheetRef, SheetSchema,
    SourceRef,
};
use super::{DestinationClient, SourceClient, TokenProvider};
use crate::classify::{ImageRef, RawCell};
use crate::common::{Error, Result};

/// Default per-call timeout applied to every remote request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

async fn check(response: Response, context: &str) -> Result<Response> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED => Err(Error::AccessRevoked(context.to_string())),
        StatusCode::FORBIDDEN => Err(Error::AccessDenied(context.to_string())),
        StatusCode::NOT_FOUND => Err(Error::NotFound(context.to_string())),
        status => Err(Error::Other(format!("{context}: HTTP {status}"))),
    }
}

fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        _ => "bin",
    }
}

/// HTTP client for the source spreadsheet service.
pub struct HttpSourceClient<T: TokenProvider> {
    http: reqwest::Client,
    tokens: T,
    base_url: String,
    timeout: Duration,
}

impl<T: TokenProvider> HttpSourceClient<T> {
    pub fn new(base_url: impl Into<String>, tokens: T) -> Self {
        HttpSourceClient {
            http: reqwest::Client::new(),
            tokens,
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve the concrete download URL for an image reference: storage
    /// file ids go through the files endpoint, anything else is fetched
    /// directly.
    fn image_url(&self, image: &ImageRef) -> String {
        match &image.source_id {
            Some(id) => format!("{}/v1/files/{id}/content", self.base_url),
            None => image.url.clone(),
        }
    }
}

#[derive(Deserialize)]
struct TabDataBody {
    rows: Vec<Vec<RawCell>>,
}

impl<T: TokenProvider> SourceClient for HttpSourceClient<T> {
    async fn fetch_tab_data(
        &self,
        source: &SourceRef,
        tab: &str,
        start_row: usize,
    ) -> Result<Vec<Vec<RawCell>>> {
        let token = self.tokens.bearer_token().await?;
        let url = format!(
            "{}/v1/spreadsheets/{}/tabs/{tab}/data",
            self.base_url, source.spreadsheet_id
        );
        let response = self
            .http
            .get(&url)
            .query(&[("start_row", start_row)])
            .bearer_auth(token)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    Error::SourceUnreachable(e.to_string())
                } else {
                    Error::Http(e)
                }
            })?;
        let body: TabDataBody = check(response, &format!("fetch tab '{tab}'"))
            .await?
            .json()
            .await?;
        Ok(body.rows)
    }

    async fn download_image(&self, _source: &SourceRef, image: &ImageRef) -> Result<ImageDownload> {
        let token = self.tokens.bearer_token().await?;
        let url = self.image_url(image);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .timeout(self.timeout)
            .send()
            .await?;
        let response = check(response, &format!("download image {url}")).await?;
        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let filename = match &image.source_id {
            Some(id) => format!("{id}.{}", extension_for_mime(&mime_type)),
            None => format!("image.{}", extension_for_mime(&mime_type)),
        };
        let bytes = response.bytes().await?;
        Ok(ImageDownload {
            bytes,
            mime_type,
            filename,
        })
    }

    async fn probe_image(&self, _source: &SourceRef, image: &ImageRef) -> Result<bool> {
        let token = self.tokens.bearer_token().await?;
        let url = self.image_url(image);
        let response = self
            .http
            .head(&url)
            .bearer_auth(token)
            .timeout(self.timeout)
            .send()
            .await?;
        match check(response, &format!("probe image {url}")).await {
            Ok(_) => Ok(true),
            Err(Error::AccessDenied(_) | Error::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// HTTP client for the destination sheet service.
pub struct HttpDestinationClient<T: TokenProvider> {
    http: reqwest::Client,
    tokens: T,
    base_url: String,
    timeout: Duration,
}

impl<T: TokenProvider> HttpDestinationClient<T> {
    pub fn new(base_url: impl Into<String>, tokens: T) -> Self {
        HttpDestinationClient {
            http: reqwest::Client::new(),
            tokens,
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Deserialize)]
struct ColumnsBody {
    columns: Vec<ColumnBody>,
}

#[derive(Deserialize)]
struct ColumnBody {
    id: u64,
    title: String,
    #[serde(rename = "type")]
    column_type: String,
}

#[derive(Serialize)]
struct InsertRowsBody<'a> {
    rows: &'a [NewRow],
}

#[derive(Deserialize)]
struct InsertRowsResponse {
    row_ids: Vec<u64>,
}

#[derive(Deserialize)]
struct AttachmentResponse {
    attachment_id: String,
}

#[derive(Serialize)]
struct HyperlinkBody<'a> {
    url: &'a str,
}

impl<T: TokenProvider> DestinationClient for HttpDestinationClient<T> {
    async fn fetch_schema(&self, destination: &SheetRef) -> Result<SheetSchema> {
        let token = self.tokens.bearer_token().await?;
        let url = format!("{}/v1/sheets/{}/columns", self.base_url, destination.sheet_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .timeout(self.timeout)
            .send()
            .await?;
        let body: ColumnsBody = check(response, "fetch destination schema")
            .await?
            .json()
            .await?;
        Ok(SheetSchema {
            columns: body
                .columns
                .into_iter()
                .map(|c| DestinationColumn {
                    id: ColumnId(c.id),
                    title: c.title,
                    column_type: c.column_type,
                })
                .collect(),
        })
    }

    async fn insert_rows(&self, destination: &SheetRef, rows: &[NewRow]) -> Result<Vec<RowId>> {
        let token = self.tokens.bearer_token().await?;
        let url = format!("{}/v1/sheets/{}/rows", self.base_url, destination.sheet_id);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .timeout(self.timeout)
            .json(&InsertRowsBody { rows })
            .send()
            .await?;
        let body: InsertRowsResponse = check(response, "insert rows").await?.json().await?;
        Ok(body.row_ids.into_iter().map(RowId).collect())
    }

    async fn attach_image_to_cell(
        &self,
        destination: &SheetRef,
        row: RowId,
        column: ColumnId,
        image: &ImageDownload,
    ) -> Result<AttachmentId> {
        let token = self.tokens.bearer_token().await?;
        let url = format!(
            "{}/v1/sheets/{}/rows/{}/columns/{}/attachment",
            self.base_url, destination.sheet_id, row.0, column.0
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .timeout(self.timeout)
            .query(&[("filename", image.filename.as_str())])
            .header(reqwest::header::CONTENT_TYPE, image.mime_type.clone())
            .body(image.bytes.clone())
            .send()
            .await?;
        let body: AttachmentResponse = check(response, "attach image").await?.json().await?;
        Ok(AttachmentId(body.attachment_id))
    }

    async fn update_cell_as_hyperlink(
        &self,
        destination: &SheetRef,
        row: RowId,
        column: ColumnId,
        url: &str,
    ) -> Result<()> {
        let token = self.tokens.bearer_token().await?;
        let endpoint = format!(
            "{}/v1/sheets/{}/rows/{}/columns/{}/link",
            self.base_url, destination.sheet_id, row.0, column.0
        );
        let response = self
            .http
            .put(&endpoint)
            .bearer_auth(token)
            .timeout(self.timeout)
            .json(&HyperlinkBody { url })
            .send()
            .await?;
        check(response, "update cell hyperlink").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_extension() {
        assert_eq!(extension_for_mime("image/png"), "png");
        assert_eq!(extension_for_mime("image/jpeg"), "jpg");
        assert_eq!(extension_for_mime("text/html"), "bin");
    }
}
