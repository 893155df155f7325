//! Upload API actions.
//!
//! Sources at or below the configured chunk size are sent in one multipart
//! POST. Larger local sources are split into chunks that share one upload
//! id and one set of signed parameters; the API stitches them together and
//! answers the last chunk with the final result.

use cld_models::{
    AssetType, AssetTypeProvider, DestroyParams, DestroyResult, UploadParams, UploadResult,
};
use cld_signing::{form_pairs, sign_request, unix_now, ArrayStyle, Params};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::chunk::{plan_chunks, upload_session_id};
use crate::client::CloudinaryClient;
use crate::error::{ClientError, ClientResult};
use crate::metrics::record_chunk;
use crate::source::FileSource;

const CONTENT_RANGE: &str = "Content-Range";
const UNIQUE_UPLOAD_ID: &str = "X-Unique-Upload-Id";

impl CloudinaryClient {
    /// Upload `source`, chunking local content larger than `chunk_size`.
    pub async fn upload(
        &self,
        source: impl Into<FileSource>,
        params: &UploadParams,
    ) -> ClientResult<UploadResult> {
        self.upload_inner(source.into(), params, false).await
    }

    /// Upload `source` through the chunked protocol even when it fits in one
    /// chunk. Remote sources are uploaded directly.
    pub async fn upload_large(
        &self,
        source: impl Into<FileSource>,
        params: &UploadParams,
    ) -> ClientResult<UploadResult> {
        self.upload_inner(source.into(), params, true).await
    }

    /// Delete an asset.
    pub async fn destroy(&self, params: &DestroyParams) -> ClientResult<DestroyResult> {
        self.call_upload_api(
            "destroy",
            params.asset_type(),
            params.to_params(),
            ArrayStyle::Comma,
        )
        .await
    }

    /// Call any Upload API action with signed form parameters.
    ///
    /// List values are signed and sent in `style`; endpoints that expect
    /// `key[0]=..&key[1]=..` take [`ArrayStyle::Indexed`].
    pub async fn call_upload_api<T: DeserializeOwned>(
        &self,
        action: &str,
        asset_type: AssetType,
        params: Params,
        style: ArrayStyle,
    ) -> ClientResult<T> {
        let url = self.api_url(&format!("{}/{}", asset_type, action));

        self.execute(action, self.config.timeout, async {
            let params = self.signed_params(params, style)?;
            let response = self
                .http
                .post(&url)
                .multipart(multipart_form(&params, style))
                .send()
                .await?;
            Self::read_response(response).await
        })
        .await
    }

    async fn upload_inner(
        &self,
        source: FileSource,
        params: &UploadParams,
        force_chunked: bool,
    ) -> ClientResult<UploadResult> {
        let chunk_size = self.config.chunk_size;
        if chunk_size == 0 {
            return Err(ClientError::configuration("chunk_size must be greater than zero"));
        }

        let url = self.api_url(&format!("{}/upload", params.asset_type()));

        self.execute("upload", self.config.upload_timeout, async {
            let form_params = self.upload_form_params(params)?;

            match source.size().await? {
                Some(total) if total > 0 && (force_chunked || total > chunk_size) => {
                    self.send_chunks(&url, &source, total, chunk_size, &form_params)
                        .await
                }
                _ => self.send_whole(&url, &source, &form_params).await,
            }
        })
        .await
    }

    async fn send_whole(
        &self,
        url: &str,
        source: &FileSource,
        params: &Params,
    ) -> ClientResult<UploadResult> {
        let form = multipart_form(params, ArrayStyle::Comma);
        let form = match source {
            FileSource::RemoteUrl(value) | FileSource::DataUri(value) => {
                form.text("file", value.clone())
            }
            FileSource::LocalPath(path) => {
                let data = tokio::fs::read(path).await?;
                form.part("file", Part::bytes(data).file_name(source.filename()))
            }
            FileSource::Bytes { data, filename } => {
                form.part("file", Part::bytes(data.clone()).file_name(filename.clone()))
            }
        };

        debug!(filename = %source.filename(), "Uploading in a single request");

        let response = self.http.post(url).multipart(form).send().await?;
        Self::read_response(response).await
    }

    async fn send_chunks(
        &self,
        url: &str,
        source: &FileSource,
        total: u64,
        chunk_size: u64,
        params: &Params,
    ) -> ClientResult<UploadResult> {
        let upload_id = upload_session_id();
        let ranges = plan_chunks(total, chunk_size)?;
        let filename = source.filename();

        info!(
            upload_id = %upload_id,
            total_bytes = total,
            chunks = ranges.len(),
            "Starting chunked upload"
        );

        let mut result = None;
        for range in ranges {
            let data = source.read_range(range.start, range.byte_count()).await?;
            let form = multipart_form(params, ArrayStyle::Comma)
                .part("file", Part::bytes(data).file_name(filename.clone()));

            let response = self
                .http
                .post(url)
                .header(CONTENT_RANGE, range.to_string())
                .header(UNIQUE_UPLOAD_ID, upload_id.as_str())
                .multipart(form)
                .send()
                .await?;

            let status = response.status().as_u16();
            record_chunk(status);
            debug!(upload_id = %upload_id, range = %range, status, "Sent upload chunk");

            if range.is_last() {
                result = Some(Self::read_response::<UploadResult>(response).await?);
            } else {
                Self::read_response::<serde_json::Value>(response).await?;
            }
        }

        result.ok_or_else(|| ClientError::configuration("upload source is empty"))
    }

    /// Form parameters of an upload: signed, or checked for a preset when unsigned.
    fn upload_form_params(&self, upload: &UploadParams) -> ClientResult<Params> {
        let params = upload.to_params();

        if upload.is_unsigned() {
            if upload.upload_preset.as_deref().map_or(true, str::is_empty) {
                return Err(ClientError::configuration(
                    "upload_preset is required for unsigned uploads",
                ));
            }
            return Ok(params);
        }

        self.signed_params(params, ArrayStyle::Comma)
    }

    fn signed_params(&self, mut params: Params, style: ArrayStyle) -> ClientResult<Params> {
        let api_key = self.config.require_key("signed requests")?;
        let api_secret = self.config.require_secret("signed requests")?;

        sign_request(
            &mut params,
            api_key,
            api_secret,
            self.config.credentials.signature_algorithm,
            style,
            unix_now(),
        );
        Ok(params)
    }
}

fn multipart_form(params: &Params, style: ArrayStyle) -> Form {
    form_pairs(params, style)
        .into_iter()
        .fold(Form::new(), |form, (key, value)| form.text(key, value))
}
