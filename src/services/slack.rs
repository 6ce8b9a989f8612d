use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

#[derive(Debug, Deserialize)]
struct SlackStatus {
    ok: bool,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadUrl {
    upload_url: String,
    file_id: String,
}

#[derive(Debug, Serialize)]
struct CompleteUploadRequest<'a> {
    files: Vec<FileRef<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channels: Option<String>,
    initial_comment: &'a str,
}

#[derive(Debug, Serialize)]
struct FileRef<'a> {
    id: &'a str,
    title: &'a str,
}

/// File plus the message it is posted with.
#[derive(Debug, Clone)]
pub struct SlackUpload<'a> {
    pub path: &'a Path,
    pub channels: &'a [String],
    pub title: String,
    pub initial_comment: String,
}

pub struct SlackClient {
    client: Client,
    api_url: String,
    token: String,
}

impl SlackClient {
    pub fn new(client: Client, api_url: &str, token: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Shares a file to the given channels: reserve an upload URL, send the
    /// bytes there, then complete the upload into the channels.
    pub async fn upload_file(&self, upload: SlackUpload<'_>) -> Result<()> {
        let filename = upload
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report".to_string());
        let content = tokio::fs::read(upload.path).await?;

        let length = content.len().to_string();
        let response = self
            .client
            .post(format!("{}/files.getUploadURLExternal", self.api_url))
            .bearer_auth(&self.token)
            .form(&[("filename", filename.as_str()), ("length", length.as_str())])
            .send()
            .await?;
        let target: UploadUrl = slack_result(response).await?;
        tracing::debug!("Uploading {} bytes as Slack file {}", length, target.file_id);

        let form = Form::new().part("file", Part::bytes(content).file_name(filename));
        let response = self
            .client
            .post(&target.upload_url)
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(AppError::SlackApi(format!("upload error: {}", error_text)));
        }

        let (channel_id, channels) = match upload.channels {
            [single] => (Some(single.as_str()), None),
            many => (None, Some(many.join(","))),
        };
        let request = CompleteUploadRequest {
            files: vec![FileRef {
                id: &target.file_id,
                title: &upload.title,
            }],
            channel_id,
            channels,
            initial_comment: &upload.initial_comment,
        };
        let response = self
            .client
            .post(format!("{}/files.completeUploadExternal", self.api_url))
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;
        slack_result::<serde_json::Value>(response).await?;

        Ok(())
    }
}

/// Slack reports most failures as 200 with `ok: false`.
async fn slack_result<T: DeserializeOwned>(response: Response) -> Result<T> {
    if !response.status().is_success() {
        let error_text = response.text().await?;
        return Err(AppError::SlackApi(format!("API error: {}", error_text)));
    }

    let body: serde_json::Value = response.json().await?;
    let status: SlackStatus = serde_json::from_value(body.clone())?;
    if !status.ok {
        return Err(AppError::SlackApi(
            status.error.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }
    serde_json::from_value(body)
        .map_err(|e| AppError::SlackApi(format!("unexpected response: {}", e)))
}
