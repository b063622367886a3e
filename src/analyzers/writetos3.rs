use anyhow::{Context, Result};
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::io::Write;
use tracing::info;

use crate::analyzers::types::AnalysisReport;

const KEY_PREFIX: &str = "analysis";

/// Serializes a value to JSON and uploads it to an S3 bucket with `application/json` content type.
///
/// With `gzip` set the body is compressed and tagged with `Content-Encoding: gzip`.
pub async fn write_json_to_s3(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    value: &impl Serialize,
    gzip: bool,
) -> Result<()> {
    let body = encode_body(value, gzip)?;

    let mut request = client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(body))
        .content_type("application/json");
    if gzip {
        request = request.content_encoding("gzip");
    }
    request
        .send()
        .await
        .with_context(|| format!("uploading s3://{bucket}/{key}"))?;

    Ok(())
}

fn encode_body(value: &impl Serialize, gzip: bool) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(value)?;
    if !gzip {
        return Ok(json);
    }
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

/// `analysis/latest.json` and `analysis/<date>/<HHMM>.json`, with `.gz` when compressed.
pub fn report_keys(generated_at: DateTime<Utc>, gzip: bool) -> [String; 2] {
    let ext = if gzip { "json.gz" } else { "json" };
    [
        format!("{KEY_PREFIX}/latest.{ext}"),
        format!(
            "{KEY_PREFIX}/{}/{}.{ext}",
            generated_at.format("%Y-%m-%d"),
            generated_at.format("%H%M")
        ),
    ]
}

/// Uploads the report under both the rolling and the dated key.
#[tracing::instrument(skip(client, report), fields(bucket, gzip))]
pub async fn publish_report(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    report: &AnalysisReport,
    gzip: bool,
) -> Result<()> {
    for key in report_keys(report.timestamp, gzip) {
        write_json_to_s3(client, bucket, &key, report, gzip).await?;
        info!(key = %key, "Report uploaded");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_report_keys() {
        let at = Utc.with_ymd_and_hms(2025, 7, 1, 4, 5, 0).unwrap();
        assert_eq!(
            report_keys(at, false),
            ["analysis/latest.json", "analysis/2025-07-01/0405.json"]
        );
        assert_eq!(report_keys(at, true)[1], "analysis/2025-07-01/0405.json.gz");
    }

    #[test]
    fn test_gzip_body_decodes_to_json() {
        let value = serde_json::json!({"achieved_confidence": "91.2%"});
        let body = encode_body(&value, true).unwrap();

        let mut decoded = String::new();
        GzDecoder::new(body.as_slice())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(serde_json::from_str::<serde_json::Value>(&decoded).unwrap(), value);

        assert_eq!(encode_body(&value, false).unwrap(), serde_json::to_vec(&value).unwrap());
    }
}
