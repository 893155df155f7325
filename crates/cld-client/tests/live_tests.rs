//! Live tests against a real Cloudinary account.
//!
//! Run with `CLOUDINARY_URL` set (or in `.env`) and `--ignored`.

use cld_client::{
    AssetRef, AssetType, CloudinaryClient, DestroyParams, FileSource, SearchQuery, UploadParams,
};

const PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn live_client() -> CloudinaryClient {
    dotenvy::dotenv().ok();
    CloudinaryClient::from_env().expect("CLOUDINARY_URL must be set for live tests")
}

/// Test credentials with the Admin API.
#[tokio::test]
#[ignore = "requires Cloudinary credentials"]
async fn test_ping() {
    let client = live_client();
    let result = client.ping().await.expect("ping failed");
    assert_eq!(result.status, "ok");
}

/// Test a signed upload round trip.
#[tokio::test]
#[ignore = "requires Cloudinary credentials"]
async fn test_upload_and_destroy() {
    let client = live_client();
    let public_id = format!("cld_client_live_{}", unique_suffix());

    let params = UploadParams::new(AssetType::Image)
        .with_public_id(&public_id)
        .with_tag("cld_client_live");
    let result = client.upload(PIXEL, &params).await.expect("upload failed");

    assert_eq!(result.public_id, public_id);
    assert!(client.verify_upload_result(&result).unwrap());

    let url = client
        .url(&AssetRef::image(&public_id).with_version(result.version).with_format("png"))
        .unwrap();
    println!("Uploaded: {}", url);

    let destroyed = client
        .destroy(&DestroyParams::new(&public_id))
        .await
        .expect("destroy failed");
    assert!(destroyed.is_ok());
}

/// Test a chunked upload of in-memory bytes.
#[tokio::test]
#[ignore = "requires Cloudinary credentials"]
async fn test_chunked_raw_upload() {
    dotenvy::dotenv().ok();
    let mut config = cld_client::CloudinaryConfig::from_env().expect("CLOUDINARY_URL must be set");
    config.chunk_size = 5_242_880;
    let client = CloudinaryClient::new(config).unwrap();

    let data = vec![b'x'; 6_000_000];
    let public_id = format!("cld_client_live_{}.bin", unique_suffix());
    let params = UploadParams::new(AssetType::File).with_public_id(&public_id);

    let result = client
        .upload(FileSource::bytes(data, "big.bin"), &params)
        .await
        .expect("chunked upload failed");
    assert_eq!(result.bytes, Some(6_000_000));

    let mut destroy = DestroyParams::new(&public_id);
    destroy.asset_type = AssetType::File;
    client.destroy(&destroy).await.expect("destroy failed");
}

/// Test that a signed search URL is produced for the live account.
#[test]
#[ignore = "requires Cloudinary credentials"]
fn test_search_url() {
    let client = live_client();
    let url = client
        .search_url(&SearchQuery::new("tags=cld_client_live").max_results(5), None, None)
        .unwrap();
    assert!(url.contains("/search/"));
}

fn unique_suffix() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis()
        .to_string()
}
