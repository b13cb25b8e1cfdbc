use charybdis::types::Uuid;

use crate::app::StorageConfig;

/// Public URL for one output asset of a run. Composes the internal storage
/// location and swaps its base for the CDN origin. Pure; views call this on
/// every read instead of persisting the result.
pub fn output_asset_url(storage: &StorageConfig, run_id: Uuid, filename: &str) -> String {
    let internal = format!(
        "{}/{}/outputs/runs/{}/{}",
        storage.endpoint.trim_end_matches('/'),
        storage.bucket,
        run_id,
        filename
    );

    replace_cdn_url(storage, &internal)
}

/// Replaces the internal `endpoint/bucket` base with the public CDN origin.
/// A URL without the internal base passes through untouched.
pub fn replace_cdn_url(storage: &StorageConfig, url: &str) -> String {
    let internal_base = format!(
        "{}/{}",
        storage.endpoint.trim_end_matches('/'),
        storage.bucket
    );

    url.replacen(&internal_base, storage.cdn_origin.trim_end_matches('/'), 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> StorageConfig {
        StorageConfig {
            endpoint: "https://nyc3.digitaloceanspaces.com".to_string(),
            bucket: "runhub-outputs".to_string(),
            cdn_origin: "https://cdn.example.com".to_string(),
        }
    }

    #[test]
    fn composes_the_public_url() {
        let run_id = Uuid::new_v4();
        let url = output_asset_url(&storage(), run_id, "a.png");

        assert_eq!(
            url,
            format!("https://cdn.example.com/outputs/runs/{}/a.png", run_id)
        );
    }

    #[test]
    fn is_deterministic() {
        let run_id = Uuid::new_v4();

        assert_eq!(
            output_asset_url(&storage(), run_id, "a.png"),
            output_asset_url(&storage(), run_id, "a.png")
        );
    }

    #[test]
    fn rewriting_an_already_public_url_is_a_noop() {
        let storage = storage();
        let public = output_asset_url(&storage, Uuid::new_v4(), "a.png");

        assert_eq!(replace_cdn_url(&storage, &public), public);
    }

    #[test]
    fn handles_trailing_slashes_in_config() {
        let storage = StorageConfig {
            endpoint: "https://nyc3.digitaloceanspaces.com/".to_string(),
            bucket: "runhub-outputs".to_string(),
            cdn_origin: "https://cdn.example.com/".to_string(),
        };
        let run_id = Uuid::new_v4();

        assert_eq!(
            output_asset_url(&storage, run_id, "a.png"),
            format!("https://cdn.example.com/outputs/runs/{}/a.png", run_id)
        );
    }
}
