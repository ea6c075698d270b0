//! Test utilities & fixtures.

use argon2::Params;
use roulette::storage::Storage;

/// Storage in a fresh temp dir with cheap Argon2 costs so hashing stays fast.
/// Keep the returned `TempDir` alive for the duration of the test.
#[allow(dead_code)]
pub async fn temp_storage() -> (tempfile::TempDir, Storage) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let datadir = tmp.path().join("data");
    let storage = open_storage(datadir.to_str().expect("utf8 path")).await;
    (tmp, storage)
}

/// Open (or reopen) storage at `dir` with the same cheap Argon2 costs.
#[allow(dead_code)]
pub async fn open_storage(dir: &str) -> Storage {
    let params = Params::new(1024, 1, 1, None).expect("argon2 params");
    Storage::new_with_params(dir, Some(params))
        .await
        .expect("storage")
}
