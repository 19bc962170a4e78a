// Request-Level Extraction
//
// INTEGRATION layer that turns one inbound request into wordlist entries.
//
// Order of inspection:
//   1. path (plus an extension category when the last segment has one)
//   2. user-info of an absolute-form target
//   3. Authorization header, decoding Basic credentials
//   4. query string
//   5. body, by Content-Type (body.rs)
//
// Decoding happens first and touches no shared state. The finished Harvest is
// then written through WordlistStore::record, which holds the store lock for the
// whole pass.
//
// Used by: engine.rs for every request

use super::body::{form_fields, harvest_body, harvest_fields};
use crate::models::{Category, Harvest, InboundRequest};
use crate::wordlist::WordlistStore;
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;
use tracing::{debug, error};

/// Everything worth keeping from `request`, in discovery order.
pub async fn harvest(request: &InboundRequest) -> Harvest {
    let mut harvest = Harvest::new();

    let path = request.path();
    harvest.record(Category::Paths, path);
    if let Some(category) = request.extension().and_then(Category::for_extension) {
        harvest.record(category, path);
    }

    if let Some(info) = request.user_info() {
        harvest.credentials(&info.username, info.password.as_deref());
    }

    if let Some(auth) = request.authorization() {
        harvest.record(Category::Authorizations, auth.as_str());
        if let Some((user, pass)) = decode_basic_credentials(&auth) {
            harvest.credentials(&user, Some(&pass));
        }
    }

    if let Some(query) = request.query() {
        harvest_fields(form_fields(query.as_bytes()), &mut harvest);
    }

    harvest_body(request.content_type().as_deref(), &request.body, &mut harvest).await;

    harvest
}

/// `Basic <base64(user:pass)>` -> (user, pass). Split on the first colon only.
pub fn decode_basic_credentials(header: &str) -> Option<(String, String)> {
    let scheme = header.get(..6)?;
    if !scheme.eq_ignore_ascii_case("basic ") {
        return None;
    }
    let decoded = general_purpose::STANDARD.decode(header[5..].trim()).ok()?;
    let text = String::from_utf8_lossy(&decoded);
    let (user, pass) = text.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Harvests `request` and records it into `store`. Returns the number of new values.
pub async fn extract(store: &Arc<WordlistStore>, request: &InboundRequest) -> usize {
    let harvest = harvest(request).await;
    let observed = harvest.len();
    let store = Arc::clone(store);
    match tokio::task::spawn_blocking(move || store.record(&harvest)).await {
        Ok(added) => {
            debug!(path = %request.path(), observed, added, "extraction complete");
            added
        }
        Err(e) => {
            error!(path = %request.path(), error = %e, "extraction task failed");
            0
        }
    }
}
