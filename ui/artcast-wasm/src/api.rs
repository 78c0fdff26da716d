//! Static asset fetches.
//!
//! Only the deployment config is fetched over HTTP; chain traffic goes
//! through the wallet and record traffic through the Arkiv bridge.

use ac_api_types::Deployment;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use crate::dom;

/// Root-relative so nested routes such as `/gallery/` resolve the same file.
pub const DEPLOYMENT_URL: &str = "/config/deployment.json";

/// Fetch a URL and return the body as a plain string.
pub async fn fetch_text(url: &str) -> Result<String, String> {
    let opts = RequestInit::new();
    opts.set_method("GET");

    let request = Request::new_with_str_and_init(url, &opts).map_err(|e| format!("{:?}", e))?;

    let window = dom::window().map_err(|e| format!("{:?}", e))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| format!("fetch error: {:?}", e))?;

    let resp: Response = resp_value
        .dyn_into()
        .map_err(|_| "not a Response".to_string())?;

    if !resp.ok() {
        return Err(format!("{} {}", resp.status(), resp.status_text()));
    }

    let text = JsFuture::from(resp.text().map_err(|e| format!("{:?}", e))?)
        .await
        .map_err(|e| format!("text error: {:?}", e))?;

    Ok(text.as_string().unwrap_or_default())
}

/// Deployment config, or the built-in defaults when the file is missing or malformed.
pub async fn load_deployment() -> Deployment {
    match fetch_text(DEPLOYMENT_URL).await {
        Ok(text) => match serde_json::from_str::<Deployment>(&text) {
            Ok(deployment) => {
                tracing::info!(market = %deployment.market_address, "deployment config loaded");
                deployment
            }
            Err(err) => {
                tracing::warn!(error = %err, "malformed deployment config, using defaults");
                Deployment::default()
            }
        },
        Err(err) => {
            tracing::debug!(error = %err, "no deployment config, using defaults");
            Deployment::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX_HTML: &str = include_str!("../index.html");
    const STYLE_CSS: &str = include_str!("../style.css");

    #[test]
    fn assets_resolve_from_site_root() {
        assert!(INDEX_HTML.contains(r#"import("/pkg/artcast_wasm.js")"#));
        assert!(!INDEX_HTML.contains("./pkg/"));
        assert!(INDEX_HTML.contains(r#"href="/style.css""#));
        assert!(DEPLOYMENT_URL.starts_with('/'));
    }

    #[test]
    fn stylesheet_covers_page_shell() {
        for selector in [".nav", ".banner--error", ".grid", ".card__image", ".dropdown"] {
            assert!(STYLE_CSS.contains(selector), "missing {selector}");
        }
    }
}
