//! Browser launching for `--open`.

use crate::options::Page;
use tracing::{info, warn};

/// URL of `page` under the package's base URL.
pub fn page_url(base_url: &str, page: &Page) -> String {
    format!("{base_url}{}", page.as_path())
}

/// Open `url` in each named browser, or the system default when none is named.
///
/// Launch failures are logged; they never affect the running server.
pub fn open_page(url: &str, browsers: &[String]) {
    if browsers.is_empty() {
        info!(url = %url, "Opening default browser");
        if let Err(err) = open::that_detached(url) {
            warn!(url = %url, error = %err, "Failed to open browser");
        }
        return;
    }
    for browser in browsers {
        info!(url = %url, browser = %browser, "Opening browser");
        if let Err(err) = open::with_detached(url, browser) {
            warn!(url = %url, browser = %browser, error = %err, "Failed to open browser");
        }
    }
}
