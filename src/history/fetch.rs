use super::{extract, HistoryError, Page, PageSource};
use tracing::debug;

/// Fetch a single history page and extract its records.
pub async fn fetch_page<S: PageSource + ?Sized>(source: &S, url: &str) -> Result<Page, HistoryError> {
    let resp = source.get(url).await?;
    if !(200..300).contains(&resp.status) {
        return Err(HistoryError::fetch(
            url,
            format!("received status code {}", resp.status),
        ));
    }

    let page = extract(&resp.body).map_err(|e| HistoryError::Extraction {
        url: url.to_string(),
        source: e,
    })?;
    debug!(url, records = page.records.len(), next = ?page.next_link, "Fetched page");
    Ok(page)
}
