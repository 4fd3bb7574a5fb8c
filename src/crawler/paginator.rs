//! Listing pagination as a lazy stream of job ids

use crate::crawler::fetcher::ApiClient;
use crate::model::JobId;
use crate::{CrawlError, CrawlResult};
use async_stream::try_stream;
use futures::Stream;

const URN_PREFIX: &str = "urn:li:fsd_jobPostingCard:(";
const URN_SUFFIX: &str = ",JOB_DETAILS)";

/// Strips the posting-card URN wrapper, leaving bare ids untouched
pub fn normalize_job_id(raw: &str) -> JobId {
    raw.strip_prefix(URN_PREFIX)
        .and_then(|rest| rest.strip_suffix(URN_SUFFIX))
        .unwrap_or(raw)
        .to_string()
}

/// Discovers every job id the listing endpoint reports for `search_term`
///
/// Pages are requested lazily starting at offset 0, `page_size` at a time.
/// The first page's total fixes how many ids the stream expects; a short page
/// just moves the offset forward. If a page comes back empty before that
/// total is reached, the stream ends with `CrawlError::UpstreamInconsistency`
/// instead of asking again forever. Any request error ends the stream
/// immediately.
pub fn discover(
    api: ApiClient,
    search_term: String,
    page_size: usize,
) -> impl Stream<Item = CrawlResult<JobId>> + Send {
    let page_size = page_size.max(1);

    try_stream! {
        let mut offset = 0usize;
        let mut expected: Option<usize> = None;

        loop {
            let page = api.listing_page(&search_term, offset, page_size).await?;
            let target = *expected.get_or_insert(page.total);

            tracing::debug!(
                "Listing '{}' at offset {}: {} ids (total {})",
                search_term,
                offset,
                page.job_ids.len(),
                target
            );

            if page.job_ids.is_empty() {
                if offset < target {
                    Err::<(), _>(CrawlError::UpstreamInconsistency {
                        search_term: search_term.clone(),
                        expected: target,
                        received: offset,
                    })?;
                }
                break;
            }

            offset += page.job_ids.len();
            for raw in page.job_ids {
                yield normalize_job_id(&raw);
            }

            if offset >= target {
                break;
            }
        }
    }
}
