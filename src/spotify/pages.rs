use futures_util::{Stream, stream};
use serde::de::DeserializeOwned;

use crate::{
    error::{Error, Result},
    types::Page,
};

use super::Session;

/// Lazily walks a paginated endpoint, yielding one page of items per request
/// until the service stops returning a `next` URL.
///
/// Nothing is fetched until the stream is polled; every call starts over from
/// `first_url`.
pub(crate) fn pages<'a, T>(
    session: &'a Session,
    first_url: String,
) -> impl Stream<Item = Result<Vec<T>>> + Send + 'a
where
    T: DeserializeOwned + Send + 'a,
{
    stream::try_unfold(Some(first_url), move |next| async move {
        let Some(url) = next else {
            return Ok::<_, Error>(None);
        };

        let page: Page<T> = session.get_json(&url).await?;
        tracing::debug!(url = %url, items = page.items.len(), more = page.next.is_some(), "fetched page");
        Ok(Some((page.items, page.next)))
    })
}
