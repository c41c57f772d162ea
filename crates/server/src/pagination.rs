//! Pagination query parsing and `X-Total-Count` / `Link` response headers.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use service::errors::ServiceError;
use service::pagination::{Page, PageRequest, SortOrder};

pub const X_TOTAL_COUNT: HeaderName = HeaderName::from_static("x-total-count");

/// `?page=&size=&sort=` as sent by clients; `sort` may repeat.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub size: Option<u64>,
    #[serde(default)]
    pub sort: Vec<String>,
}

/// `?query=` plus the paging parameters.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    pub page: Option<u64>,
    pub size: Option<u64>,
    #[serde(default)]
    pub sort: Vec<String>,
}

/// A rejected paging parameter and the error key reported for it.
#[derive(Debug)]
pub struct InvalidPageParam {
    pub error_key: &'static str,
    pub message: String,
}

impl InvalidPageParam {
    pub fn new(error_key: &'static str, err: ServiceError) -> Self {
        let message = match err {
            ServiceError::Validation(msg) => msg,
            other => other.to_string(),
        };
        Self { error_key, message }
    }
}

impl PageParams {
    pub fn into_request(self) -> Result<PageRequest, InvalidPageParam> {
        build_request(self.page, self.size, &self.sort)
    }
}

impl SearchParams {
    /// Split into the query text and the page request.
    pub fn into_parts(self) -> Result<(String, PageRequest), InvalidPageParam> {
        let request = build_request(self.page, self.size, &self.sort)?;
        Ok((self.query, request))
    }
}

fn build_request(page: Option<u64>, size: Option<u64>, sort: &[String]) -> Result<PageRequest, InvalidPageParam> {
    let sort = sort
        .iter()
        .map(|s| SortOrder::parse(s))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| InvalidPageParam::new("sortinvalid", e))?;
    let request = PageRequest::new(page, size, sort);
    request.ensure_addressable().map_err(|e| InvalidPageParam::new("pageinvalid", e))?;
    Ok(request)
}

fn page_uri(base_url: &str, page: u64, size: u64) -> String {
    format!("{base_url}?page={page}&size={size}")
}

/// Link header value: `next` and `prev` when they exist, then `last` and `first`.
fn link_value<T>(page: &Page<T>, uri: impl Fn(u64) -> String) -> String {
    let mut links = Vec::with_capacity(4);
    let total_pages = page.total_pages();
    if page.number.saturating_add(1) < total_pages {
        links.push(format!("<{}>; rel=\"next\"", uri(page.number + 1)));
    }
    if page.number > 0 {
        links.push(format!("<{}>; rel=\"prev\"", uri(page.number - 1)));
    }
    links.push(format!("<{}>; rel=\"last\"", uri(total_pages.saturating_sub(1))));
    links.push(format!("<{}>; rel=\"first\"", uri(0)));
    links.join(",")
}

fn headers_with_link<T>(page: &Page<T>, link: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(X_TOTAL_COUNT, HeaderValue::from(page.total_elements));
    if let Ok(value) = HeaderValue::from_str(link) {
        headers.insert(header::LINK, value);
    }
    headers
}

pub fn pagination_headers<T>(page: &Page<T>, base_url: &str) -> HeaderMap {
    let link = link_value(page, |n| page_uri(base_url, n, page.size));
    headers_with_link(page, &link)
}

/// Same as [`pagination_headers`], with the URL-encoded query kept in each link.
pub fn search_pagination_headers<T>(query: &str, page: &Page<T>, base_url: &str) -> HeaderMap {
    let escaped: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    let link = link_value(page, |n| format!("{}&query={escaped}", page_uri(base_url, n, page.size)));
    headers_with_link(page, &link)
}
