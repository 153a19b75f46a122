//! CDX query construction.

use url::Url;

use crate::config::{QueryOptions, CDX_COLLAPSE_KEY, CDX_FIELD_LIST};

/// The `url` parameter for a domain: optional `www.` stripping, optional
/// subdomain wildcard, and a trailing `/*` to match every path.
pub fn query_target(domain: &str, options: &QueryOptions) -> String {
    let base = if options.strip_www {
        domain.strip_prefix("www.").unwrap_or(domain)
    } else {
        domain
    };
    if options.include_subdomains {
        format!("*.{base}/*")
    } else {
        format!("{base}/*")
    }
}

/// Builds the full CDX search URL for a domain.
///
/// # Arguments
///
/// * `endpoint` - CDX search endpoint (e.g. `http://web.archive.org/cdx/search/cdx`)
/// * `domain` - Validated domain name
/// * `options` - Subdomain, `www.` and row cap options
pub fn build_query_url(endpoint: &Url, domain: &str, options: &QueryOptions) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("url", &query_target(domain, options))
        .append_pair("output", "json")
        .append_pair("fl", CDX_FIELD_LIST)
        .append_pair("collapse", CDX_COLLAPSE_KEY)
        .append_pair("limit", &options.mode.limit().to_string());
    url
}
