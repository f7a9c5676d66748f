use std::net::IpAddr;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::redirect::Policy;
use reqwest::Client as ReqwestClient;
use scraper::{Html, Selector};
use url::{Host, Url};

use super::{LinkMetadata, ResolveError, ResolveResult};

pub const FETCH_TIMEOUT: Duration = Duration::from_millis(8000);
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; LinkshelfBot/1.0; +https://linkshelf.local)";
pub const FETCH_CONTEXT: &str = "Failed to fetch OG data";

// ── Public helpers ─────────────────────────────────────────────────────────

/// Returns `true` if `ip` is a private, loopback, or link-local address.
pub fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let o = v4.octets();
            matches!(
                o,
                [127, ..]
                    | [10, ..]
                    | [169, 254, ..]
                    | [192, 168, ..]
                    | [0, ..]
                    | [255, 255, 255, 255]
            ) || (o[0] == 172 && (16..=31).contains(&o[1]))
        }
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                return is_private_ip(IpAddr::V4(v4));
            }
            v6.is_loopback()
                || v6.is_unspecified()
                || (v6.segments()[0] & 0xfe00 == 0xfc00)
                || (v6.segments()[0] & 0xffc0 == 0xfe80)
        }
    }
}

/// Parse Open Graph (and fallback HTML meta) tags from `html`.
///
/// Relative image and favicon hrefs are resolved against `page_url`.
/// Missing fields come back as empty strings.
pub fn extract_link_metadata(html: &str, page_url: &Url) -> LinkMetadata {
    let document = Html::parse_document(html);

    let title = get_meta_property(&document, "og:title")
        .or_else(|| get_meta_name(&document, "twitter:title"))
        .or_else(|| get_title_tag(&document));

    let description = get_meta_property(&document, "og:description")
        .or_else(|| get_meta_name(&document, "twitter:description"))
        .or_else(|| get_meta_name(&document, "description"));

    let image = get_meta_property(&document, "og:image")
        .or_else(|| get_meta_property(&document, "og:image:url"))
        .or_else(|| get_meta_name(&document, "twitter:image"))
        .and_then(|href| absolutize(page_url, &href));

    let favicon = get_icon_href(&document).and_then(|href| absolutize(page_url, &href));

    LinkMetadata {
        image_url: image.unwrap_or_default(),
        title: title.unwrap_or_default(),
        description: description.unwrap_or_default(),
        favicon_url: favicon.unwrap_or_default(),
    }
}

fn first_content(doc: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    doc.select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

fn get_meta_property(doc: &Html, property: &str) -> Option<String> {
    first_content(doc, &format!(r#"meta[property="{property}"]"#))
}

fn get_meta_name(doc: &Html, name: &str) -> Option<String> {
    first_content(doc, &format!(r#"meta[name="{name}"]"#))
}

fn get_title_tag(doc: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    doc.select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn get_icon_href(doc: &Html) -> Option<String> {
    let selector = Selector::parse("link[rel][href]").ok()?;
    let mut apple_touch = None;
    for el in doc.select(&selector) {
        let rel = el.value().attr("rel").unwrap_or_default().to_ascii_lowercase();
        let href = el.value().attr("href").unwrap_or_default().trim();
        if href.is_empty() {
            continue;
        }
        if rel.split_whitespace().any(|token| token == "icon") {
            return Some(href.to_string());
        }
        if apple_touch.is_none() && rel.split_whitespace().any(|t| t == "apple-touch-icon") {
            apple_touch = Some(href.to_string());
        }
    }
    apple_touch
}

fn absolutize(base: &Url, href: &str) -> Option<String> {
    base.join(href).ok().map(String::from)
}

// ── Resolver ───────────────────────────────────────────────────────────────

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 5;

/// Fetches a page and normalizes its preview metadata.
///
/// Redirects are followed by hand so every hop goes through the same
/// host check as the original URL.
#[derive(Clone, Debug)]
pub struct OgResolver {
    client: ReqwestClient,
    timeout: Duration,
    blocked: Option<fn(IpAddr) -> bool>,
}

impl OgResolver {
    pub fn new(timeout: Duration, block_private_hosts: bool) -> ResolveResult<Self> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(Policy::none())
            .build()
            .map_err(|e| ResolveError::fetch_failed("Failed to build HTTP client", e))?;

        Ok(OgResolver {
            client,
            timeout,
            blocked: block_private_hosts.then_some(is_private_ip as fn(IpAddr) -> bool),
        })
    }

    /// Validate `raw` before any request goes out.
    async fn validate(&self, raw: &str) -> ResolveResult<Url> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ResolveError::InvalidInput("Missing url parameter".into()));
        }

        let parsed = Url::parse(raw).map_err(|_| ResolveError::InvalidInput("Invalid URL".into()))?;
        self.check_target(&parsed).await?;
        Ok(parsed)
    }

    /// Scheme and address checks shared by the first request and every
    /// redirect hop.
    async fn check_target(&self, target: &Url) -> ResolveResult<()> {
        match target.scheme() {
            "http" | "https" => {}
            _ => {
                return Err(ResolveError::InvalidInput(
                    "Only http/https URLs are supported".into(),
                ))
            }
        }

        let Some(blocked) = self.blocked else {
            return target
                .host()
                .map(|_| ())
                .ok_or_else(|| ResolveError::InvalidInput("URL has no host".into()));
        };

        for ip in host_addresses(target).await? {
            if blocked(ip) {
                tracing::warn!(url = %target, %ip, "Refusing link preview for blocked address");
                return Err(ResolveError::InvalidInput(
                    "URL resolves to a private or reserved address".into(),
                ));
            }
        }
        Ok(())
    }

    pub async fn resolve(&self, url: &str) -> ResolveResult<LinkMetadata> {
        let target = self.validate(url).await?;

        match tokio::time::timeout(self.timeout, self.fetch(target.clone())).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(url = %target, timeout = ?self.timeout, "Link preview timed out");
                Err(ResolveError::fetch_failed(
                    FETCH_CONTEXT,
                    format!("operation timed out after {:?}", self.timeout),
                ))
            }
        }
    }

    async fn fetch(&self, mut target: Url) -> ResolveResult<LinkMetadata> {
        let mut hops = 0;
        let response = loop {
            let response = self.client.get(target.clone()).send().await.map_err(|e| {
                tracing::warn!(error = ?e, url = %target, timeout = e.is_timeout(), "Failed to fetch URL for link preview");
                ResolveError::fetch_failed(FETCH_CONTEXT, e)
            })?;

            if !response.status().is_redirection() {
                break response;
            }

            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let Some(location) = location else {
                break response;
            };

            hops += 1;
            if hops > MAX_REDIRECTS {
                return Err(ResolveError::fetch_failed(
                    FETCH_CONTEXT,
                    format!("Too many redirects (more than {MAX_REDIRECTS})"),
                ));
            }

            let next = target.join(&location).map_err(|e| {
                ResolveError::fetch_failed(FETCH_CONTEXT, format!("Invalid redirect location: {e}"))
            })?;
            self.check_target(&next).await?;
            tracing::debug!(from = %target, to = %next, "Following link preview redirect");
            target = next;
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %target, %status, "Link preview target returned error status");
            return Err(ResolveError::fetch_failed(
                FETCH_CONTEXT,
                format!("Server returned status {status}"),
            ));
        }

        if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
            let content_type = content_type.to_str().unwrap_or_default().to_ascii_lowercase();
            if !content_type.contains("html") {
                return Err(ResolveError::fetch_failed(
                    FETCH_CONTEXT,
                    format!("Page must return text/html, got {content_type}"),
                ));
            }
        }

        let html = response.text().await.map_err(|e| {
            tracing::warn!(error = ?e, url = %target, "Failed to read link preview body");
            ResolveError::fetch_failed(FETCH_CONTEXT, e)
        })?;

        let meta = extract_link_metadata(&html, &target);
        tracing::debug!(url = %target, has_image = !meta.image_url.is_empty(), "Resolved link preview");
        Ok(meta)
    }
}

/// Addresses a URL's host stands for. IP literals are taken as-is; domains
/// go through DNS.
pub async fn host_addresses(target: &Url) -> ResolveResult<Vec<IpAddr>> {
    match target.host() {
        Some(Host::Ipv4(ip)) => Ok(vec![IpAddr::V4(ip)]),
        Some(Host::Ipv6(ip)) => Ok(vec![IpAddr::V6(ip)]),
        Some(Host::Domain(domain)) => {
            let port = target.port_or_known_default().unwrap_or(80);
            let addrs = tokio::net::lookup_host((domain, port))
                .await
                .map_err(|e| ResolveError::fetch_failed(FETCH_CONTEXT, e))?;
            Ok(addrs.map(|addr| addr.ip()).collect())
        }
        None => Err(ResolveError::InvalidInput("URL has no host".into())),
    }
}

// ── Unit tests ─────────────────────────────────────────────────────────────
