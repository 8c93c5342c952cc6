/// NodeInfo Resolver - Orchestrates domain normalization, discovery and caching
use crate::{
    config::ResolverConfig,
    error::{FedinfoError, FedinfoResult},
    nodeinfo::{
        discovery::{parse_software, parse_well_known},
        NodeInfo, Software, SoftwareCache, WELL_KNOWN_PATH,
    },
};
use tracing::{debug, info, warn};
use url::{ParseError, Url};

/// Main NodeInfo resolver - combines caching with two-hop discovery
#[derive(Clone)]
pub struct NodeInfoResolver {
    cache: SoftwareCache,
    http_client: reqwest::Client,
    config: ResolverConfig,
}

impl NodeInfoResolver {
    /// Create a new resolver backed by `cache`
    pub fn new(cache: SoftwareCache, config: ResolverConfig) -> FedinfoResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| FedinfoError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            cache,
            http_client,
            config,
        })
    }

    pub fn cache(&self) -> &SoftwareCache {
        &self.cache
    }

    /// Resolve a domain to the software it runs
    ///
    /// Resolution order:
    /// 1. Normalize the input to a bare domain
    /// 2. Check cache first (fast path)
    /// 3. Fetch the well-known document and pick a versioned link
    /// 4. Fetch the versioned document and cache its software
    ///
    /// A domain that advertises no supported schema resolves to empty
    /// software and is not cached. Concurrent misses for the same domain
    /// each fetch; the last one to finish wins the cache slot.
    pub async fn resolve(&self, input: &str) -> FedinfoResult<NodeInfo> {
        let domain = normalize_domain(input)?;

        if let Some(software) = self.cache.get(&domain).await {
            debug!("cache hit for {}", domain);
            return Ok(NodeInfo { domain, software });
        }

        debug!("cache miss for {}, discovering", domain);

        let software = match self.discover(&domain).await {
            Ok(Some(software)) => {
                self.cache.set(&domain, software.clone()).await;
                info!(
                    "resolved {} to {} {}",
                    domain, software.name, software.version
                );
                software
            }
            Ok(None) => {
                debug!("{} advertises no supported nodeinfo schema", domain);
                Software::default()
            }
            Err(e) => {
                warn!("nodeinfo discovery failed for {}: {}", domain, e);
                return Err(e);
            }
        };

        Ok(NodeInfo { domain, software })
    }

    /// Run both discovery hops for an already normalized domain
    async fn discover(&self, domain: &str) -> FedinfoResult<Option<Software>> {
        let well_known_url = format!(
            "{}://{}{}",
            self.config.well_known_scheme, domain, WELL_KNOWN_PATH
        );
        let body = self.fetch(&well_known_url).await?;
        let well_known = parse_well_known(&body)?;

        let Some(href) = well_known.nodeinfo_href() else {
            return Ok(None);
        };

        let body = self.fetch(href).await?;
        parse_software(&body).map(Some)
    }

    /// Single-attempt GET returning the response body
    async fn fetch(&self, url: &str) -> FedinfoResult<Vec<u8>> {
        debug!("fetching {}", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| FedinfoError::Fetch(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(FedinfoError::Fetch(format!(
                "{} returned error: {}",
                url,
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FedinfoError::Fetch(format!("Failed to read {}: {}", url, e)))?;

        Ok(body.to_vec())
    }
}

/// Reduce caller input to the domain used for lookups and cache keys
///
/// Input with a scheme yields its host (and explicit port). Input without a
/// scheme is the domain itself, possibly with a port, so it is read as if
/// `https://` had been typed in front of it. Either way the host comes out
/// lowercased and IDNA-encoded, giving one cache key per instance.
pub fn normalize_domain(input: &str) -> FedinfoResult<String> {
    if input.is_empty() {
        return Err(FedinfoError::MissingParameter("domain".to_string()));
    }

    let not_an_url = || FedinfoError::InvalidInput(format!("not an url: {}", input));

    match Url::parse(input) {
        Ok(url) if url.host_str().is_some_and(|host| !host.is_empty()) => {
            host_and_port(&url).ok_or_else(not_an_url)
        }
        // "example.social:8080" parses as scheme "example.social" with no host
        Ok(_) | Err(ParseError::RelativeUrlWithoutBase) => {
            if !is_valid_relative(input) {
                return Err(not_an_url());
            }
            let url = Url::parse(&format!("https://{}", input)).map_err(|_| not_an_url())?;
            host_and_port(&url).ok_or_else(not_an_url)
        }
        Err(_) => Err(not_an_url()),
    }
}

fn host_and_port(url: &Url) -> Option<String> {
    let host = url.host_str().filter(|host| !host.is_empty())?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Scheme-less input must still be a well-formed URI reference
fn is_valid_relative(input: &str) -> bool {
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b if b.is_ascii_control() || b == b' ' => return false,
            b'%' => {
                let valid = bytes.len() > i + 2
                    && bytes[i + 1].is_ascii_hexdigit()
                    && bytes[i + 2].is_ascii_hexdigit();
                if !valid {
                    return false;
                }
                i += 3;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    true
}
