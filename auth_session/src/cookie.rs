//! Cookie transport
//!
//! [`CookieStore`] is the seam between the session layer and whatever carries
//! cookies for the current request. [`HeaderCookieJar`] implements it over
//! plain `http` headers.

use cookie::Cookie;
use cookie::time::{Duration, OffsetDateTime};
use headers::HeaderMapExt;
use http::header::{HeaderMap, HeaderValue, SET_COOKIE};

use crate::utils::UtilError;

pub use cookie::SameSite;

/// A cookie to be sent back with the response.
///
/// `max_age: None` produces a browser-session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub max_age: Option<i64>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

impl SetCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            max_age: None,
            secure: false,
            http_only: false,
            same_site: None,
        }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.max_age, Some(age) if age <= 0)
    }

    fn to_cookie(&self) -> Cookie<'static> {
        let mut builder = Cookie::build((self.name.clone(), self.value.clone()))
            .secure(self.secure)
            .http_only(self.http_only);
        if let Some(path) = &self.path {
            builder = builder.path(path.clone());
        }
        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        if let Some(max_age) = self.max_age {
            builder = builder.max_age(Duration::seconds(max_age));
            if max_age <= 0 {
                builder = builder.expires(OffsetDateTime::UNIX_EPOCH);
            }
        }
        if let Some(same_site) = self.same_site {
            builder = builder.same_site(same_site);
        }
        builder.build()
    }

    /// Render as a `Set-Cookie` header value, percent-encoding name and value.
    pub fn to_header_value(&self) -> String {
        self.to_cookie().encoded().to_string()
    }
}

/// Read and write named cookies for one request/response pair.
pub trait CookieStore: Send {
    /// All distinct values sent under `name`, in the order the client sent them.
    fn get_cookie_values(&self, name: &str) -> Vec<String>;

    fn get_cookie_value(&self, name: &str) -> Option<String> {
        self.get_cookie_values(name).into_iter().next()
    }

    fn add_cookie(&mut self, cookie: SetCookie);

    fn expire_cookie(&mut self, name: &str, path: &str) {
        self.add_cookie(SetCookie::new(name, "").path(path).max_age(0));
    }
}

/// [`CookieStore`] over request headers, collecting `Set-Cookie` output.
#[derive(Debug, Clone, Default)]
pub struct HeaderCookieJar {
    incoming: Vec<(String, String)>,
    outgoing: Vec<SetCookie>,
}

impl HeaderCookieJar {
    /// Collect every pair from every `Cookie` header, keeping client order.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let incoming = headers
            .typed_get::<headers::Cookie>()
            .map(|cookie| {
                cookie
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            incoming,
            outgoing: Vec::new(),
        }
    }

    pub fn set_cookies(&self) -> &[SetCookie] {
        &self.outgoing
    }

    /// The most recent cookie queued under `name`, if any.
    pub fn last_set_cookie(&self, name: &str) -> Option<&SetCookie> {
        self.outgoing.iter().rev().find(|cookie| cookie.name == name)
    }

    pub fn into_response_headers(self) -> Result<HeaderMap, UtilError> {
        let mut headers = HeaderMap::new();
        for cookie in &self.outgoing {
            let value = HeaderValue::from_str(&cookie.to_header_value())
                .map_err(|_| UtilError::Cookie(format!("Invalid cookie value for {}", cookie.name)))?;
            headers.append(SET_COOKIE, value);
        }
        Ok(headers)
    }
}

impl CookieStore for HeaderCookieJar {
    fn get_cookie_values(&self, name: &str) -> Vec<String> {
        let mut values: Vec<String> = Vec::new();
        for (cookie_name, value) in &self.incoming {
            if cookie_name == name && !values.contains(value) {
                values.push(value.clone());
            }
        }
        values
    }

    fn add_cookie(&mut self, cookie: SetCookie) {
        tracing::trace!(cookie = %cookie.name, "Queueing Set-Cookie");
        self.outgoing.push(cookie);
    }
}
