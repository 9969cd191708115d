use http::header::{COOKIE, HeaderMap, HeaderValue};

use auth_session::{CookieStore, HeaderCookieJar};

/// Keeps cookies between requests like a browser would. Tabs of one browser
/// share the same cookies, so a single `MockBrowser` stands for all of them.
#[derive(Debug, Default)]
pub struct MockBrowser {
    cookies: Vec<(String, String)>,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cookie jar for the next request.
    pub fn jar(&self) -> HeaderCookieJar {
        let mut headers = HeaderMap::new();
        if !self.cookies.is_empty() {
            let header = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            headers.insert(COOKIE, HeaderValue::from_str(&header).unwrap());
        }
        HeaderCookieJar::from_headers(&headers)
    }

    /// Apply the `Set-Cookie`s a response carried.
    pub fn receive(&mut self, jar: &HeaderCookieJar) {
        for cookie in jar.set_cookies() {
            self.cookies.retain(|(name, _)| name != &cookie.name);
            if !cookie.is_expired() {
                self.cookies.push((cookie.name.clone(), cookie.value.clone()));
            }
        }
    }

    /// Add a cookie without replacing others of the same name.
    pub fn push_cookie(&mut self, name: &str, value: &str) {
        self.cookies.push((name.to_string(), value.to_string()));
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        self.jar().get_cookie_value(name)
    }
}
