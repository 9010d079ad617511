use http::{Method, StatusCode};
use url::Url;

/// Referrer policy to apply to the next hop.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ReferrerPolicy {
    #[default]
    NoReferrerWhenDowngrade,
    NoReferrer,
    Origin,
    OriginWhenCrossOrigin,
    SameOrigin,
    StrictOrigin,
    StrictOriginWhenCrossOrigin,
    UnsafeUrl,
}

/// Describes the request that will be issued if a redirect is followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectInfo {
    /// Status code of the redirect response
    pub status_code: StatusCode,
    /// Target of the next hop
    pub new_url: Url,
    /// Method of the next hop
    pub new_method: Method,
    /// First party URL for cookie purposes of the next hop
    pub new_first_party_for_cookies: Option<Url>,
    /// Referrer to send with the next hop
    pub new_referrer: Option<Url>,
    pub referrer_policy: ReferrerPolicy,
}

impl RedirectInfo {
    /// Computes the next hop for a redirect with `status` of a request made with `method`.
    ///
    /// 303 turns everything except HEAD into a GET. 301 and 302 turn a POST into a GET, as
    /// browsers historically do. 307 and 308 keep the method.
    pub fn compute(status: StatusCode, method: &Method, new_url: Url) -> Self {
        let rewrite_to_get = if status == StatusCode::SEE_OTHER {
            *method != Method::HEAD
        } else if status == StatusCode::MOVED_PERMANENTLY || status == StatusCode::FOUND {
            *method == Method::POST
        } else {
            false
        };

        let new_method = if rewrite_to_get { Method::GET } else { method.clone() };

        Self {
            status_code: status,
            new_url,
            new_method,
            new_first_party_for_cookies: None,
            new_referrer: None,
            referrer_policy: ReferrerPolicy::default(),
        }
    }

    pub fn with_referrer(mut self, referrer: Url, policy: ReferrerPolicy) -> Self {
        self.new_referrer = Some(referrer);
        self.referrer_policy = policy;
        self
    }

    pub fn with_first_party_for_cookies(mut self, url: Url) -> Self {
        self.new_first_party_for_cookies = Some(url);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Url {
        Url::parse("https://example.org/next").unwrap()
    }

    #[test]
    fn see_other_switches_to_get() {
        let r = RedirectInfo::compute(StatusCode::SEE_OTHER, &Method::PUT, target());
        assert_eq!(r.new_method, Method::GET);

        let r = RedirectInfo::compute(StatusCode::SEE_OTHER, &Method::HEAD, target());
        assert_eq!(r.new_method, Method::HEAD);
    }

    #[test]
    fn moved_and_found_rewrite_post_only() {
        let r = RedirectInfo::compute(StatusCode::FOUND, &Method::POST, target());
        assert_eq!(r.new_method, Method::GET);

        let r = RedirectInfo::compute(StatusCode::MOVED_PERMANENTLY, &Method::PUT, target());
        assert_eq!(r.new_method, Method::PUT);
    }

    #[test]
    fn temporary_and_permanent_redirect_keep_method() {
        let r = RedirectInfo::compute(StatusCode::TEMPORARY_REDIRECT, &Method::POST, target());
        assert_eq!(r.new_method, Method::POST);

        let r = RedirectInfo::compute(StatusCode::PERMANENT_REDIRECT, &Method::DELETE, target());
        assert_eq!(r.new_method, Method::DELETE);
        assert_eq!(r.new_url, target());
    }

    #[test]
    fn referrer_and_first_party() {
        let from = Url::parse("https://example.com/").unwrap();
        let r = RedirectInfo::compute(StatusCode::FOUND, &Method::GET, target())
            .with_referrer(from.clone(), ReferrerPolicy::StrictOrigin)
            .with_first_party_for_cookies(from.clone());
        assert_eq!(r.new_referrer, Some(from.clone()));
        assert_eq!(r.referrer_policy, ReferrerPolicy::StrictOrigin);
        assert_eq!(r.new_first_party_for_cookies, Some(from));
    }
}
