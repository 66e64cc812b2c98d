//! Fixed set of endpoints the client talks to.

use url::Url;

use crate::{Error, Result};

/// An OctoPrint endpoint, relative to the server's base url.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Route<'a> {
    CurrentUser,
    ApiVersion,
    ServerInformation,
    Connection,
    Job,
    ProbeWorkflowSupport,
    RequestAppKey,
    PollAppKeyRequestDecision { app_token: &'a str },
    DecideExistingRequest { user_token: &'a str },
    ApplicationKeys,
    ApplicationKeysForAllUsers,
}

impl<'a> Route<'a> {
    /// Fixed part of the endpoint path. Never starts with `/`, so joining it
    /// onto the base url keeps any path prefix the server is mounted under.
    pub(crate) fn path(&self) -> &'static str {
        match self {
            Route::CurrentUser => "api/currentuser",
            Route::ApiVersion => "api/version",
            Route::ServerInformation => "api/server",
            Route::Connection => "api/connection",
            Route::Job => "api/job",
            Route::ProbeWorkflowSupport => "plugin/appkeys/probe",
            Route::RequestAppKey => "plugin/appkeys/request",
            Route::PollAppKeyRequestDecision { .. } => "plugin/appkeys/request",
            Route::DecideExistingRequest { .. } => "plugin/appkeys/decision",
            Route::ApplicationKeys => "api/plugin/appkeys",
            Route::ApplicationKeysForAllUsers => "api/plugin/appkeys?all",
        }
    }

    /// Token appended to [Route::path] as one more path segment.
    pub(crate) fn token(&self) -> Option<&'a str> {
        match *self {
            Route::PollAppKeyRequestDecision { app_token } => Some(app_token),
            Route::DecideExistingRequest { user_token } => Some(user_token),
            _ => None,
        }
    }

    /// Absolute url of the endpoint under `base`.
    ///
    /// A token is always exactly one percent-encoded segment; one that cannot
    /// be (empty, `.` or `..`) is rejected instead of resolving elsewhere.
    pub(crate) fn url(&self, base: &Url) -> Result<Url> {
        let mut url = base.join(self.path())?;

        if let Some(token) = self.token() {
            if matches!(token, "" | "." | "..") {
                return Err(Error::InvalidToken(token.to_owned()));
            }
            url.path_segments_mut()
                .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
                .push(token);
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn base() -> Url {
        Url::parse("http://octopi.local/octoprint/").unwrap()
    }

    #[test]
    fn test_token_routes() {
        assert_eq!(
            Route::PollAppKeyRequestDecision { app_token: "abc123" }
                .url(&base())
                .unwrap()
                .as_str(),
            "http://octopi.local/octoprint/plugin/appkeys/request/abc123"
        );
        assert_eq!(
            Route::DecideExistingRequest { user_token: "u-42" }
                .url(&base())
                .unwrap()
                .as_str(),
            "http://octopi.local/octoprint/plugin/appkeys/decision/u-42"
        );
    }

    #[test]
    fn test_tokens_stay_one_segment() {
        for (token, expected) in [
            ("a/b", "plugin/appkeys/decision/a%2Fb"),
            ("a?x=1", "plugin/appkeys/decision/a%3Fx=1"),
            ("a#frag", "plugin/appkeys/decision/a%23frag"),
            ("a b", "plugin/appkeys/decision/a%20b"),
            ("..%2F", "plugin/appkeys/decision/..%252F"),
        ] {
            let url = Route::DecideExistingRequest { user_token: token }.url(&base()).unwrap();
            assert_eq!(url.as_str(), format!("http://octopi.local/octoprint/{}", expected), "{:?}", token);
            assert_eq!(url.query(), None, "{:?}", token);
            assert_eq!(url.fragment(), None, "{:?}", token);
        }
    }

    #[test]
    fn test_dot_and_empty_tokens_are_rejected() {
        for token in ["", ".", ".."] {
            let result = Route::DecideExistingRequest { user_token: token }.url(&base());
            assert!(matches!(result, Err(Error::InvalidToken(_))), "{:?}: {:?}", token, result);

            let result = Route::PollAppKeyRequestDecision { app_token: token }.url(&base());
            assert!(matches!(result, Err(Error::InvalidToken(_))), "{:?}: {:?}", token, result);
        }
    }

    #[test]
    fn test_routes_are_relative() {
        for route in [
            Route::CurrentUser,
            Route::ApiVersion,
            Route::ServerInformation,
            Route::Connection,
            Route::Job,
            Route::ProbeWorkflowSupport,
            Route::RequestAppKey,
            Route::ApplicationKeys,
            Route::ApplicationKeysForAllUsers,
        ] {
            assert!(!route.path().starts_with('/'), "{:?}", route);
            assert_eq!(route.token(), None, "{:?}", route);
        }
    }

    #[test]
    fn test_all_users_query() {
        let url = Route::ApplicationKeysForAllUsers.url(&base()).unwrap();
        assert_eq!(url.path(), "/octoprint/api/plugin/appkeys");
        assert_eq!(url.query(), Some("all"));
    }
}
