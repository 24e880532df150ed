//! Ends the current session.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{auth::invalidate_auth_cookie, endpoints};

/// Invalidate the auth cookie and redirect the client to the log-in page.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (jar, Redirect::to(endpoints::ROOT)).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::{
        Router,
        http::StatusCode,
        routing::{get, post},
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use axum_test::TestServer;
    use sha2::{Digest, Sha512};
    use time::OffsetDateTime;

    use crate::{
        Error,
        auth::{COOKIE_TOKEN, UserID, set_auth_cookie},
        endpoints,
    };

    use super::get_log_out;

    async fn stub_log_in(jar: PrivateCookieJar) -> Result<PrivateCookieJar, Error> {
        set_auth_cookie(jar, UserID::new(1), time::Duration::minutes(5))
    }

    #[tokio::test]
    async fn log_out_invalidates_cookie_and_redirects() {
        let key = Key::from(&Sha512::digest("foobar"));
        let app = Router::new()
            .route("/log_in", post(stub_log_in))
            .route(endpoints::LOG_OUT, get(get_log_out))
            .with_state(key);
        let server = TestServer::new(app).expect("Could not create test server.");
        let jar = server.post("/log_in").await.cookies();

        let response = server.get(endpoints::LOG_OUT).add_cookies(jar).await;

        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), endpoints::ROOT);
        let cookie = response.cookie(COOKIE_TOKEN);
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
