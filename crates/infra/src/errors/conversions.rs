//! Conversions from external infrastructure errors into domain errors.

use bookstore_domain::BookstoreError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub BookstoreError);

impl From<InfraError> for BookstoreError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<BookstoreError> for InfraError {
    fn from(value: BookstoreError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoBookstoreError {
    fn into_bookstore(self) -> BookstoreError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → BookstoreError */
/* -------------------------------------------------------------------------- */

impl IntoBookstoreError for HttpError {
    fn into_bookstore(self) -> BookstoreError {
        if self.is_timeout() {
            return BookstoreError::Timeout("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return BookstoreError::Network("HTTP connection failure".into());
        }

        if self.is_builder() {
            return BookstoreError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() || self.is_body() {
            return BookstoreError::Decode(format!("failed to read HTTP response body: {self}"));
        }

        BookstoreError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_bookstore())
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → BookstoreError */
/* -------------------------------------------------------------------------- */

impl IntoBookstoreError for url::ParseError {
    fn into_bookstore(self) -> BookstoreError {
        BookstoreError::InvalidInput(format!("invalid request URL: {self}"))
    }
}

impl From<url::ParseError> for InfraError {
    fn from(value: url::ParseError) -> Self {
        InfraError(value.into_bookstore())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::time::Duration;

    use reqwest::Client;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn connection_refused_maps_to_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}")).send().await.unwrap_err();

        let mapped: BookstoreError = InfraError::from(error).into();
        match mapped {
            BookstoreError::Network(msg) => assert!(msg.to_lowercase().contains("connection")),
            other => panic!("expected network error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn slow_response_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client =
            Client::builder().no_proxy().timeout(Duration::from_millis(50)).build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap_err();

        let mapped: BookstoreError = InfraError::from(error).into();
        assert!(matches!(mapped, BookstoreError::Timeout(_)), "got {mapped:?}");
    }

    #[test]
    fn url_parse_error_maps_to_invalid_input() {
        let error = url::Url::parse("not a url").unwrap_err();
        let mapped: BookstoreError = InfraError::from(error).into();
        assert!(matches!(mapped, BookstoreError::InvalidInput(_)));
    }
}
