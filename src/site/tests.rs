//! Tests for the public site pages
//!
//! The site router needs no application state, so requests go straight
//! through `site_routes()`.

#[cfg(test)]
mod tests {
    use super::super::site_routes;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    fn post_form(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/contact")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn text_body(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .expect("Missing Location header")
    }

    #[tokio::test]
    async fn test_public_pages_render() {
        for uri in ["/", "/about", "/contact"] {
            let response = site_routes().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);
            assert!(text_body(response).await.contains("<nav>"));
        }
    }

    #[tokio::test]
    async fn test_valid_contact_redirects_home_with_thanks() {
        let response = site_routes()
            .oneshot(post_form(
                "name=Alice&email=alice%40example.com&message=Hello+there",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/?flash=contact_sent");

        let welcome = site_routes()
            .oneshot(get("/?flash=contact_sent"))
            .await
            .unwrap();
        assert!(text_body(welcome).await.contains("Thanks for your message!"));
    }

    #[tokio::test]
    async fn test_invalid_contact_returns_to_form() {
        let response = site_routes()
            .oneshot(post_form("name=Alice&email=not-an-email&message=Hi"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/contact?error=email");

        let response = site_routes()
            .oneshot(post_form("email=alice%40example.com"))
            .await
            .unwrap();
        assert_eq!(location(&response), "/contact?error=name");

        let form = site_routes()
            .oneshot(get("/contact?error=email"))
            .await
            .unwrap();
        assert!(text_body(form)
            .await
            .contains("Please enter a valid email address."));
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected() {
        let response = site_routes()
            .oneshot(post_form(
                "name=Alice&email=alice%40example.com&message=+++",
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/contact?error=message");
    }
}
