use std::time::Instant;

use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use tracing::debug;

/// Correlates our requests with the service's own logs when reporting problems
const REQUEST_ID_HEADER: &str = "x-ms-request-id";

pub struct LoggingMiddleware;

#[async_trait::async_trait]
impl Middleware for LoggingMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        debug!("Request: {} {}", req.method(), req.url());
        let started = Instant::now();
        let res = next.run(req, extensions).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match res {
            Ok(ref res) => {
                let request_id = res
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                debug!(request_id, elapsed_ms, "Response: {}", res.status());
            }
            Err(ref e) => {
                debug!(elapsed_ms, "Response error: {}", e);
            }
        }
        res
    }
}
