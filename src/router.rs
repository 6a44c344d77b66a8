/// Routing and HTTP serving.
///
/// Handlers are registered against a method and a path pattern (`/user/:id`).
/// Every request passes through:
///
/// - global pre-middleware, which may answer early
/// - the matched route's own pre-middleware
/// - the handler, called with path params merged over query params
/// - global post-middleware, which may rewrite the response
///
/// The whole chain is mounted as the fallback of an axum router and served
/// on a single port.
use crate::seed::ContactService;
use crate::settings::Settings;
use axum::Router as AxumRouter;
use axum::body::Body;
use axum::http::{Method, StatusCode, Uri};
use axum::response::IntoResponse;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct AppState {
    pub contacts: Arc<ContactService>,
    pub settings: Settings,
}

/// Represents the outcome of an HTTP handler.
/// Supports HTML, JSON, and custom status/headers.
#[derive(Debug)]
pub struct Response {
    pub status_code: u16,
    pub body: String,
    pub headers: HashMap<String, String>,
}

impl Response {
    /// Construct a new HTTP 200 response with a plain body.
    pub fn ok(body: impl Into<String>) -> Self {
        Response {
            status_code: 200,
            body: body.into(),
            headers: HashMap::new(),
        }
    }

    /// Construct a new HTTP 200 response with an HTML body.
    pub fn html(body: impl Into<String>) -> Self {
        let mut response = Response::ok(body);
        response.headers.insert(
            "Content-Type".to_string(),
            "text/html; charset=utf-8".to_string(),
        );
        response
    }

    pub fn not_found() -> Self {
        Response {
            status_code: 404,
            body: "404 Not Found".to_string(),
            headers: HashMap::new(),
        }
    }

    pub fn method_not_allowed() -> Self {
        Response {
            status_code: 405,
            body: "405 Method Not Allowed".to_string(),
            headers: HashMap::new(),
        }
    }

    /// Construct a JSON response from any serializable payload.
    /// Falls back to a 500 with a fixed error body if serialization fails.
    pub fn json<T: Serialize>(
        data: T,
        status_code: u16,
        mut headers: HashMap<String, String>,
    ) -> Self {
        headers.insert(
            "Content-Type".to_string(),
            "application/json; charset=utf-8".to_string(),
        );
        match serde_json::to_string(&data) {
            Ok(body) => Response {
                status_code,
                body,
                headers,
            },
            Err(e) => {
                log::error!("Response serialization failed: {}", e);
                Response {
                    status_code: 500,
                    body: "{\"error\": \"Serialization failed\"}".to_string(),
                    headers,
                }
            }
        }
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut builder = axum::http::Response::builder().status(status);
        for (key, value) in &self.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        match builder.body(Body::from(self.body)) {
            Ok(response) => response,
            Err(e) => {
                log::error!("Invalid response headers: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Holds metadata about the current HTTP request and its extracted parameters.
/// Middleware and handlers can modify/read this context.
pub struct RequestContext {
    pub method: String,
    pub path: String,
    pub params: HashMap<String, String>,
    pub start_time: Option<Instant>,
}

impl RequestContext {
    pub fn new(method: &str, path: &str) -> Self {
        RequestContext {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            params: HashMap::new(),
            start_time: None,
        }
    }
}

pub type BoxedResponse = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Async handler for HTTP routes: receives the request params and app state.
pub type Handler = Arc<dyn Fn(HashMap<String, String>, AppState) -> BoxedResponse + Send + Sync>;

/// Wrap an async fn or closure as a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(HashMap<String, String>, AppState) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |params, state| -> BoxedResponse { Box::pin(f(params, state)) })
}

/// Pre-processing middleware. Returning `Some(Response)` stops the chain.
pub type Middleware = Arc<dyn Fn(&mut RequestContext) -> Option<Response> + Send + Sync>;

/// Post-processing middleware, run on every response before it is sent.
pub type PostMiddleware = Arc<dyn Fn(&RequestContext, Response) -> Response + Send + Sync>;

#[derive(Clone)]
pub struct Route {
    pub method: String,
    pub path_pattern: String,
    pub handler: Handler,
    pub middlewares: Vec<Middleware>,
}

#[derive(Clone, Default)]
pub struct Router {
    pub routes: Vec<Route>,
    pub middlewares: Vec<Middleware>,
    pub post_middlewares: Vec<PostMiddleware>,
    pub app_state: Option<AppState>,
}

/// Maps status codes to HTTP status text.
pub fn status_text(code: u16) -> &'static str {
    StatusCode::from_u16(code)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

impl Router {
    pub fn new() -> Self {
        Router::default()
    }

    /// Register a route for `method` (e.g. "GET") and `path_pattern`.
    pub fn add_route(
        &mut self,
        method: &str,
        path_pattern: &str,
        handler: Handler,
        middlewares: Vec<Middleware>,
    ) {
        self.routes.push(Route {
            method: method.to_ascii_uppercase(),
            path_pattern: path_pattern.to_string(),
            handler,
            middlewares,
        });
    }

    pub fn add_middleware(&mut self, middleware: Middleware) {
        self.middlewares.push(middleware);
    }

    pub fn add_post_middleware(&mut self, middleware: PostMiddleware) {
        self.post_middlewares.push(middleware);
    }

    pub fn set_app_state(&mut self, state: AppState) {
        self.app_state = Some(state);
    }

    /// Run one request through middleware, route matching and the handler.
    /// `query` is the raw, still-encoded query string.
    pub async fn dispatch(&self, method: &str, path: &str, query: Option<&str>) -> Response {
        let mut ctx = RequestContext::new(method, path);
        let response = self.run_chain(&mut ctx, query).await;
        self.post_middlewares
            .iter()
            .fold(response, |response, post| post(&ctx, response))
    }

    async fn run_chain(&self, ctx: &mut RequestContext, query: Option<&str>) -> Response {
        for middleware in &self.middlewares {
            if let Some(response) = middleware(ctx) {
                return response;
            }
        }

        let mut path_matched = false;
        for route in &self.routes {
            let Some(path_params) = match_path(&route.path_pattern, &ctx.path) else {
                continue;
            };
            path_matched = true;
            if route.method != ctx.method {
                continue;
            }

            let mut params = parse_query(query);
            params.extend(path_params);
            ctx.params = params;

            for middleware in &route.middlewares {
                if let Some(response) = middleware(ctx) {
                    return response;
                }
            }

            let Some(state) = self.app_state.clone() else {
                log::error!("App state not set in Router");
                let mut response = Response::ok("500 Internal Server Error");
                response.status_code = 500;
                return response;
            };
            return (route.handler)(ctx.params.clone(), state).await;
        }

        if path_matched {
            Response::method_not_allowed()
        } else {
            Response::not_found()
        }
    }

    /// Convert into an axum router that sends every request through `dispatch`.
    pub fn into_axum(self) -> AxumRouter {
        let router = Arc::new(self);
        AxumRouter::new().fallback(move |method: Method, uri: Uri| {
            let router = router.clone();
            async move {
                router
                    .dispatch(method.as_str(), uri.path(), uri.query())
                    .await
            }
        })
    }

    /// Bind to the configured host and port and serve until the process stops.
    pub async fn run(self, settings: &Settings) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = settings.http_addr();
        let listener = TcpListener::bind(&addr).await?;
        log::info!("HTTP server running on http://{}", addr);
        axum::serve(listener, self.into_axum()).await?;
        Ok(())
    }
}

/// Pre/post middleware pair that logs method, path, status and elapsed time.
pub fn access_log() -> (Middleware, PostMiddleware) {
    let start: Middleware = Arc::new(|ctx| {
        ctx.start_time = Some(Instant::now());
        None
    });
    let finish: PostMiddleware = Arc::new(|ctx, response| {
        let elapsed = ctx
            .start_time
            .map(|t| t.elapsed().as_millis())
            .unwrap_or_default();
        log::info!(
            "{} {} -> {} {} ({} ms)",
            ctx.method,
            ctx.path,
            response.status_code,
            status_text(response.status_code),
            elapsed
        );
        response
    });
    (start, finish)
}

#[macro_export]
macro_rules! route {
    ($router:expr, $( $method:ident $path:expr => { $handler:expr $(, $middleware:expr )* } ),* $(,)?) => {
        $(
            $router.add_route(
                stringify!($method),
                $path,
                $crate::router::handler($handler),
                vec![$($middleware),*]
            );
        )*
    };
}

/// Decode a raw query string into a map; later duplicates win.
/// Pairs are decoded one at a time so a bad pair only drops itself.
pub fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in query.unwrap_or_default().split('&').filter(|p| !p.is_empty()) {
        match serde_urlencoded::from_str::<Vec<(String, String)>>(pair) {
            Ok(decoded) => params.extend(decoded),
            Err(e) => log::debug!("Skipping undecodable query pair {:?}: {}", pair, e),
        }
    }
    params
}

/// Matches a path pattern (e.g. `/foo/:id`) against a real path,
/// extracting parameters into a HashMap if matched, or None if not.
pub fn match_path(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_parts: Vec<&str> = pattern.trim_matches('/').split('/').collect();
    let path_parts: Vec<&str> = path.trim_matches('/').split('/').collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();

    for (p, a) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(name) = p.strip_prefix(':') {
            params.insert(name.to_string(), a.to_string());
        } else if p != a {
            return None;
        }
    }

    Some(params)
}
