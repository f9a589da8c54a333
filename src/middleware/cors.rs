use worker::{Headers, Response, Result};

/// Per-route CORS headers. Every route allows any origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorsPolicy {
    pub methods: &'static str,
    pub headers: &'static str,
}

pub const CONTENT_CORS: CorsPolicy = CorsPolicy {
    methods: "GET, POST, OPTIONS",
    headers: "Content-Type, X-Admin-Key",
};

pub const PUBLISH_CORS: CorsPolicy = CorsPolicy {
    methods: "POST, OPTIONS",
    headers: "Content-Type",
};

pub const DEFAULT_CORS: CorsPolicy = CorsPolicy {
    methods: "GET, OPTIONS",
    headers: "Content-Type",
};

/// Policy for the route serving `path`.
pub fn cors_for_path(path: &str) -> CorsPolicy {
    match path {
        "/content" => CONTENT_CORS,
        "/publish" => PUBLISH_CORS,
        _ => DEFAULT_CORS,
    }
}

impl CorsPolicy {
    pub fn header_pairs(&self) -> [(&'static str, &'static str); 3] {
        [
            ("Access-Control-Allow-Origin", "*"),
            ("Access-Control-Allow-Methods", self.methods),
            ("Access-Control-Allow-Headers", self.headers),
        ]
    }

    pub fn apply(&self, headers: &mut Headers) -> Result<()> {
        for (name, value) in self.header_pairs() {
            headers.set(name, value)?;
        }
        Ok(())
    }

    /// Empty 200 answer to an `OPTIONS` request.
    pub fn preflight(&self) -> Result<Response> {
        self.wrap(Response::empty()?)
    }

    /// Add CORS headers to response
    pub fn wrap(&self, mut response: Response) -> Result<Response> {
        self.apply(response.headers_mut())?;
        Ok(response)
    }
}
