use jsonwebtoken::Algorithm;

/// How identity tokens are verified.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: Vec<u8>,
    /// Always HS256 in production.
    pub algorithm: Algorithm,
    /// Clock skew tolerated on `exp`, in seconds.
    pub leeway_secs: u64,
}

impl SecurityConfig {
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
            leeway_secs: 0,
        }
    }

    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }
}
