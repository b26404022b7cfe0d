use regex::Regex;
use std::fmt;
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// Redacts credentials from formatted log output.
#[derive(Clone)]
pub struct SecretScrubber {
    google_key_pattern: Regex,
    query_key_pattern: Regex,
    header_key_pattern: Regex,
    token_pattern: Regex,
    bearer_pattern: Regex,
}

impl SecretScrubber {
    pub fn new() -> Self {
        Self {
            // Google API keys: AIza followed by 35 characters
            google_key_pattern: Regex::new(r"AIza[0-9A-Za-z_\-]{35}").unwrap(),
            // `key=` query parameter on Safe Browsing URLs
            query_key_pattern: Regex::new(r#"([?&]key=)[^&\s#"']+"#).unwrap(),
            // VirusTotal header, as printed by Debug impls or error bodies
            header_key_pattern: Regex::new(r#"(?i)(x-apikey["']?\s*[:=]\s*["']?)[^"'\s,}]+"#)
                .unwrap(),
            // Generic key/token fields
            token_pattern: Regex::new(
                r#"(?i)(["']?(?:api_key|apikey|token|secret)["']?\s*[:=]\s*["']?)[a-zA-Z0-9\-_\.]{16,}"#,
            )
            .unwrap(),
            bearer_pattern: Regex::new(r"Bearer\s+[a-zA-Z0-9\-_\.]+").unwrap(),
        }
    }

    /// Scrub a message of sensitive data
    pub fn scrub_message(&self, message: &str) -> String {
        let scrubbed = self
            .google_key_pattern
            .replace_all(message, "[API_KEY_REDACTED]");
        let scrubbed = self.query_key_pattern.replace_all(&scrubbed, "${1}[REDACTED]");
        let scrubbed = self.header_key_pattern.replace_all(&scrubbed, "${1}[REDACTED]");
        let scrubbed = self.token_pattern.replace_all(&scrubbed, "${1}[REDACTED]");
        self.bearer_pattern
            .replace_all(&scrubbed, "Bearer [TOKEN_REDACTED]")
            .into_owned()
    }
}

impl Default for SecretScrubber {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber").finish()
    }
}

/// `MakeWriter` that scrubs every formatted event before it reaches `inner`.
#[derive(Clone)]
pub struct ScrubbingMakeWriter<M> {
    inner: M,
    scrubber: Arc<SecretScrubber>,
}

impl<M> ScrubbingMakeWriter<M> {
    pub fn new(inner: M, scrubber: Arc<SecretScrubber>) -> Self {
        Self { inner, scrubber }
    }
}

impl<'a, M: MakeWriter<'a>> MakeWriter<'a> for ScrubbingMakeWriter<M> {
    type Writer = ScrubbingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        ScrubbingWriter {
            inner: self.inner.make_writer(),
            scrubber: Arc::clone(&self.scrubber),
        }
    }
}

/// Writer half of [`ScrubbingMakeWriter`].
pub struct ScrubbingWriter<W> {
    inner: W,
    scrubber: Arc<SecretScrubber>,
}

impl<W: io::Write> io::Write for ScrubbingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        self.inner
            .write_all(self.scrubber.scrub_message(&text).as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
