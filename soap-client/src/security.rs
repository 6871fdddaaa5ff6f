//! WS-Security UsernameToken support
//!
//! ONVIF devices authenticate SOAP requests with a `wsse:UsernameToken`
//! header whose password is sent as a digest:
//! `Base64(SHA1(nonce + created + password))`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::Rng;
use sha1::{Digest, Sha1};

const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
const WSU_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
const PASSWORD_DIGEST: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordDigest";
const BASE64_BINARY: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary";

/// Username/password pair used for WS-Security authentication
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Build a fresh `wsse:Security` header with a random nonce
    ///
    /// `time_shift` is the device clock minus the local clock; `Created` is
    /// stamped in device time, since devices reject tokens outside their
    /// own clock window.
    pub fn security_header(&self, time_shift: chrono::Duration) -> String {
        let nonce: [u8; 16] = rand::thread_rng().gen();
        let created = (chrono::Utc::now() + time_shift)
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string();
        self.security_header_with(&nonce, &created)
    }

    /// Build a `wsse:Security` header from an explicit nonce and timestamp
    pub fn security_header_with(&self, nonce: &[u8], created: &str) -> String {
        let digest = password_digest(nonce, created, &self.password);
        format!(
            r#"<wsse:Security xmlns:wsse="{wsse}" xmlns:wsu="{wsu}"><wsse:UsernameToken><wsse:Username>{username}</wsse:Username><wsse:Password Type="{digest_type}">{digest}</wsse:Password><wsse:Nonce EncodingType="{encoding}">{nonce}</wsse:Nonce><wsu:Created>{created}</wsu:Created></wsse:UsernameToken></wsse:Security>"#,
            wsse = WSSE_NS,
            wsu = WSU_NS,
            username = escape(&self.username),
            digest_type = PASSWORD_DIGEST,
            digest = digest,
            encoding = BASE64_BINARY,
            nonce = STANDARD.encode(nonce),
            created = created,
        )
    }
}

// Never print the password.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `Base64(SHA1(nonce + created + password))`
pub fn password_digest(nonce: &[u8], created: &str, password: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(nonce);
    hasher.update(created.as_bytes());
    hasher.update(password.as_bytes());
    STANDARD.encode(hasher.finalize())
}

/// Escape the five XML special characters
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
