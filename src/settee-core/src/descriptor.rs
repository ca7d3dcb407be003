use percent_encoding::percent_decode_str;
use std::fmt;
use url::Url;

/// Username and optional password embedded in a connection string
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Parsed connection string: `scheme://[user[:pass]@]host[:port]/dbname`
///
/// The default value is an unconstructed descriptor. Every accessor is total
/// and yields an empty string (or `false`) when nothing was parsed.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    url: Option<Url>,
    // `Url` drops a port equal to the scheme default; keep it as written
    written_port: Option<u16>,
}

impl ConnectionDescriptor {
    /// Parse a connection string. Scheme and reachability are not checked.
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(raw)?;
        let written_port = url.port().or_else(|| port_as_written(raw));
        Ok(Self {
            url: Some(url),
            written_port,
        })
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// True only for the `https` scheme
    pub fn is_secure(&self) -> bool {
        self.url.as_ref().is_some_and(|url| url.scheme() == "https")
    }

    /// Path with its leading `/` stripped, kept in its percent-encoded form
    pub fn database_name(&self) -> &str {
        self.url
            .as_ref()
            .and_then(|url| url.path().strip_prefix('/'))
            .unwrap_or_default()
    }

    /// `scheme://host[:port]` with no path or query
    pub fn base_url(&self) -> String {
        let Some(url) = &self.url else {
            return String::new();
        };
        let Some(host) = url.host_str() else {
            return String::new();
        };

        match self.written_port {
            Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
            None => format!("{}://{}", url.scheme(), host),
        }
    }

    /// URL listing every database on the server
    pub fn all_dbs_url(&self) -> String {
        let base = self.base_url();
        if base.is_empty() {
            return base;
        }
        format!("{}/_all_dbs", base)
    }

    pub fn database_url(&self) -> String {
        let base = self.base_url();
        let db = self.database_name();
        if base.is_empty() || db.is_empty() {
            return String::new();
        }
        format!("{}/{}", base, db)
    }

    /// Userinfo from the connection string, percent-decoded
    pub fn credentials(&self) -> Option<Credentials> {
        let url = self.url.as_ref()?;
        let username = url.username();
        let password = url.password();
        if username.is_empty() && password.is_none() {
            return None;
        }

        Some(Credentials {
            username: decode(username),
            password: password.map(decode),
        })
    }
}

impl fmt::Debug for ConnectionDescriptor {
    // Url's Debug output would print the password
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("base_url", &self.base_url())
            .field("database", &self.database_name())
            .field("credentials", &self.credentials())
            .finish()
    }
}

/// Port from the authority of the raw connection string, if one is spelled out
fn port_as_written(raw: &str) -> Option<u16> {
    let (_, rest) = raw.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host_port)| host_port);
    let (_, port) = host_port.rsplit_once(':')?;
    port.parse().ok()
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
