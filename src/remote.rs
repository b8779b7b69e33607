//! The `[remote]` section: which hosting platform to publish to and how to
//! authenticate against it.

use std::fmt;

use serde::Serialize;

use crate::env::EnvOrLiteral;
use crate::reader::FieldReader;
use crate::types::HvcsClient;

pub const DEFAULT_REMOTE_NAME: &str = "origin";

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RemoteConfig {
    /// Git remote to push to.
    pub name: String,

    #[serde(rename = "type")]
    pub kind: HvcsClient,

    /// `None` unless written in a document or set with [`set_token`](Self::set_token).
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<EnvOrLiteral>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<EnvOrLiteral>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_domain: Option<String>,

    pub ignore_token_for_push: bool,

    /// Allow plain `http://` domains.
    pub insecure: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_REMOTE_NAME.to_string(),
            kind: HvcsClient::default(),
            token: None,
            url: None,
            domain: None,
            api_domain: None,
            ignore_token_for_push: false,
            insecure: false,
        }
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match &self.token {
            Some(EnvOrLiteral::Literal(_)) => "Some(Literal(****))".to_string(),
            Some(EnvOrLiteral::Env(var)) if var.default.is_some() => {
                format!("Some(Env({:?}, default: ****))", var.env)
            }
            other => format!("{other:?}"),
        };
        f.debug_struct("RemoteConfig")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("token", &format_args!("{token}"))
            .field("url", &self.url)
            .field("domain", &self.domain)
            .field("api_domain", &self.api_domain)
            .field("ignore_token_for_push", &self.ignore_token_for_push)
            .field("insecure", &self.insecure)
            .finish()
    }
}

impl RemoteConfig {
    /// The configured token, or the platform's token variable, see
    /// [`HvcsClient::default_token_env`].
    pub fn token(&self) -> EnvOrLiteral {
        self.token
            .clone()
            .unwrap_or_else(|| self.kind.default_token().into())
    }

    /// The token as written in the configuration, if it was.
    pub fn configured_token(&self) -> Option<&EnvOrLiteral> {
        self.token.as_ref()
    }

    pub fn set_token(&mut self, token: impl Into<EnvOrLiteral>) {
        self.token = Some(token.into());
    }

    /// Whether `token` follows `type` rather than being configured.
    pub fn token_is_derived(&self) -> bool {
        self.token.is_none()
    }

    pub(crate) fn read(r: &mut FieldReader) -> Self {
        let defaults = Self::default();
        let insecure = r.or("insecure", defaults.insecure);
        let domain: Option<String> = r.optional("domain");
        let api_domain: Option<String> = r.optional("api_domain");

        for (key, value) in [("domain", &domain), ("api_domain", &api_domain)] {
            if let Some(value) = value
                && value.starts_with("http://")
                && !insecure
            {
                r.constraint(
                    key,
                    format!("'{value}' uses plain http; set remote.insecure = true to allow it"),
                );
            }
        }

        Self {
            name: r.or("name", defaults.name),
            kind: r.or("type", defaults.kind),
            token: r.optional("token"),
            url: r.optional("url"),
            domain,
            api_domain,
            ignore_token_for_push: r.or("ignore_token_for_push", defaults.ignore_token_for_push),
            insecure,
        }
    }
}
