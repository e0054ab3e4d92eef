//! # Identity Verifier
//!
//! Decodes the client id and resolves the caller's organization facts.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use yc_core::{ClientIdentity, OrgId};

use crate::error::IdentityError;
use crate::source::IdentitySource;

/// The resolved identity of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Decoded, organization-scoped client identity.
    pub identity: ClientIdentity,
    /// The client's organization.
    pub org: OrgId,
    /// The serving peer's organization.
    pub serving_org: OrgId,
}

impl Caller {
    /// Fail unless the client and the serving peer share an organization.
    pub fn require_same_org(&self) -> Result<(), IdentityError> {
        if self.org != self.serving_org {
            return Err(IdentityError::OrgMismatch {
                client: self.org.clone(),
                peer: self.serving_org.clone(),
            });
        }
        Ok(())
    }
}

/// Resolves caller facts from an [`IdentitySource`].
pub struct IdentityVerifier<'a> {
    source: &'a dyn IdentitySource,
}

impl<'a> IdentityVerifier<'a> {
    /// Wrap a source.
    pub fn new(source: &'a dyn IdentitySource) -> Self {
        Self { source }
    }

    /// The decoded client identity.
    ///
    /// # Errors
    ///
    /// [`IdentityError::Undecodable`] if the encoded id is not base64, not
    /// UTF-8, or empty once decoded.
    pub fn caller_identity(&self) -> Result<ClientIdentity, IdentityError> {
        let encoded = self.source.encoded_client_id()?;
        let raw = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| IdentityError::Undecodable(e.to_string()))?;
        let decoded =
            String::from_utf8(raw).map_err(|e| IdentityError::Undecodable(e.to_string()))?;
        ClientIdentity::new(decoded).map_err(|e| IdentityError::Undecodable(e.to_string()))
    }

    /// The client's organization.
    pub fn caller_org(&self) -> Result<OrgId, IdentityError> {
        self.source.client_org()
    }

    /// The serving peer's organization.
    pub fn serving_org(&self) -> Result<OrgId, IdentityError> {
        self.source.serving_org()
    }

    /// Fail unless [`caller_org()`](Self::caller_org) equals
    /// [`serving_org()`](Self::serving_org).
    pub fn require_same_org(&self) -> Result<(), IdentityError> {
        let client = self.caller_org()?;
        let peer = self.serving_org()?;
        if client != peer {
            return Err(IdentityError::OrgMismatch { client, peer });
        }
        Ok(())
    }

    /// Resolve all caller facts once.
    pub fn resolve(&self) -> Result<Caller, IdentityError> {
        let caller = Caller {
            identity: self.caller_identity()?,
            org: self.caller_org()?,
            serving_org: self.serving_org()?,
        };
        tracing::debug!(
            source = self.source.source_name(),
            identity = %caller.identity,
            org = %caller.org,
            serving_org = %caller.serving_org,
            "resolved caller"
        );
        Ok(caller)
    }
}
