//! # Identity Sources
//!
//! [`IdentitySource`] is the collaborator interface to the platform's
//! credential subsystem. [`StaticIdentity`] is a fixed source for tests and
//! the CLI.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use yc_core::{ClientIdentity, OrgId};

use crate::error::IdentityError;

/// Provides the raw identity facts of the current call.
///
/// Implementations must be `Send + Sync` so a single source can serve
/// calls staged from several threads.
pub trait IdentitySource: Send + Sync {
    /// The submitting client's id in the subsystem's opaque encoding
    /// (standard base64 of the identity string).
    fn encoded_client_id(&self) -> Result<String, IdentityError>;

    /// The submitting client's organization.
    fn client_org(&self) -> Result<OrgId, IdentityError>;

    /// The organization of the peer serving the call.
    fn serving_org(&self) -> Result<OrgId, IdentityError>;

    /// Human-readable name for diagnostics.
    fn source_name(&self) -> &str;
}

/// A fixed identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity {
    client_id: ClientIdentity,
    client_org: OrgId,
    serving_org: OrgId,
}

impl StaticIdentity {
    /// A client of `org` calling through a peer of the same org.
    pub fn new(client_id: ClientIdentity, org: OrgId) -> Self {
        Self {
            client_id,
            serving_org: org.clone(),
            client_org: org,
        }
    }

    /// Route the call through a peer of `org` instead.
    pub fn with_serving_org(mut self, org: OrgId) -> Self {
        self.serving_org = org;
        self
    }

    /// The plain client identity.
    pub fn client_id(&self) -> &ClientIdentity {
        &self.client_id
    }
}

impl IdentitySource for StaticIdentity {
    fn encoded_client_id(&self) -> Result<String, IdentityError> {
        Ok(STANDARD.encode(self.client_id.as_str()))
    }

    fn client_org(&self) -> Result<OrgId, IdentityError> {
        Ok(self.client_org.clone())
    }

    fn serving_org(&self) -> Result<OrgId, IdentityError> {
        Ok(self.serving_org.clone())
    }

    fn source_name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_identity_encodes_base64() {
        let source = StaticIdentity::new(
            ClientIdentity::new("x509::CN=alice").unwrap(),
            OrgId::new("Org1MSP").unwrap(),
        );
        assert_eq!(source.encoded_client_id().unwrap(), "eDUwOTo6Q049YWxpY2U=");
        assert_eq!(source.serving_org().unwrap().as_str(), "Org1MSP");
    }

    #[test]
    fn test_with_serving_org() {
        let source = StaticIdentity::new(
            ClientIdentity::new("x509::CN=alice").unwrap(),
            OrgId::new("Org1MSP").unwrap(),
        )
        .with_serving_org(OrgId::new("Org2MSP").unwrap());
        assert_eq!(source.client_org().unwrap().as_str(), "Org1MSP");
        assert_eq!(source.serving_org().unwrap().as_str(), "Org2MSP");
    }
}
