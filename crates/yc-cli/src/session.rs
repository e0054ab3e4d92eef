//! # Session
//!
//! The global flags of one `yc` run: where the ledger lives, the contract
//! configuration, and who is calling. Without `--identity` the caller is
//! anonymous; public reads still work, anything that needs a caller is
//! rejected by the contract.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use yc_contract::{Contract, ContractConfig};
use yc_core::{ClientIdentity, OrgId};
use yc_identity::{IdentityError, IdentitySource, StaticIdentity};

use crate::ledger::{load_ledger, save_ledger};

/// Identity source used when no `--identity` was given.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl IdentitySource for Anonymous {
    fn encoded_client_id(&self) -> Result<String, IdentityError> {
        Err(IdentityError::Unavailable("no --identity given".to_string()))
    }

    fn client_org(&self) -> Result<OrgId, IdentityError> {
        Err(IdentityError::Unavailable("no --org given".to_string()))
    }

    fn serving_org(&self) -> Result<OrgId, IdentityError> {
        Err(IdentityError::Unavailable("no --org given".to_string()))
    }

    fn source_name(&self) -> &str {
        "anonymous"
    }
}

/// Resolved global flags.
#[derive(Debug, Clone)]
pub struct Session {
    ledger_path: PathBuf,
    config: ContractConfig,
    identity: Option<StaticIdentity>,
}

impl Session {
    /// An anonymous session over the ledger at `ledger_path`.
    pub fn new(ledger_path: impl Into<PathBuf>, config: ContractConfig) -> Self {
        Self {
            ledger_path: ledger_path.into(),
            config,
            identity: None,
        }
    }

    /// Build a session from the raw flag values.
    ///
    /// `--identity` and `--org` go together; `--peer-org` defaults to `--org`.
    pub fn from_flags(
        ledger_path: &Path,
        config_path: Option<&Path>,
        identity: Option<&str>,
        org: Option<&str>,
        peer_org: Option<&str>,
    ) -> Result<Self> {
        let config = match config_path {
            Some(path) => ContractConfig::load(path)?,
            None => ContractConfig::default(),
        };
        let session = Self::new(ledger_path, config);
        match (identity, org) {
            (Some(identity), Some(org)) => session.with_identity(identity, org, peer_org),
            (None, None) if peer_org.is_none() => Ok(session),
            (None, None) => bail!("--peer-org requires --identity and --org"),
            (Some(_), None) => bail!("--identity requires --org"),
            (None, Some(_)) => bail!("--org requires --identity"),
        }
    }

    /// Call as `identity` of `org`, through a peer of `peer_org` if given.
    pub fn with_identity(mut self, identity: &str, org: &str, peer_org: Option<&str>) -> Result<Self> {
        let client = ClientIdentity::new(identity).context("invalid --identity")?;
        let org = OrgId::new(org).context("invalid --org")?;
        let mut source = StaticIdentity::new(client, org);
        if let Some(peer) = peer_org {
            source = source.with_serving_org(OrgId::new(peer).context("invalid --peer-org")?);
        }
        self.identity = Some(source);
        Ok(self)
    }

    /// The contract configuration in effect.
    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    /// Path of the ledger snapshot.
    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    /// The calling identity, if one was given.
    pub fn identity(&self) -> Option<&StaticIdentity> {
        self.identity.as_ref()
    }

    /// The identity source to hand to the dispatcher.
    pub fn identity_source(&self) -> &dyn IdentitySource {
        match &self.identity {
            Some(identity) => identity as &dyn IdentitySource,
            None => &Anonymous,
        }
    }

    /// Load the ledger and bind the contract to it.
    pub fn open_contract(&self) -> Result<Contract> {
        let ledger = load_ledger(&self.ledger_path)?;
        Ok(Contract::from_config(&self.config, ledger)?)
    }

    /// Persist the contract's ledger, which was loaded at `base_height`.
    /// Fails with a ledger conflict if another run saved in between.
    pub fn save(&self, contract: &Contract, base_height: u64) -> Result<()> {
        save_ledger(&self.ledger_path, contract.ledger(), base_height)
    }
}
