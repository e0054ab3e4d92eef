//! # Invocation Dispatcher
//!
//! Routes a named [`Invocation`] to the lifecycle manager. Each invocation
//! runs in its own staged ledger call. A mutating call is committed only if
//! the operation returned `Ok`; on any error the staged call is dropped and
//! no partition changes. Read functions are never committed.
//!
//! Function names and transient keys are the ones existing clients send.

use serde::Serialize;
use yc_core::{CanonicalizationError, CommitmentId};
use yc_identity::{IdentitySource, IdentityVerifier};
use yc_store::{CollectionBackend, Ledger, MemoryLedger, PartitionNaming, PartitionedStore, StagedCall};

use crate::config::{ConfigError, ContractConfig};
use crate::error::ContractError;
use crate::lifecycle::CommitmentLifecycleManager;
use crate::payload::{
    CommitmentProperties, CommitmentReference, RateProposal, TransferRequest, TransientMap,
    AGREEMENT_DELETE, COMMITMENT_DELETE,
};

/// The invocable functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    /// Create a commitment from `commitment_properties`.
    CreateCommitment,
    /// Propose a rate from `commitment_value`.
    AgreeToTransfer,
    /// Transfer per `commitment_owner`.
    TransferCommitment,
    /// Delete per `commitment_delete`.
    DeleteCommitment,
    /// Withdraw a proposal per `agreement_delete`.
    DeleteTransferAgreement,
    /// `ReadCommitment(id)`.
    ReadCommitment,
    /// `ReadCommitmentPrivateDetails(collection, id)`.
    ReadCommitmentPrivateDetails,
    /// `ReadTransferAgreement(id)`.
    ReadTransferAgreement,
    /// `GetCommitmentByRange(start, end)`.
    GetCommitmentByRange,
    /// `QueryCommitmentByOwner(objectType, owner)`.
    QueryCommitmentByOwner,
    /// `QueryCommitments(selector)`.
    QueryCommitments,
}

impl Function {
    /// Every function, in declaration order.
    pub const ALL: [Function; 11] = [
        Self::CreateCommitment,
        Self::AgreeToTransfer,
        Self::TransferCommitment,
        Self::DeleteCommitment,
        Self::DeleteTransferAgreement,
        Self::ReadCommitment,
        Self::ReadCommitmentPrivateDetails,
        Self::ReadTransferAgreement,
        Self::GetCommitmentByRange,
        Self::QueryCommitmentByOwner,
        Self::QueryCommitments,
    ];

    /// The invocation name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateCommitment => "CreateCommitment",
            Self::AgreeToTransfer => "AgreeToTransfer",
            Self::TransferCommitment => "TransferCommitment",
            Self::DeleteCommitment => "DeleteCommitment",
            Self::DeleteTransferAgreement => "DeleteTransferAgreement",
            Self::ReadCommitment => "ReadCommitment",
            Self::ReadCommitmentPrivateDetails => "ReadCommitmentPrivateDetails",
            Self::ReadTransferAgreement => "ReadTransferAgreement",
            Self::GetCommitmentByRange => "GetCommitmentByRange",
            Self::QueryCommitmentByOwner => "QueryCommitmentByOwner",
            Self::QueryCommitments => "QueryCommitments",
        }
    }

    /// Look up a function by name.
    ///
    /// `DeleteTranferAgreement` is accepted as the name deployed clients
    /// already use for withdrawal.
    pub fn parse(name: &str) -> Result<Self, ContractError> {
        if name == "DeleteTranferAgreement" {
            return Ok(Self::DeleteTransferAgreement);
        }
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == name)
            .ok_or_else(|| ContractError::Validation(format!("unknown function {name:?}")))
    }

    /// Whether the function writes to the ledger.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::CreateCommitment
                | Self::AgreeToTransfer
                | Self::TransferCommitment
                | Self::DeleteCommitment
                | Self::DeleteTransferAgreement
        )
    }

    /// Number of public arguments.
    pub fn arity(&self) -> usize {
        match self {
            Self::CreateCommitment
            | Self::AgreeToTransfer
            | Self::TransferCommitment
            | Self::DeleteCommitment
            | Self::DeleteTransferAgreement => 0,
            Self::ReadCommitment | Self::ReadTransferAgreement | Self::QueryCommitments => 1,
            Self::ReadCommitmentPrivateDetails
            | Self::GetCommitmentByRange
            | Self::QueryCommitmentByOwner => 2,
        }
    }
}

impl std::fmt::Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One call: a function name, its public arguments, and its private
/// transient inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Function name.
    pub function: String,
    /// Public arguments.
    pub args: Vec<String>,
    /// Private inputs. Never logged.
    pub transient: TransientMap,
}

impl Invocation {
    /// An invocation of `function` with no arguments.
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            ..Self::default()
        }
    }

    /// Append a public argument.
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Add a transient entry.
    pub fn transient(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.transient.insert(key, value);
        self
    }
}

/// The protocol bound to a ledger and a collection naming.
///
/// Any [`Ledger`] works; [`MemoryLedger`] is the default.
#[derive(Debug, Clone)]
pub struct Contract<L = MemoryLedger> {
    naming: PartitionNaming,
    ledger: L,
}

impl<L: Ledger> Contract<L> {
    /// Bind to `ledger` using `naming`.
    pub fn new(naming: PartitionNaming, ledger: L) -> Self {
        Self { naming, ledger }
    }

    /// Bind to `ledger` using the naming in `config`.
    pub fn from_config(config: &ContractConfig, ledger: L) -> Result<Self, ConfigError> {
        Ok(Self::new(config.naming()?, ledger))
    }

    /// The underlying ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// The collection naming in use.
    pub fn naming(&self) -> &PartitionNaming {
        &self.naming
    }

    /// Run one invocation as an atomic call.
    ///
    /// Read functions return JSON (`null` when the record is absent);
    /// mutating functions return an empty payload.
    pub fn invoke(
        &self,
        invocation: &Invocation,
        identity: &dyn IdentitySource,
    ) -> Result<Vec<u8>, ContractError> {
        let function = Function::parse(&invocation.function)?;
        if invocation.args.len() != function.arity() {
            return Err(ContractError::Validation(format!(
                "{function} expects {} argument(s), got {}",
                function.arity(),
                invocation.args.len()
            )));
        }
        tracing::debug!(function = %function, args = ?invocation.args, "invoke");

        let mut store = PartitionedStore::new(self.naming.clone(), self.ledger.begin());
        let result = route(
            &mut CommitmentLifecycleManager::new(&mut store),
            &self.naming,
            function,
            invocation,
            identity,
        );
        let output = match result {
            Ok(output) => output,
            Err(err) => {
                tracing::info!(function = %function, kind = %err.kind(), error = %err, "invocation rejected");
                return Err(err);
            }
        };

        if function.is_mutating() {
            let receipt = store.into_backend().commit()?;
            tracing::info!(
                function = %function,
                height = receipt.height,
                writes = receipt.writes,
                "invocation committed"
            );
        }
        Ok(output)
    }
}

fn route<B: CollectionBackend>(
    manager: &mut CommitmentLifecycleManager<'_, B>,
    naming: &PartitionNaming,
    function: Function,
    invocation: &Invocation,
    identity: &dyn IdentitySource,
) -> Result<Vec<u8>, ContractError> {
    let resolve = || IdentityVerifier::new(identity).resolve();
    let args = &invocation.args;
    let transient = &invocation.transient;

    match function {
        Function::CreateCommitment => {
            let props = CommitmentProperties::from_transient(transient)?;
            manager.create(&resolve()?, props)?;
            Ok(Vec::new())
        }
        Function::AgreeToTransfer => {
            let proposal = RateProposal::from_transient(transient)?;
            manager.propose_agreement(&resolve()?, proposal)?;
            Ok(Vec::new())
        }
        Function::TransferCommitment => {
            let request = TransferRequest::from_transient(transient)?;
            manager.transfer(&resolve()?, request)?;
            Ok(Vec::new())
        }
        Function::DeleteCommitment => {
            let reference = CommitmentReference::from_transient(transient, COMMITMENT_DELETE)?;
            manager.delete(&resolve()?, &reference.id)?;
            Ok(Vec::new())
        }
        Function::DeleteTransferAgreement => {
            let reference = CommitmentReference::from_transient(transient, AGREEMENT_DELETE)?;
            manager.withdraw_agreement(&resolve()?, &reference.id)?;
            Ok(Vec::new())
        }
        Function::ReadCommitment => {
            let id = CommitmentId::new(args[0].as_str())?;
            to_json(&manager.read_commitment(&id)?)
        }
        Function::ReadCommitmentPrivateDetails => {
            let partition = naming.partition_of(&args[0]).ok_or_else(|| {
                ContractError::Validation(format!("unknown collection {:?}", args[0]))
            })?;
            let id = CommitmentId::new(args[1].as_str())?;
            to_json(&manager.read_private_detail(&resolve()?, &partition, &id)?)
        }
        Function::ReadTransferAgreement => {
            let id = CommitmentId::new(args[0].as_str())?;
            to_json(&manager.read_transfer_agreement(&id)?)
        }
        Function::GetCommitmentByRange => to_json(&manager.range_commitments(&args[0], &args[1])?),
        Function::QueryCommitmentByOwner => {
            to_json(&manager.query_commitments_by_owner(&args[0], &args[1])?)
        }
        Function::QueryCommitments => to_json(&manager.query_commitments(&args[0])?),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>, ContractError> {
    serde_json::to_vec(value).map_err(|e| ContractError::Encoding(CanonicalizationError::from(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::payload::{COMMITMENT_OWNER, COMMITMENT_PROPERTIES, COMMITMENT_VALUE};
    use yc_core::{ClientIdentity, OrgId};
    use yc_identity::{IdentityError, StaticIdentity};

    struct NoIdentity;

    impl IdentitySource for NoIdentity {
        fn encoded_client_id(&self) -> Result<String, IdentityError> {
            Err(IdentityError::Unavailable("no certificate".into()))
        }
        fn client_org(&self) -> Result<OrgId, IdentityError> {
            Err(IdentityError::Unavailable("no certificate".into()))
        }
        fn serving_org(&self) -> Result<OrgId, IdentityError> {
            Err(IdentityError::Unavailable("no certificate".into()))
        }
        fn source_name(&self) -> &str {
            "none"
        }
    }

    fn identity(name: &str, org: &str) -> StaticIdentity {
        StaticIdentity::new(
            ClientIdentity::new(format!("x509::CN={name}")).unwrap(),
            OrgId::new(org).unwrap(),
        )
    }

    fn contract() -> Contract {
        Contract::new(PartitionNaming::default(), MemoryLedger::new())
    }

    fn create_c1(contract: &Contract) {
        let inv = Invocation::new("CreateCommitment").transient(
            COMMITMENT_PROPERTIES,
            r#"{"objectType":"commitment","commitmentID":"C1","location":"field-3","size":12,"crop":"maize","rate":100}"#,
        );
        let out = contract.invoke(&inv, &identity("alice", "Org1MSP")).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_function_names_round_trip() {
        for f in Function::ALL {
            assert_eq!(Function::parse(f.as_str()).unwrap(), f);
        }
        assert_eq!(
            Function::parse("DeleteTranferAgreement").unwrap(),
            Function::DeleteTransferAgreement
        );
    }

    #[test]
    fn test_unknown_function() {
        let err = contract()
            .invoke(&Invocation::new("Mint"), &NoIdentity)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_wrong_arity() {
        let err = contract()
            .invoke(&Invocation::new("ReadCommitment"), &NoIdentity)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = contract()
            .invoke(&Invocation::new("CreateCommitment").arg("C1"), &NoIdentity)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_read_absent_returns_null() {
        let out = contract()
            .invoke(&Invocation::new("ReadCommitment").arg("C1"), &NoIdentity)
            .unwrap();
        assert_eq!(out, b"null");
    }

    #[test]
    fn test_public_reads_need_no_identity() {
        let c = contract();
        create_c1(&c);
        let out = c
            .invoke(&Invocation::new("ReadCommitment").arg("C1"), &NoIdentity)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["owner"], "x509::CN=alice");
        assert_eq!(value["commitmentID"], "C1");

        let out = c
            .invoke(&Invocation::new("GetCommitmentByRange").arg("").arg(""), &NoIdentity)
            .unwrap();
        let list: Vec<serde_json::Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_mutation_requires_identity() {
        let c = contract();
        let inv = Invocation::new("CreateCommitment").transient(
            COMMITMENT_PROPERTIES,
            r#"{"objectType":"commitment","commitmentID":"C1","location":"l","size":1,"crop":"c","rate":1}"#,
        );
        let err = c.invoke(&inv, &NoIdentity).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert_eq!(c.ledger().height(), 0);
    }

    #[test]
    fn test_missing_transient_key() {
        let err = contract()
            .invoke(&Invocation::new("AgreeToTransfer"), &identity("bob", "Org2MSP"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_failed_mutation_commits_nothing() {
        let c = contract();
        create_c1(&c);
        let bob = identity("bob", "Org2MSP");
        c.invoke(
            &Invocation::new("AgreeToTransfer")
                .transient(COMMITMENT_VALUE, r#"{"commitmentID":"C1","rate":101}"#),
            &bob,
        )
        .unwrap();
        let before = c.ledger().snapshot();

        let err = c
            .invoke(
                &Invocation::new("TransferCommitment")
                    .transient(COMMITMENT_OWNER, r#"{"commitmentID":"C1","buyerMSP":"Org2MSP"}"#),
                &identity("alice", "Org1MSP"),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Consistency);
        assert_eq!(c.ledger().snapshot(), before);
    }

    #[test]
    fn test_read_private_details_by_collection() {
        let c = contract();
        create_c1(&c);
        let alice = identity("alice", "Org1MSP");
        let out = c
            .invoke(
                &Invocation::new("ReadCommitmentPrivateDetails")
                    .arg("Org1MSPPrivateCollection")
                    .arg("C1"),
                &alice,
            )
            .unwrap();
        assert_eq!(out, br#"{"commitmentID":"C1","rate":100}"#);

        let err = c
            .invoke(
                &Invocation::new("ReadCommitmentPrivateDetails").arg("nope").arg("C1"),
                &alice,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_reads_do_not_advance_height() {
        let c = contract();
        create_c1(&c);
        c.invoke(&Invocation::new("QueryCommitments").arg(r#"{"selector":{}}"#), &NoIdentity)
            .unwrap();
        assert_eq!(c.ledger().height(), 1);
    }

    /// A ledger that counts the calls opened against it.
    struct CountingLedger {
        inner: MemoryLedger,
        opened: std::sync::atomic::AtomicUsize,
    }

    impl Ledger for CountingLedger {
        type Call = yc_store::LedgerCall;

        fn begin(&self) -> yc_store::LedgerCall {
            self.opened.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.begin()
        }
    }

    #[test]
    fn test_custom_ledger_gets_one_call_per_invocation() {
        let c = Contract::new(
            PartitionNaming::default(),
            CountingLedger {
                inner: MemoryLedger::new(),
                opened: Default::default(),
            },
        );
        let inv = Invocation::new("CreateCommitment").transient(
            COMMITMENT_PROPERTIES,
            r#"{"objectType":"commitment","commitmentID":"C1","location":"l","size":1,"crop":"c","rate":1}"#,
        );
        c.invoke(&inv, &identity("alice", "Org1MSP")).unwrap();
        c.invoke(&Invocation::new("ReadCommitment").arg("C1"), &NoIdentity)
            .unwrap();

        let ledger = c.ledger();
        assert_eq!(ledger.opened.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert_eq!(ledger.inner.height(), 1);
        assert!(ledger.inner.committed("commitmentCollection", "C1").is_some());
    }

    #[test]
    fn test_from_config() {
        let config = ContractConfig::from_yaml_str("shared_collection: yields\n").unwrap();
        let c = Contract::from_config(&config, MemoryLedger::new()).unwrap();
        create_c1(&c);
        assert!(c.ledger().committed("yields", "C1").is_some());
    }
}
