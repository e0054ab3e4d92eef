//! # Contract Subcommands
//!
//! One subcommand per contract function. Each is turned into an
//! [`Invocation`]: identifiers as public arguments, private values in the
//! transient map under the keys existing clients use. The ledger file is
//! rewritten only after a mutating invocation succeeded.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde_json::{json, Value};

use yc_contract::payload::{
    AGREEMENT_DELETE, COMMITMENT_DELETE, COMMITMENT_OWNER, COMMITMENT_PROPERTIES, COMMITMENT_VALUE,
};
use yc_contract::{Function, Invocation, PrivateDetail};
use yc_core::CommitmentId;
use yc_identity::IdentitySource;
use yc_store::Partition;

use crate::session::Session;

/// Contract subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a commitment owned by the caller, with a private rate.
    Create {
        /// Commitment identifier.
        #[arg(long)]
        id: String,
        /// Record type tag.
        #[arg(long = "type", default_value = "commitment")]
        object_type: String,
        /// Location of the commitment.
        #[arg(long)]
        location: String,
        /// Size, positive.
        #[arg(long)]
        size: i64,
        /// Crop, non-empty.
        #[arg(long)]
        crop: String,
        /// Private rate, positive. Stored only in the caller's partition.
        #[arg(long)]
        rate: i64,
    },

    /// Propose a rate for a commitment the caller wants to buy.
    Propose {
        /// Commitment identifier. Required with --rate.
        #[arg(long, conflicts_with = "raw")]
        id: Option<String>,
        /// Rate to propose, encoded canonically.
        #[arg(long, conflicts_with = "raw")]
        rate: Option<i64>,
        /// Proposal JSON sent byte-for-byte instead of canonical encoding.
        #[arg(long)]
        raw: Option<String>,
    },

    /// Transfer a commitment to the organization that proposed a matching rate.
    Transfer {
        /// Commitment identifier.
        #[arg(long)]
        id: String,
        /// Organization of the buyer.
        #[arg(long)]
        buyer_org: String,
    },

    /// Delete a commitment and the caller's private detail.
    Delete {
        /// Commitment identifier.
        #[arg(long)]
        id: String,
    },

    /// Withdraw the caller's pending proposal.
    Withdraw {
        /// Commitment identifier.
        #[arg(long)]
        id: String,
    },

    /// Point reads.
    Read(ReadArgs),

    /// List commitments with ids in [start, end).
    Range {
        /// Inclusive lower bound; empty is open.
        #[arg(long, default_value = "")]
        start: String,
        /// Exclusive upper bound; empty is open.
        #[arg(long, default_value = "")]
        end: String,
    },

    /// Query commitments by selector, or by type and owner.
    Query {
        /// Selector document, e.g. '{"selector":{"crop":"maize"}}'.
        #[arg(long, conflicts_with = "owner")]
        selector: Option<String>,
        /// Record type tag to match.
        #[arg(long = "type", default_value = "commitment")]
        object_type: String,
        /// Owner identity to match. Defaults to --identity.
        #[arg(long)]
        owner: Option<String>,
    },
}

/// Arguments for `yc read`.
#[derive(Args, Debug)]
pub struct ReadArgs {
    #[command(subcommand)]
    pub target: ReadTarget,
}

/// What `yc read` reads.
#[derive(Subcommand, Debug)]
pub enum ReadTarget {
    /// The public commitment record.
    Commitment {
        /// Commitment identifier.
        #[arg(long)]
        id: String,
    },

    /// A private detail from the caller's organization partition.
    Detail {
        /// Commitment identifier.
        #[arg(long)]
        id: String,
        /// Collection to read. Defaults to the caller's private collection.
        #[arg(long)]
        collection: Option<String>,
    },

    /// The pending transfer agreement.
    Agreement {
        /// Commitment identifier.
        #[arg(long)]
        id: String,
    },
}

/// Build the invocation for `command`.
pub fn invocation(command: &Command, session: &Session) -> Result<Invocation> {
    let inv = match command {
        Command::Create {
            id,
            object_type,
            location,
            size,
            crop,
            rate,
        } => Invocation::new(Function::CreateCommitment.as_str()).transient(
            COMMITMENT_PROPERTIES,
            to_bytes(&json!({
                "objectType": object_type,
                "commitmentID": id,
                "location": location,
                "size": size,
                "crop": crop,
                "rate": rate,
            }))?,
        ),

        Command::Propose { id, rate, raw } => {
            let value = match (id, rate, raw) {
                (None, None, Some(raw)) => raw.clone().into_bytes(),
                (Some(id), Some(rate), None) => {
                    let id = CommitmentId::new(id.as_str()).context("invalid --id")?;
                    PrivateDetail::new(id, *rate)
                        .context("invalid --rate")?
                        .canonical_bytes()?
                        .into_bytes()
                }
                _ => bail!("propose needs either --id with --rate, or --raw"),
            };
            Invocation::new(Function::AgreeToTransfer.as_str()).transient(COMMITMENT_VALUE, value)
        }

        Command::Transfer { id, buyer_org } => Invocation::new(Function::TransferCommitment.as_str())
            .transient(
                COMMITMENT_OWNER,
                to_bytes(&json!({ "commitmentID": id, "buyerMSP": buyer_org }))?,
            ),

        Command::Delete { id } => Invocation::new(Function::DeleteCommitment.as_str())
            .transient(COMMITMENT_DELETE, to_bytes(&json!({ "commitmentID": id }))?),

        Command::Withdraw { id } => Invocation::new(Function::DeleteTransferAgreement.as_str())
            .transient(AGREEMENT_DELETE, to_bytes(&json!({ "commitmentID": id }))?),

        Command::Read(args) => match &args.target {
            ReadTarget::Commitment { id } => Invocation::new(Function::ReadCommitment.as_str()).arg(id),
            ReadTarget::Detail { id, collection } => {
                let collection = match collection {
                    Some(c) => c.clone(),
                    None => own_collection(session)?,
                };
                Invocation::new(Function::ReadCommitmentPrivateDetails.as_str())
                    .arg(collection)
                    .arg(id)
            }
            ReadTarget::Agreement { id } => {
                Invocation::new(Function::ReadTransferAgreement.as_str()).arg(id)
            }
        },

        Command::Range { start, end } => Invocation::new(Function::GetCommitmentByRange.as_str())
            .arg(start)
            .arg(end),

        Command::Query {
            selector,
            object_type,
            owner,
        } => match (selector, owner) {
            (Some(selector), _) => Invocation::new(Function::QueryCommitments.as_str()).arg(selector),
            (None, Some(owner)) => Invocation::new(Function::QueryCommitmentByOwner.as_str())
                .arg(object_type)
                .arg(owner),
            (None, None) => {
                let Some(identity) = session.identity() else {
                    bail!("query needs --selector, --owner, or --identity");
                };
                Invocation::new(Function::QueryCommitmentByOwner.as_str())
                    .arg(object_type)
                    .arg(identity.client_id().as_str())
            }
        },
    };
    Ok(inv)
}

/// Run `command` and return the decoded output of a read, or `None` for a
/// committed mutation.
pub fn execute(command: &Command, session: &Session) -> Result<Option<Value>> {
    let invocation = invocation(command, session)?;
    let function = Function::parse(&invocation.function)?;
    let contract = session.open_contract()?;
    let base_height = contract.ledger().height();

    let output = contract
        .invoke(&invocation, session.identity_source())
        .map_err(|e| {
            let kind = e.kind();
            anyhow::Error::new(e).context(format!("{function} rejected ({kind})"))
        })?;

    if function.is_mutating() {
        session.save(&contract, base_height)?;
        tracing::info!(
            function = %function,
            height = contract.ledger().height(),
            ledger = %session.ledger_path().display(),
            "ledger updated"
        );
        return Ok(None);
    }
    let value = serde_json::from_slice(&output).context("contract returned malformed JSON")?;
    Ok(Some(value))
}

/// Execute the contract subcommand and print its result.
pub fn run_command(command: &Command, session: &Session) -> Result<u8> {
    match execute(command, session)? {
        Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        None => println!("OK"),
    }
    Ok(0)
}

fn own_collection(session: &Session) -> Result<String> {
    let org = session
        .identity_source()
        .client_org()
        .context("read detail needs --collection or --org")?;
    let naming = session.config().naming()?;
    Ok(naming.collection(&Partition::org(&org)))
}

fn to_bytes(value: &Value) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}
