//! Policy commands
//!
//! `validate` only runs the validation engine. `save` and `delete` drive a
//! full editor session against the configured policy directory.

use anyhow::{bail, Context, Result};
use bastion_core::id::{PolicyId, ServiceId};
use bastion_core::EditorConfig;
use bastion_policy::lifecycle::{DeleteOutcome, EditorCollaborators, PolicyEditor, SaveOutcome};
use bastion_policy::messages::{DefaultCatalog, MessageCatalog};
use bastion_policy::model::{Policy, ServiceRef};
use bastion_policy::store::{JsonDirPolicyStore, PolicyStore};
use bastion_policy::{PolicyValidationAggregator, RuleSetValidator};
use clap::Args;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::console::ConsoleUi;

/// Arguments for the validate command
#[derive(Args)]
pub struct ValidateArgs {
    /// Policy document (JSON)
    pub file: PathBuf,

    /// Print verdicts and outcome as JSON
    #[clap(long)]
    pub json: bool,
}

/// Arguments for the save command
#[derive(Args)]
pub struct SaveArgs {
    /// Policy document (JSON)
    pub file: PathBuf,

    /// Numeric id of the owning service
    #[clap(long)]
    pub service_id: ServiceId,

    /// Name of the owning service, when the document does not name one
    #[clap(long)]
    pub service: Option<String>,
}

/// Arguments for the delete command
#[derive(Args)]
pub struct DeleteArgs {
    /// Id of the stored policy
    pub id: PolicyId,

    /// Numeric id of the owning service
    #[clap(long)]
    pub service_id: ServiceId,

    /// Do not ask for confirmation
    #[clap(long)]
    pub yes: bool,
}

/// Arguments for the list command
#[derive(Args)]
pub struct ListArgs {
    /// Service name
    #[clap(long)]
    pub service: String,
}

fn read_policy(path: &Path) -> Result<Policy> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not a policy document", path.display()))
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Implementation of the validate command
pub fn execute_validate(args: &ValidateArgs) -> Result<bool> {
    let policy = read_policy(&args.file)?;
    let verdicts = RuleSetValidator::new().validate_policy(&policy);
    let outcome = PolicyValidationAggregator::new().aggregate(&verdicts);

    if args.json {
        let report = json!({ "verdicts": verdicts, "outcome": outcome });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(outcome.proceed);
    }

    for (kind, verdict) in verdicts.iter() {
        println!(
            "{:<16} groups={} users={} group-perms={} user-perms={} conditions={}",
            kind.as_str(),
            yes_no(verdict.group_set),
            yes_no(verdict.user_set),
            yes_no(verdict.perm_set),
            yes_no(verdict.user_perm),
            yes_no(verdict.cond_set),
        );
    }

    match outcome.message {
        Some(message) if !outcome.proceed => {
            let list = outcome.failed_list.map(|l| l.as_str()).unwrap_or("policy");
            eprintln!("Blocked ({}): {}", list, DefaultCatalog.text(message));
            Ok(false)
        }
        _ => {
            println!("Policy can be saved");
            Ok(true)
        }
    }
}

/// Implementation of the save command
pub async fn execute_save(args: &SaveArgs, config: EditorConfig) -> Result<bool> {
    let policy = read_policy(&args.file)?;

    let service_name = match (&args.service, policy.service.is_empty()) {
        (Some(name), _) => name.clone(),
        (None, false) => policy.service.clone(),
        (None, true) => bail!("the document names no service; pass --service"),
    };

    let store = Arc::new(JsonDirPolicyStore::new(config.store_dir.clone()));
    let ui = Arc::new(ConsoleUi::new(false));
    let collaborators = EditorCollaborators::new(ui.clone(), ui);
    let service = ServiceRef::new(args.service_id, service_name, "");

    let editor = PolicyEditor::open(store, service, config, collaborators, policy)?;

    match editor.save().await? {
        SaveOutcome::Persisted { id, .. } => {
            println!("Stored policy {}", id);
            Ok(true)
        }
        SaveOutcome::FieldErrors(errors) => {
            for error in errors {
                eprintln!("{}", error);
            }
            Ok(false)
        }
        SaveOutcome::Blocked { .. } | SaveOutcome::Failed { .. } => Ok(false),
    }
}

/// Implementation of the delete command
pub async fn execute_delete(args: &DeleteArgs, config: EditorConfig) -> Result<bool> {
    let store = Arc::new(JsonDirPolicyStore::new(config.store_dir.clone()));
    let policy = store
        .get(args.id)
        .await
        .with_context(|| format!("cannot load policy {}", args.id))?;

    let ui = Arc::new(ConsoleUi::new(args.yes));
    let collaborators = EditorCollaborators::new(ui.clone(), ui);
    let service = ServiceRef::new(args.service_id, policy.service.clone(), "");

    let editor = PolicyEditor::open(store, service, config, collaborators, policy)?;

    match editor.delete().await? {
        DeleteOutcome::Declined => {
            println!("Nothing deleted");
            Ok(true)
        }
        DeleteOutcome::Deleted(_) => Ok(true),
        DeleteOutcome::Failed { .. } => Ok(false),
    }
}

/// Implementation of the list command
pub async fn execute_list(args: &ListArgs, config: &EditorConfig) -> Result<bool> {
    let store = JsonDirPolicyStore::new(config.store_dir.clone());
    let policies = store.list_for_service(&args.service).await?;

    for policy in &policies {
        println!(
            "{}\t{}\t{}\taudit={}",
            policy.id.map(|id| id.to_string()).unwrap_or_default(),
            policy.name,
            if policy.is_enabled { "enabled" } else { "disabled" },
            yes_no(policy.is_audit_enabled),
        );
    }

    Ok(true)
}
