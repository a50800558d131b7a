//! Policy, mapping and destination command handlers.

use std::fmt::Write as _;

use starmap_api::Transport;
use starmap_core::{Destination, Mapping, Policy, StarmapClient};
use tabled::Tabled;

use crate::cli::{GlobalOpts, MappingArgs, PolicyArgs};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct PolicyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Workflow")]
    workflow: String,
    #[tabled(rename = "Mappings")]
    mappings: usize,
}

impl From<&Policy> for PolicyRow {
    fn from(p: &Policy) -> Self {
        Self {
            id: p.id().unwrap_or("-").to_owned(),
            name: p.name().to_owned(),
            workflow: p.workflow().to_string(),
            mappings: p.mappings().len(),
        }
    }
}

#[derive(Tabled)]
struct MappingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Version Match")]
    version_match: String,
    #[tabled(rename = "Destinations")]
    destinations: usize,
}

impl From<&Mapping> for MappingRow {
    fn from(m: &Mapping) -> Self {
        Self {
            id: m.id().unwrap_or("-").to_owned(),
            account: m.marketplace_account().to_owned(),
            version_match: m
                .version_fnmatch()
                .or(m.version_regexmatch())
                .unwrap_or("*")
                .to_owned(),
            destinations: m.destinations().len(),
        }
    }
}

#[derive(Tabled)]
struct DestinationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Arch")]
    architecture: String,
    #[tabled(rename = "Overwrite")]
    overwrite: bool,
    #[tabled(rename = "Restrict Version")]
    restrict_version: bool,
}

impl From<&Destination> for DestinationRow {
    fn from(d: &Destination) -> Self {
        Self {
            id: d.id().unwrap_or("-").to_owned(),
            destination: d.destination().to_owned(),
            architecture: d.architecture().unwrap_or("-").to_owned(),
            overwrite: d.overwrite(),
            restrict_version: d.restrict_version(),
        }
    }
}

// ── Detail views ────────────────────────────────────────────────────

fn policy_detail(p: &Policy) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:        {}", p.id().unwrap_or("-"));
    let _ = writeln!(out, "Name:      {}", p.name());
    let _ = writeln!(out, "Workflow:  {}", p.workflow());
    let _ = write!(out, "Mappings:  {}", p.mappings().len());
    for m in p.mappings() {
        let _ = write!(
            out,
            "\n  - {} ({} destinations)",
            m.marketplace_account(),
            m.destinations().len()
        );
    }
    out
}

fn mapping_detail(m: &Mapping) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:        {}", m.id().unwrap_or("-"));
    let _ = writeln!(out, "Account:   {}", m.marketplace_account());
    if let Some(pattern) = m.version_fnmatch() {
        let _ = writeln!(out, "Fnmatch:   {pattern}");
    }
    if let Some(pattern) = m.version_regexmatch() {
        let _ = writeln!(out, "Regex:     {pattern}");
    }
    let _ = write!(out, "Destinations: {}", m.destinations().len());
    for d in m.destinations() {
        let _ = write!(out, "\n  - {}", d.destination());
    }
    out
}

fn destination_detail(d: &Destination) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:           {}", d.id().unwrap_or("-"));
    let _ = writeln!(out, "Destination:  {}", d.destination());
    let _ = writeln!(out, "Architecture: {}", d.architecture().unwrap_or("-"));
    let _ = writeln!(out, "Overwrite:    {}", d.overwrite());
    let _ = write!(out, "Restrict:     {}", d.restrict_version());
    if let Some(provider) = d.provider() {
        let _ = write!(out, "\nProvider:     {provider}");
    }
    out
}

fn not_found(resource_type: &str, id: &str, hint: &str) -> CliError {
    CliError::NotFound {
        resource_type: resource_type.into(),
        identifier: id.into(),
        hint: hint.into(),
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn list_policies<T: Transport>(
    client: &StarmapClient<T>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let policies = client.list_policies().await?;
    let out = output::render_rows(
        &global.output,
        &policies[..],
        |ps| ps.iter().map(PolicyRow::from).collect(),
        |ps| ps.iter().filter_map(Policy::id).map(str::to_owned).collect(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn policy<T: Transport>(
    client: &StarmapClient<T>,
    args: PolicyArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let policy = client
        .get_policy(&args.id)
        .await?
        .ok_or_else(|| not_found("Policy", &args.id, "Run: starmap policies"))?;

    let out = if args.list_mappings {
        output::render_rows(
            &global.output,
            policy.mappings(),
            |ms| ms.iter().map(MappingRow::from).collect(),
            |ms| ms.iter().filter_map(Mapping::id).map(str::to_owned).collect(),
        )?
    } else {
        output::render_single(&global.output, &policy, policy_detail, |p| {
            p.id().unwrap_or_default().to_owned()
        })?
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn mapping<T: Transport>(
    client: &StarmapClient<T>,
    args: MappingArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mapping = client.get_mapping(&args.id).await?.ok_or_else(|| {
        not_found(
            "Marketplace mapping",
            &args.id,
            "Run: starmap policy <POLICY_ID> --list-mappings",
        )
    })?;

    let out = if args.list_destinations {
        output::render_rows(
            &global.output,
            mapping.destinations(),
            |ds| ds.iter().map(DestinationRow::from).collect(),
            |ds| ds.iter().map(|d| d.destination().to_owned()).collect(),
        )?
    } else {
        output::render_single(&global.output, &mapping, mapping_detail, |m| {
            m.id().unwrap_or_default().to_owned()
        })?
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn destination<T: Transport>(
    client: &StarmapClient<T>,
    id: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let destination = client.get_destination(id).await?.ok_or_else(|| {
        not_found(
            "Destination",
            id,
            "Run: starmap mapping <MAPPING_ID> --list-destinations",
        )
    })?;

    let out = output::render_single(&global.output, &destination, destination_detail, |d| {
        d.destination().to_owned()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
