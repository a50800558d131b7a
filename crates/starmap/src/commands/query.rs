//! Query command handler.

use starmap_api::Transport;
use starmap_core::{Destination, QueryParams, QueryResponse, QueryResult, StarmapClient};
use tabled::Tabled;

use crate::cli::{GlobalOpts, QueryArgs};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DestinationRow {
    #[tabled(rename = "Workflow")]
    workflow: String,
    #[tabled(rename = "Cloud")]
    cloud: String,
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Arch")]
    architecture: String,
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Overwrite")]
    overwrite: bool,
}

impl DestinationRow {
    fn new(workflow: String, cloud: &str, account: &str, d: &Destination) -> Self {
        Self {
            workflow,
            cloud: cloud.to_owned(),
            account: account.to_owned(),
            destination: d.destination().to_owned(),
            architecture: d.architecture().unwrap_or("-").to_owned(),
            provider: d.provider().unwrap_or("-").to_owned(),
            overwrite: d.overwrite(),
        }
    }
}

fn classic_rows(responses: &[QueryResponse]) -> Vec<DestinationRow> {
    responses
        .iter()
        .flat_map(|qr| {
            qr.clouds().iter().flat_map(move |(account, dests)| {
                dests
                    .iter()
                    .map(move |d| DestinationRow::new(qr.workflow().to_string(), "-", account, d))
            })
        })
        .collect()
}

fn result_rows(result: &QueryResult) -> Vec<DestinationRow> {
    match result {
        QueryResult::V1(qr) => classic_rows(std::slice::from_ref(qr)),
        QueryResult::V2(container) => container
            .responses()
            .iter()
            .flat_map(|qre| {
                qre.mappings().iter().flat_map(move |(account, mapping)| {
                    mapping.destinations().iter().map(move |d| {
                        DestinationRow::new(qre.workflow().to_string(), qre.cloud(), account, d)
                    })
                })
            })
            .collect(),
    }
}

fn destination_ids(rows: Vec<DestinationRow>) -> Vec<String> {
    rows.into_iter().map(|r| r.destination).collect()
}

/// Build query parameters from the command-line arguments.
pub fn params_from_args(args: QueryArgs) -> Result<QueryParams, CliError> {
    let mut params = match (args.image, args.name) {
        (_, Some(name)) => QueryParams::name(name),
        (Some(image), None) => QueryParams::image(image),
        (None, None) => {
            return Err(CliError::Validation {
                field: "image".into(),
                reason: "pass an image NVR or --name".into(),
            });
        }
    };
    params.version = args.image_version.filter(|v| !v.is_empty());
    params.workflow = args.workflow;
    params.cloud = args.cloud;
    Ok(params)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle<T: Transport>(
    client: &StarmapClient<T>,
    args: QueryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let classic = args.classic;
    let params = params_from_args(args)?;

    let Some(result) = client.query(&params).await? else {
        return Err(CliError::NotFound {
            resource_type: "Marketplace mappings".into(),
            identifier: params.to_string(),
            hint: "Check the image name and workflow, or list policies with: starmap policies"
                .into(),
        });
    };

    let out = if classic {
        let responses = result.into_classic()?;
        output::render_rows(&global.output, &responses[..], classic_rows, |r| {
            destination_ids(classic_rows(r))
        })?
    } else {
        output::render_rows(&global.output, &result, result_rows, |r| {
            destination_ids(result_rows(r))
        })?
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
