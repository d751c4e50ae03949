//! Client command handlers.

use serde_json::Value;
use tabled::Tabled;

use xui_api::models::Inbound;
use xui_api::{ClientPatch, ClientRecord, ClientTraffic, XuiClient};

use crate::cli::{ClientFields, ClientsArgs, ClientsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "UUID")]
    id: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "TG ID")]
    tg_id: String,
    #[tabled(rename = "IPs")]
    limit_ip: i64,
    #[tabled(rename = "Quota")]
    quota: String,
    #[tabled(rename = "Expires")]
    expiry: String,
    #[tabled(rename = "Enabled")]
    enable: String,
}

impl From<&ClientRecord> for ClientRow {
    fn from(c: &ClientRecord) -> Self {
        Self {
            id: c.id.clone(),
            email: c.email.clone(),
            tg_id: c.tg_id.map(|t| t.to_string()).unwrap_or_default(),
            limit_ip: c.limit_ip,
            quota: output::fmt_quota(c.total_gb),
            expiry: output::fmt_expiry(c.expiry_time),
            enable: if c.enable { "yes" } else { "no" }.into(),
        }
    }
}

#[derive(Tabled)]
struct TrafficRow {
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Inbound")]
    inbound_id: i64,
    #[tabled(rename = "Up")]
    up: String,
    #[tabled(rename = "Down")]
    down: String,
    #[tabled(rename = "Quota")]
    total: String,
    #[tabled(rename = "Expires")]
    expiry: String,
}

impl From<&ClientTraffic> for TrafficRow {
    fn from(t: &ClientTraffic) -> Self {
        Self {
            email: t.email.clone(),
            inbound_id: t.inbound_id,
            up: output::fmt_bytes_short(t.up),
            down: output::fmt_bytes_short(t.down),
            total: output::fmt_quota(t.total),
            expiry: output::fmt_expiry(t.expiry_time),
        }
    }
}

fn detail(c: &ClientRecord) -> String {
    [
        format!("UUID:      {}", c.id),
        format!("Email:     {}", c.email),
        format!(
            "TG ID:     {}",
            c.tg_id.map_or_else(|| "-".into(), |t| t.to_string())
        ),
        format!("Flow:      {}", c.flow),
        format!("IP limit:  {}", c.limit_ip),
        format!("Quota:     {}", output::fmt_quota(c.total_gb)),
        format!("Expires:   {}", output::fmt_expiry(c.expiry_time)),
        format!("Enabled:   {}", c.enable),
        format!("Sub ID:    {}", c.sub_id),
    ]
    .join("\n")
}

impl From<ClientFields> for ClientPatch {
    fn from(f: ClientFields) -> Self {
        Self {
            uuid: f.uuid,
            flow: f.flow,
            email: f.email,
            tg_id: f.tg_id,
            limit_ip: f.limit_ip,
            total_gb: f.total_bytes,
            expiry_time: f.expiry_time,
            enable: f.enable,
            sub_id: f.sub_id,
            reset: f.reset,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &XuiClient,
    args: ClientsArgs,
    profile: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let inbound = global.inbound.as_deref();

    match args.command {
        ClientsCommand::List => {
            let resp = client.list_clients(inbound).await?;
            let body = util::expect_success(resp, profile)?;
            let clients = match body.get("obj") {
                Some(obj) if !obj.is_null() => {
                    serde_json::from_value::<Inbound>(obj.clone())?.clients()
                }
                _ => Vec::new(),
            };
            let out = output::render_list(
                &global.output,
                &clients,
                |c| ClientRow::from(c),
                |c| c.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Get { tg_id } => {
            let Some(record) = client.client_by_tg_id(tg_id, inbound).await? else {
                return Err(CliError::NotFound {
                    resource_type: "client".into(),
                    identifier: format!("tg:{tg_id}"),
                    list_command: "clients list".into(),
                });
            };
            let out = output::render_single(&global.output, &record, detail, |c| c.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Traffic { uuid } => {
            let resp = client.traffic_by_uuid(&uuid).await?;
            let body = util::expect_success(resp, profile)?;
            let traffic: Vec<ClientTraffic> = match body.get("obj") {
                Some(obj) if !obj.is_null() => serde_json::from_value(obj.clone())?,
                _ => Vec::new(),
            };
            if traffic.is_empty() {
                return Err(CliError::NotFound {
                    resource_type: "client".into(),
                    identifier: uuid,
                    list_command: "clients list".into(),
                });
            }
            let out = output::render_list(
                &global.output,
                &traffic,
                |t| TrafficRow::from(t),
                |t| t.email.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Add(fields) => {
            let resp = client.add_client(fields.into(), inbound).await?;
            report(resp, "Client added", profile, global)
        }

        ClientsCommand::Update(fields) => {
            let patch = ClientPatch::from(fields);
            let resp = client.update_client(&patch, inbound).await?;
            report(resp, "Client updated", profile, global)
        }

        ClientsCommand::Delete { uuid } => {
            if !util::confirm(
                &format!("Delete client {uuid}? Its traffic history is lost."),
                "clients delete",
                global.yes,
            )? {
                return Ok(());
            }
            let resp = client.delete_client(&uuid, inbound).await?;
            report(resp, "Client deleted", profile, global)
        }
    }
}

/// Check a mutation response and print the panel's message.
fn report(
    resp: xui_api::ApiResponse,
    done: &str,
    profile: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let body = util::expect_success(resp, profile)?;
    if !global.quiet {
        match body.get("msg").and_then(Value::as_str).filter(|m| !m.is_empty()) {
            Some(msg) => eprintln!("✓ {done}: {msg}"),
            None => eprintln!("✓ {done}"),
        }
    }
    Ok(())
}
