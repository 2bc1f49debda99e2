//! Client command handlers.

use iobuilt_core::{App, Client};
use tabled::Tabled;

use crate::cli::{ClientFields, ClientsArgs, ClientsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Project")]
    project: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Account")]
    account: String,
}

impl From<&Client> for ClientRow {
    fn from(c: &Client) -> Self {
        Self {
            id: util::opt_id(c.id),
            name: c.full_name.clone(),
            project: c.project_name.clone(),
            email: c.email.clone(),
            phone: c.phone_number.clone(),
            account: c.account_statement.clone(),
        }
    }
}

fn detail(c: &Client) -> String {
    output::detail_lines(&[
        ("ID", util::opt_id(c.id)),
        ("Name", c.full_name.clone()),
        ("Project", format!("{} ({})", c.project_name, c.project_id)),
        ("Email", c.email.clone()),
        ("Phone", c.phone_number.clone()),
        ("Address", c.address.clone()),
        ("Account", c.account_statement.clone()),
    ])
}

fn apply_fields(client: &mut Client, fields: ClientFields) {
    util::apply(&mut client.full_name, fields.full_name);
    util::apply(&mut client.project_id, fields.project);
    util::apply(&mut client.email, fields.email);
    util::apply(&mut client.phone_number, fields.phone);
    util::apply(&mut client.address, fields.address);
    util::apply(&mut client.account_statement, fields.account_statement);
}

fn print_client(client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, client, detail, |c| util::opt_id(c.id))?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Load clients, with projects first so client rows carry project names.
async fn load(app: &App) -> Result<Vec<Client>, CliError> {
    let store = app.clients();
    store.projects().fetch_projects().await;
    let clients = store.fetch_clients().await;
    util::ensure_no_errors(store.errors())?;
    Ok(clients)
}

pub async fn handle(app: &App, args: ClientsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let store = app.clients();

    match args.command {
        ClientsCommand::List { project } => {
            let clients: Vec<Client> = load(app)
                .await?
                .into_iter()
                .filter(|c| project.is_none_or(|id| c.project_id == id))
                .collect();
            let out = output::render_list(&global.output, &clients, |c| ClientRow::from(c), |c| {
                util::opt_id(c.id)
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Get { id } => {
            load(app).await?;
            let client = store
                .client_by_id(id)
                .ok_or_else(|| CliError::not_found("client", id, "clients list"))?;
            print_client(&client, global)
        }

        ClientsCommand::Create { fields, from_file } => {
            let client = match from_file {
                Some(path) => util::read_json_file(&path)?,
                None => {
                    if fields.full_name.is_none() || fields.project.is_none() {
                        return Err(CliError::Validation {
                            field: "full-name".into(),
                            reason: "--full-name and --project are required unless --from-file is given"
                                .into(),
                        });
                    }
                    let mut client = Client::default();
                    apply_fields(&mut client, fields);
                    client
                }
            };
            store.projects().fetch_projects().await;
            let created = store.add_client(&client).await?;
            print_client(&created, global)
        }

        ClientsCommand::Update { id, fields } => {
            load(app).await?;
            let mut client = store
                .client_by_id(id)
                .ok_or_else(|| CliError::not_found("client", id, "clients list"))?;
            apply_fields(&mut client, fields);
            let updated = store.update_client(&client).await?;
            print_client(&updated, global)
        }

        ClientsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete client {id}?"), global.yes)? {
                return Ok(());
            }
            store.delete_client(id).await?;
            output::notice(&format!("Client {id} deleted"), global.quiet);
            Ok(())
        }
    }
}
