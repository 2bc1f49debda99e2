//! Profile command handlers.

use iobuilt_core::{App, Profile};

use crate::cli::{GlobalOpts, ProfileArgs, ProfileCommand, ProfileFields};
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(p: &Profile) -> String {
    output::detail_lines(&[
        ("ID", p.id.to_string()),
        ("User ID", p.user_id.to_string()),
        ("Name", p.name.clone()),
        ("Username", p.username.clone()),
        ("Email", p.email.clone()),
        ("Second email", p.second_email.clone()),
        ("Role", p.view_type().to_string()),
        ("Phone", p.phone_number.clone()),
        ("Address", p.address.clone()),
        ("Age", if p.age == 0 { String::new() } else { p.age.to_string() }),
        ("Photo", p.display_photo_url().to_owned()),
    ])
}

fn apply_fields(profile: &mut Profile, fields: ProfileFields) {
    util::apply(&mut profile.name, fields.name);
    util::apply(&mut profile.username, fields.username);
    util::apply(&mut profile.address, fields.address);
    util::apply(&mut profile.age, fields.age);
    util::apply(&mut profile.phone_number, fields.phone);
    util::apply(&mut profile.photo_url, fields.photo_url);
}

fn print_profile(profile: &Profile, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, profile, detail, |p| p.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle(app: &App, args: ProfileArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let store = app.profile();

    match args.command {
        ProfileCommand::Show { user } => {
            let profile = match user {
                Some(id) => store.fetch_profile(id).await,
                None => store.fetch_current_profile().await,
            };
            util::ensure_no_errors(store.errors())?;
            let profile = profile.ok_or_else(|| {
                let who = user.map_or_else(|| "current".to_owned(), |id| id.to_string());
                CliError::not_found("profile", who, "profile show")
            })?;
            print_profile(&profile, global)
        }

        ProfileCommand::Create(fields) => {
            let iam = app.facade();
            let mut profile = Profile {
                user_id: iam.current_user_id()?,
                email: iam.current_user_email().unwrap_or_default(),
                ..Profile::default()
            };
            apply_fields(&mut profile, fields);
            let created = store.create_profile(&profile).await?;
            print_profile(&created, global)
        }

        ProfileCommand::Update(fields) => {
            let current = store.fetch_current_profile().await;
            util::ensure_no_errors(store.errors())?;
            let mut profile = current
                .ok_or_else(|| CliError::not_found("profile", "current", "profile create"))?;
            apply_fields(&mut profile, fields);
            let updated = store.update_profile(profile.id, &profile).await?;
            print_profile(&updated, global)
        }

        ProfileCommand::SecondEmail { email } => {
            store.set_second_email(&email).await?;
            output::notice(&format!("Second email set to {email}"), global.quiet);
            Ok(())
        }
    }
}
