use std::io;
use std::str::FromStr;

use crate::cli::output;
use crate::cli::prompts::TerminalInteraction;
use crate::cli::{CliContext, CliError};
use crate::drafts::DraftKey;
use crate::forms::interaction::{FormOutcome, FormRunner, ScriptedInteraction};
use crate::forms::{FormKind, FormSession, PlannedWrite, SubmitTarget};
use crate::record::Record;
use crate::roles::{self, RoleResolution};

pub(crate) fn kinds() -> Result<(), CliError> {
    output::section("Form kinds");
    for kind in FormKind::all() {
        let flow = kind.flow()?;
        let steps = flow.descriptor().steps.names().join(" > ");
        println!("  {:<22} {}", kind.slug(), kind.label());
        println!("  {:<22} {}", "", steps);
    }
    Ok(())
}

pub(crate) fn role(args: &[String]) -> Result<(), CliError> {
    let raw = args
        .first()
        .ok_or_else(|| CliError::Usage("usage: formctl role <name>".into()))?;
    match roles::resolve(raw) {
        RoleResolution::Supported(caps) => {
            output::section(caps.profile_title);
            output::detail("Role", caps.role, 12);
            output::detail("Display", caps.display_name, 12);
            output::detail("About", caps.description, 12);
            output::detail("Badge", caps.badge_color, 12);
            output::detail("Icon", caps.icon, 12);
            output::detail("Cards", caps.profile_cards.join(", "), 12);
            output::detail("Edit form", caps.edit_form.slug(), 12);

            output::section(caps.navigation.display_name);
            for section in &caps.navigation.sections {
                println!("  {}", section.title);
                for item in &section.items {
                    println!("    {:<28} {}", item.label, item.href);
                }
            }
            Ok(())
        }
        RoleResolution::Unsupported(unsupported) => {
            let supported: Vec<&str> = roles::Role::all().iter().map(|role| role.as_str()).collect();
            output::info(format!("Supported roles: {}", supported.join(", ")));
            Err(CliError::UnsupportedRole(unsupported))
        }
    }
}

pub(crate) fn fill(context: &CliContext, args: &[String]) -> Result<(), CliError> {
    let (kind, record_id) = parse_fill_args(args)?;
    let key = context.config.draft_key(kind, record_id.as_deref());
    let target = SubmitTarget::from_record_id(record_id);
    let flow = kind.flow()?;

    let mut session = context.runtime.block_on(FormSession::open(
        flow,
        key.clone(),
        target,
        context.drafts.clone(),
    ))?;
    if session.restored_from_draft() {
        output::info(format!("Resuming saved draft {}", key));
    }
    // No transport here: edit sessions never see the stored entity.
    if let SubmitTarget::Update { id } = session.target() {
        output::warning(format!(
            "Record {} is not fetched offline; editing starts from the form defaults",
            id
        ));
    }

    let outcome = if context.scripted {
        let mut interaction = ScriptedInteraction::new(io::stdin().lock(), io::stdout());
        FormRunner::run(&mut session, &mut interaction)?
    } else {
        let mut interaction = TerminalInteraction::new();
        FormRunner::run(&mut session, &mut interaction)?
    };

    match outcome {
        FormOutcome::Completed(record) => {
            output::success(format!("{} complete; draft kept as {}", kind.label(), key));
            let writes = session.flow().commit(&record, session.target())?;
            output::section("Planned writes (not sent)");
            print_writes(&writes)?;
        }
        FormOutcome::Cancelled => {
            output::warning(format!("Form left unfinished; answers kept in draft {}", key));
        }
    }
    Ok(())
}

pub(crate) fn drafts(context: &CliContext, args: &[String]) -> Result<(), CliError> {
    let (action, rest) = args
        .split_first()
        .ok_or_else(|| CliError::Usage("usage: formctl drafts list|show|clear".into()))?;
    match action.as_str() {
        "list" => {
            let drafts = context.drafts.list()?;
            if drafts.is_empty() {
                output::info(format!("No drafts in {}", context.drafts_dir.display()));
                return Ok(());
            }
            output::section("Drafts");
            for draft in drafts {
                println!(
                    "  {:<40} {:>3} field(s)  saved {}",
                    draft.owner_key,
                    draft.payload.len(),
                    draft.saved_at.format("%Y-%m-%d %H:%M:%S")
                );
            }
            Ok(())
        }
        "show" => {
            let key = draft_key_from(context, rest)?;
            let draft = context
                .drafts
                .load_local(&key)?
                .ok_or_else(|| CliError::Usage(format!("no draft saved for {}", key)))?;
            println!("{}", serde_json::to_string_pretty(&draft.payload.to_json())?);
            Ok(())
        }
        "clear" => {
            let key = draft_key_from(context, rest)?;
            if context.drafts.load_local(&key)?.is_none() {
                output::info(format!("No draft saved for {}", key));
                return Ok(());
            }
            context.drafts.clear(&key)?;
            output::success(format!("Cleared draft {}", key));
            Ok(())
        }
        other => Err(CliError::Usage(format!(
            "unknown drafts action `{}` (expected list, show or clear)",
            other
        ))),
    }
}

pub(crate) fn payload(context: &CliContext, args: &[String]) -> Result<(), CliError> {
    let key = draft_key_from(context, args)?;
    let record: Record = context
        .drafts
        .load_local(&key)?
        .map(|draft| draft.payload)
        .ok_or_else(|| CliError::Usage(format!("no draft saved for {}", key)))?;
    let target = SubmitTarget::from_record_id(args.get(1).cloned());
    let writes = key.kind.flow()?.commit(&record, &target)?;
    print_writes(&writes)
}

fn print_writes(writes: &[PlannedWrite]) -> Result<(), CliError> {
    for write in writes {
        println!("{} {}", write.method.as_str(), write.path);
        println!("{}", serde_json::to_string_pretty(&write.body)?);
    }
    Ok(())
}

fn draft_key_from(context: &CliContext, args: &[String]) -> Result<DraftKey, CliError> {
    let kind = args
        .first()
        .ok_or_else(|| CliError::Usage("a form kind is required (see `formctl kinds`)".into()))?;
    let kind = FormKind::from_str(kind)?;
    Ok(context.config.draft_key(kind, args.get(1).map(String::as_str)))
}

fn parse_fill_args(args: &[String]) -> Result<(FormKind, Option<String>), CliError> {
    let mut kind = None;
    let mut record_id = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--record" => {
                let id = iter
                    .next()
                    .ok_or_else(|| CliError::Usage("--record needs an id".into()))?;
                record_id = Some(id.clone());
            }
            value if kind.is_none() => kind = Some(FormKind::from_str(value)?),
            value => return Err(CliError::Usage(format!("unexpected argument `{}`", value))),
        }
    }
    let kind = kind.ok_or_else(|| CliError::Usage("usage: formctl fill <kind> [--record <id>]".into()))?;
    Ok((kind, record_id))
}
