use anyhow::Result;
use review_client::{AssistSession, Outcome};
use serde::Serialize;

#[derive(Serialize)]
struct Report<'a> {
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<&'a review_shared::error::AssistFailure>,
    session: &'a AssistSession,
}

fn outcome_label(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Applied => "applied",
        Outcome::Failed(_) => "failed",
        Outcome::Unavailable => "unavailable",
        Outcome::Superseded => "superseded",
    }
}

/// Review text goes to stdout; status and dialog go to stderr so the text can be piped.
pub fn print_report(outcome: &Outcome, session: &AssistSession, json: bool) -> Result<()> {
    if json {
        let failure = match outcome {
            Outcome::Failed(failure) => Some(failure),
            _ => None,
        };
        let report = Report {
            outcome: outcome_label(outcome),
            failure,
            session,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if let Some(status) = &session.status {
        let marker = if status.is_error { "error" } else { "status" };
        eprintln!("[{marker}] {}", status.message);
    }
    match &session.modal {
        Some(modal) => {
            let marker = if modal.is_error { " (error)" } else { "" };
            eprintln!("{}{marker}", modal.title);
            println!("{}", modal.body.plain_text());
        }
        None => println!("{}", session.current_text),
    }
    if matches!(outcome, Outcome::Unavailable) {
        eprintln!("nothing to do: the required control is not configured");
    }
    Ok(())
}
