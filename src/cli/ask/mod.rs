//! Ask command - answers one question and prints the result

use clap::Args;

use crate::domain::{AnswerLevel, Question, WorkflowOutcome};

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to answer
    pub question: String,

    /// Use the shallow flow (knowledge samples first, then one acquisition)
    #[arg(long)]
    pub shallow: bool,

    /// 0 = stored knowledge only, 1 = standard, 2 = always acquire
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub level: u8,

    /// Print the full outcome, including the step trace, as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let state = crate::create_app_state(&config).await?;

    let question = Question::new(args.question)?.with_level(AnswerLevel::try_from(args.level)?);
    let outcome = if args.shallow {
        state.orchestrator.start(&question).await?
    } else {
        state.orchestrator.answer(&question).await?
    };

    println!("{}", render(&outcome, args.json)?);
    Ok(())
}

fn render(outcome: &WorkflowOutcome, json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(outcome)?);
    }
    Ok(outcome.answer.clone())
}
