use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use config::DialogueConfig;
use dialogue::{
    CancelSignal, DialogueClient, DialogueRequest, GuideAnswer, PromptTask, SessionOutcome,
    TracingObserver, request_with_retry,
};
use errors::DialogueError;
use tracing::info;

use super::GlobalArgs;
use crate::{input, output, ux_error};

/// Exit status after a Ctrl-C, matching the shell convention for SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Args, Debug)]
pub struct AskArgs {
    #[arg(short, long, help = "Target language code (defaults to session.default_language)")]
    pub language: Option<String>,

    #[arg(short, long, conflicts_with = "file", help = "Passage to process")]
    pub text: Option<String>,

    #[arg(short, long, help = "Read the passage from a file")]
    pub file: Option<PathBuf>
}

pub async fn run_guide(args: AskArgs, global: &GlobalArgs, config: DialogueConfig) -> Result<ExitCode> {
    run(PromptTask::Guide, args, global, config).await
}

pub async fn run_translate(
    args: AskArgs,
    global: &GlobalArgs,
    config: DialogueConfig
) -> Result<ExitCode> {
    run(PromptTask::Translate, args, global, config).await
}

async fn run(
    task: PromptTask,
    args: AskArgs,
    global: &GlobalArgs,
    config: DialogueConfig
) -> Result<ExitCode> {
    let source = input::read_source(args.text.as_deref(), args.file.as_deref(), std::io::stdin())?;
    let language = args
        .language
        .unwrap_or_else(|| config.session.default_language.clone());

    let request = match task {
        PromptTask::Guide => DialogueRequest::guide(source, &language),
        PromptTask::Translate => DialogueRequest::translate(source, &language)
    };

    let result = match DialogueClient::from_config(&config) {
        Ok(client) => {
            let client = client.with_observer(Arc::new(TracingObserver));
            let cancel = CancelSignal::new();
            let interrupt = tokio::spawn(cancel_on_interrupt(cancel.clone()));

            if !global.json {
                output::info(&format!("Requesting {} in '{}'", task_label(task), language));
            }
            let result = request_with_retry(&client, request, &config.retry, &cancel).await;
            interrupt.abort();
            result
        }
        Err(err) => Err(err)
    };

    report(task, &result, global.json)?;
    Ok(exit_code(&result))
}

async fn cancel_on_interrupt(cancel: CancelSignal) {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl+C, cancelling session");
        cancel.cancel();
    }
}

fn report(task: PromptTask, result: &Result<GuideAnswer, DialogueError>, json: bool) -> Result<()> {
    if json {
        let outcome = SessionOutcome::from(result);
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match result {
        Ok(answer) => match task {
            PromptTask::Guide => print_guide(answer),
            PromptTask::Translate => println!("{}", answer.full_text.trim_end())
        },
        Err(err) => ux_error::from_dialogue_error(err).display()
    }
    Ok(())
}

fn print_guide(answer: &GuideAnswer) {
    for section in answer.sections() {
        if let Some(heading) = &section.heading {
            output::header(heading);
        }
        if !section.body.is_empty() {
            println!("{}", section.body);
        }
        println!();
    }
}

fn exit_code(result: &Result<GuideAnswer, DialogueError>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(DialogueError::Cancelled) => ExitCode::from(EXIT_INTERRUPTED),
        Err(_) => ExitCode::FAILURE
    }
}

fn task_label(task: PromptTask) -> &'static str {
    match task {
        PromptTask::Guide => "reading guide",
        PromptTask::Translate => "translation"
    }
}
