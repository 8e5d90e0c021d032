use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use dialogue::languages::LANGUAGES;
use serde::Serialize;

use crate::output;

#[derive(Args, Debug)]
pub struct LanguagesArgs {
    #[arg(long, help = "Include the instruction sent for each language")]
    pub verbose: bool
}

#[derive(Serialize)]
struct LanguageRow<'a> {
    code: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    instruction: Option<String>
}

pub fn run(args: &LanguagesArgs, json: bool) -> Result<ExitCode> {
    let rows: Vec<LanguageRow<'_>> = LANGUAGES
        .iter()
        .map(|lang| LanguageRow {
            code: lang.code,
            name: lang.name,
            instruction: args.verbose.then(|| lang.system_instruction())
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(ExitCode::SUCCESS);
    }

    output::header("Supported languages");
    for row in &rows {
        println!("  {:<8} {}", row.code.cyan(), row.name);
        if let Some(instruction) = &row.instruction {
            println!("           {}", instruction.dimmed());
        }
    }
    println!();
    output::hint("Other codes are accepted and answered through a generic instruction");
    Ok(ExitCode::SUCCESS)
}
