use colored::Colorize;
use errors::DialogueError;

#[derive(Debug)]
pub struct UxError {
    pub what: String,
    pub why: Option<String>,
    pub how_to_fix: Vec<String>,
    pub suggested_command: Option<String>
}

impl UxError {
    pub fn new(what: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            why: None,
            how_to_fix: Vec::new(),
            suggested_command: None
        }
    }

    pub fn why(mut self, reason: impl Into<String>) -> Self {
        self.why = Some(reason.into());
        self
    }

    pub fn fix(mut self, suggestion: impl Into<String>) -> Self {
        self.how_to_fix.push(suggestion.into());
        self
    }

    pub fn suggest(mut self, cmd: impl Into<String>) -> Self {
        self.suggested_command = Some(cmd.into());
        self
    }

    pub fn display(&self) {
        eprintln!();
        eprintln!("{} {}", "error:".red().bold(), self.what.white().bold());

        if let Some(why) = &self.why {
            eprintln!("       {}", why.dimmed());
        }

        if !self.how_to_fix.is_empty() {
            eprintln!();
            eprintln!("{}", "How to fix:".yellow().bold());
            for (i, fix) in self.how_to_fix.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, fix);
            }
        }

        if let Some(cmd) = &self.suggested_command {
            eprintln!();
            eprintln!("{}", "Try this:".green().bold());
            eprintln!("  $ {}", cmd.cyan());
        }
        eprintln!();
    }
}

impl std::fmt::Display for UxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.what)
    }
}

impl std::error::Error for UxError {}

/// Maps a session failure onto actionable guidance.
pub fn from_dialogue_error(err: &DialogueError) -> UxError {
    match err {
        DialogueError::Configuration { message } => UxError::new(format!("Configuration error: {message}"))
            .why("Sessions need credentials and valid settings before anything is sent")
            .fix("Export XINGHUO_API_KEY, XINGHUO_API_SECRET and XINGHUO_APP_ID")
            .fix("Or pass a file with a [credentials] section via --config")
            .fix("Make sure the passage is not empty"),
        DialogueError::ConnectionTimeout { timeout_ms } => {
            UxError::new(format!("Connection not ready after {timeout_ms}ms"))
                .why("The service did not accept the connection within the time budget")
                .fix("Check network connectivity to the service host")
                .fix("Allow more time or retry automatically")
                .suggest(format!("classics-guide --timeout-ms {} --retries 2 guide", timeout_ms * 2))
        }
        DialogueError::Transport { reason } => UxError::new(format!("Connection failed: {reason}"))
            .why("The connection dropped before the answer was complete")
            .fix("Retry the request; each attempt is signed afresh")
            .suggest("classics-guide --retries 2 guide"),
        DialogueError::MalformedFrame { reason } => {
            UxError::new(format!("Unexpected response from service: {reason}"))
                .why("A streamed frame did not match the expected format")
                .fix("Check that GUIDE_HOST and GUIDE_PATH point at the dialogue endpoint")
        }
        DialogueError::RemoteRejected { code, message, sid } => {
            let ux = UxError::new(format!("Service rejected the request (code {code})"))
                .why(message.clone())
                .fix("Verify that the credentials belong to the configured application")
                .fix("Check that the system clock is accurate; signatures are time-bound");
            match sid {
                Some(sid) => ux.fix(format!("Quote session id {sid} when contacting support")),
                None => ux
            }
        }
        DialogueError::Cancelled => UxError::new("Session cancelled")
    }
}
