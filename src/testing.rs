//! Scripted command runner shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{InstallerError, Result};
use crate::runner::{CommandOutput, CommandRunner, Invocation};

enum Scripted {
    Output(CommandOutput),
    Missing,
}

/// Replays canned results per program and records every invocation.
///
/// Programs without a script behave as if absent from PATH. A successful
/// `curl` writes the last URL segment into its working directory, like
/// `curl -fLO` does.
#[derive(Default)]
pub(crate) struct FakeRunner {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<Invocation>>,
}

impl FakeRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, program: &str, status: i32, stdout: &str, stderr: &str) -> Self {
        self.push(
            program,
            Scripted::Output(CommandOutput {
                status,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            }),
        )
    }

    pub(crate) fn missing(self, program: &str) -> Self {
        self.push(program, Scripted::Missing)
    }

    fn push(self, program: &str, scripted: Scripted) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(program.to_string())
            .or_default()
            .push_back(scripted);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn programs(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|invocation| invocation.program)
            .collect()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(invocation.clone());
        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&invocation.program)
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(Scripted::Output(output)) => {
                if invocation.program == "curl" && output.success() {
                    if let (Some(dir), Some(url)) = (&invocation.cwd, invocation.args.last()) {
                        let name = url.rsplit('/').next().unwrap_or(url);
                        std::fs::write(dir.join(name), b"package")?;
                    }
                }
                Ok(output)
            }
            Some(Scripted::Missing) | None => Err(InstallerError::CommandMissing {
                command: invocation.program.clone(),
            }),
        }
    }
}
