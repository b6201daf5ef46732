use anyhow::{Context, Result};
use dialoguer::Confirm;

/// Human sign-off before anything is published
pub trait Approver: Send + Sync {
    fn approve(&self, title: &str) -> Result<bool>;
}

/// Asks on the terminal
#[derive(Debug, Default)]
pub struct ConsoleApprover;

impl Approver for ConsoleApprover {
    fn approve(&self, title: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(format!("Approve publication of '{}'?", title))
            .default(false)
            .interact()
            .context("Failed to read approval from terminal")
    }
}

/// Approves everything; used when manual approval is off
#[derive(Debug, Default)]
pub struct AutoApprover;

impl Approver for AutoApprover {
    fn approve(&self, _title: &str) -> Result<bool> {
        Ok(true)
    }
}
