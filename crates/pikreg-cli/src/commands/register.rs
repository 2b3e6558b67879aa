//! Registration wizard driver.
//!
//! Walks each account through initialize, captcha, email code and register,
//! pausing briefly between successful steps. A failed step stops the chain
//! for that account until a [`FailureDecider`] picks retry, skip, stop or a
//! manually typed email code.

use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, anyhow};
use pikreg_api_models::{EmailCodeRequest, InitializeForm, RegisterForm, VerifyCaptchaForm};
use pikreg_config::{AppConfig, AppConfigPatch};
use pikreg_core::{
    AccountLine, AccountState, RegistrationEntry, Wizard, WizardEvent, WizardStep,
    parse_account_lines,
};
use tracing::{info, warn};

use crate::api;
use crate::cli::{OnError, OutputFormat, RegisterArgs};
use crate::client::{AppContext, CliError, CliResult, require_success};
use crate::output::{render_wizard, summary_line};

const NO_CODE_FOUND: &str = "no verification code found in the mailbox";

/// What to do with an account whose step failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Decision {
    Retry,
    Skip,
    Stop,
    EnterCode(String),
}

/// Source of decisions after a failed step.
pub(crate) trait FailureDecider {
    fn decide(
        &mut self,
        entry: &RegistrationEntry,
        step: WizardStep,
        message: &str,
    ) -> CliResult<Decision>;
}

/// Applies the same decision to every failure.
struct FixedDecision(Decision);

impl FailureDecider for FixedDecision {
    fn decide(&mut self, _: &RegistrationEntry, _: WizardStep, _: &str) -> CliResult<Decision> {
        Ok(self.0.clone())
    }
}

/// Asks the operator on stderr and reads the answer from `input`.
pub(crate) struct PromptDecider<R> {
    input: R,
}

impl<R: BufRead> PromptDecider<R> {
    pub(crate) const fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> FailureDecider for PromptDecider<R> {
    fn decide(
        &mut self,
        entry: &RegistrationEntry,
        step: WizardStep,
        message: &str,
    ) -> CliResult<Decision> {
        let accepts_code = step == WizardStep::FetchEmailCode;
        eprintln!("{}: {step} failed: {message}", entry.account.email);
        loop {
            if accepts_code {
                eprint!("[r]etry, [s]kip, [q]uit, or type the code from the mailbox: ");
            } else {
                eprint!("[r]etry, [s]kip or [q]uit: ");
            }
            io::stderr().flush().ok();

            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .context("failed to read answer")
                .map_err(CliError::failure)?;
            if read == 0 {
                return Ok(Decision::Stop);
            }
            if let Some(decision) = parse_answer(line.trim(), accepts_code) {
                return Ok(decision);
            }
            eprintln!("unrecognised answer");
        }
    }
}

fn parse_answer(answer: &str, accepts_code: bool) -> Option<Decision> {
    match answer.to_ascii_lowercase().as_str() {
        "r" | "retry" => Some(Decision::Retry),
        "s" | "skip" => Some(Decision::Skip),
        "q" | "quit" | "stop" => Some(Decision::Stop),
        _ if accepts_code && looks_like_code(answer) => {
            Some(Decision::EnterCode(answer.to_string()))
        }
        _ => None,
    }
}

fn looks_like_code(answer: &str) -> bool {
    (4..=8).contains(&answer.len()) && answer.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Request fields shared by every account of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RunSettings {
    invite_code: String,
    use_proxy: bool,
    use_proxy_pool: bool,
    use_email_proxy: bool,
    proxy_url: Option<String>,
}

impl RunSettings {
    fn resolve(args: &RegisterArgs, saved: &AppConfig) -> CliResult<Self> {
        let invite_code = args
            .invite_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .or_else(|| saved.invite_code())
            .map(str::to_string)
            .ok_or_else(|| {
                CliError::validation(
                    "invite code is required; pass --invite-code or save one with --remember-invite",
                )
            })?;
        let proxy_url = args
            .proxy_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string);
        let use_proxy = args.use_proxy.unwrap_or(saved.use_proxy || proxy_url.is_some());
        let use_proxy_pool = args.use_proxy_pool.unwrap_or(saved.use_proxy_pool);
        if use_proxy && !use_proxy_pool && proxy_url.is_none() {
            return Err(CliError::validation(
                "--proxy-url is required when using a proxy outside the pool",
            ));
        }
        Ok(Self {
            invite_code,
            use_proxy,
            use_proxy_pool,
            use_email_proxy: args.use_email_proxy.unwrap_or(saved.use_email_proxy),
            proxy_url: proxy_url.filter(|_| use_proxy),
        })
    }

    fn initialize_form(&self, account: &AccountLine) -> InitializeForm {
        InitializeForm {
            invite_code: self.invite_code.clone(),
            email: account.email.clone(),
            use_proxy: self.use_proxy,
            use_proxy_pool: self.use_proxy_pool,
            use_email_proxy: self.use_email_proxy,
            proxy_url: self.proxy_url.clone(),
        }
    }
}

fn read_accounts(path: &Path) -> CliResult<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read accounts from stdin")
            .map_err(CliError::failure)?;
        return Ok(text);
    }
    fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))
        .map_err(CliError::failure)
}

fn remember_invite(ctx: &AppContext, args: &RegisterArgs, settings: &RunSettings) -> CliResult<()> {
    let saved_invite_code = if args.forget_invite {
        Some(String::new())
    } else if args.remember_invite {
        Some(settings.invite_code.clone())
    } else {
        None
    };
    if saved_invite_code.is_some() {
        ctx.preferences.save(AppConfigPatch {
            saved_invite_code,
            ..AppConfigPatch::default()
        })?;
        info!(remembered = args.remember_invite, "invite code preference updated");
    }
    Ok(())
}

pub(crate) async fn handle_register(
    ctx: &AppContext,
    args: RegisterArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let reads_stdin = args.accounts == Path::new("-");
    if reads_stdin && args.on_error == OnError::Prompt {
        return Err(CliError::validation(
            "prompting needs stdin; pass an accounts file or --on-error skip|stop",
        ));
    }
    let accounts = parse_account_lines(&read_accounts(&args.accounts)?)?;
    let saved = ctx.preferences.load()?;
    let settings = RunSettings::resolve(&args, &saved)?;
    remember_invite(ctx, &args, &settings)?;

    let mut wizard = Wizard::new(accounts)?;
    let pacing = Duration::from_millis(args.step_delay_ms);
    match args.on_error {
        OnError::Prompt => {
            let mut decider = PromptDecider::new(io::stdin().lock());
            drive_wizard(ctx, &mut wizard, &settings, pacing, &mut decider).await?;
        }
        OnError::Skip => {
            let mut decider = FixedDecision(Decision::Skip);
            drive_wizard(ctx, &mut wizard, &settings, pacing, &mut decider).await?;
        }
        OnError::Stop => {
            let mut decider = FixedDecision(Decision::Stop);
            drive_wizard(ctx, &mut wizard, &settings, pacing, &mut decider).await?;
        }
    }

    render_wizard(&wizard, format)?;
    let summary = wizard.summary();
    if wizard.is_finished() && summary.failed == 0 {
        Ok(())
    } else {
        Err(CliError::failure(anyhow!(
            "{}",
            summary_line(summary, wizard.is_finished())
        )))
    }
}

async fn drive_wizard<D: FailureDecider>(
    ctx: &AppContext,
    wizard: &mut Wizard,
    settings: &RunSettings,
    pacing: Duration,
    decider: &mut D,
) -> CliResult<()> {
    while let Some(step) = wizard.next_step() {
        let Some(entry) = wizard.current().cloned() else {
            break;
        };
        if entry.state == AccountState::Pending {
            wizard.apply(&WizardEvent::Begin)?;
        }

        let event = match perform_step(ctx, step, &entry, settings).await {
            Ok(event) => event,
            Err(err) => WizardEvent::Failed {
                step,
                message: err.display_message(),
            },
        };
        let state = wizard.apply(&event)?;

        if let AccountState::Error { step, message, .. } = &state {
            warn!(
                account = %entry.account.email,
                %step,
                error = %message,
                "registration step failed"
            );
            let current = wizard.current().cloned().unwrap_or(entry);
            match decider.decide(&current, *step, message)? {
                Decision::Retry => {
                    wizard.retry()?;
                }
                Decision::Skip => wizard.skip()?,
                Decision::Stop => break,
                Decision::EnterCode(code) => {
                    wizard.apply(&WizardEvent::CodeEntered(code))?;
                }
            }
            continue;
        }

        eprintln!("{}: {step} ok", entry.account.email);
        if let AccountState::Success { message } = &state {
            eprintln!(
                "{}: {}",
                entry.account.email,
                message.as_deref().unwrap_or("registered")
            );
        }
        if !wizard.is_finished() && !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }
    }
    Ok(())
}

async fn perform_step(
    ctx: &AppContext,
    step: WizardStep,
    entry: &RegistrationEntry,
    settings: &RunSettings,
) -> CliResult<WizardEvent> {
    let account = &entry.account;
    match step {
        WizardStep::Initialize => {
            let form = settings.initialize_form(account);
            require_success(api::initialize(ctx, &form).await?)?;
            Ok(WizardEvent::Initialized)
        }
        WizardStep::VerifyCaptcha => {
            let form = VerifyCaptchaForm {
                email: account.email.clone(),
            };
            require_success(api::verify_captcha(ctx, &form).await?)?;
            Ok(WizardEvent::CaptchaVerified)
        }
        WizardStep::FetchEmailCode => {
            let request = EmailCodeRequest {
                email: account.email.clone(),
                password: account.password.clone(),
                token: account.token.clone(),
                client_id: account.client_id.clone(),
            };
            let (message, body) =
                require_success(api::email_verification_code(ctx, &request).await?)?;
            match body.verification_code.as_deref().map(str::trim) {
                Some(code) if !code.is_empty() => Ok(WizardEvent::CodeReceived(code.to_string())),
                _ => Err(CliError::failure(anyhow!(
                    "{}",
                    message.as_deref().unwrap_or(NO_CODE_FOUND)
                ))),
            }
        }
        WizardStep::Register => {
            let AccountState::EmailPending {
                code: Some(verification_code),
            } = &entry.state
            else {
                return Err(CliError::failure(anyhow!(
                    "no verification code known for {}",
                    account.email
                )));
            };
            let form = RegisterForm {
                email: account.email.clone(),
                verification_code: verification_code.clone(),
            };
            let (message, _) = require_success(api::register(ctx, &form).await?)?;
            Ok(WizardEvent::Registered { message })
        }
    }
}
