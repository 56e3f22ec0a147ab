//! Interactive restore workflow
//!
//! Everything the user sees goes through a [`Console`], which is generic over
//! its reader and writer so the prompt loop can be driven from tests.

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use lssr_common::config::RestoreConfig;
use tracing::info;

use crate::error::{RestoreError, Result};
use crate::splits_file::SplitsFile;

/// Line-oriented prompt/answer channel
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print one line
    pub fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    /// Print `prompt` and read one trimmed answer; `None` at end of input
    pub fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Yes/no question; only `y` (any case) is yes
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        Ok(self
            .ask(question)?
            .is_some_and(|answer| answer.eq_ignore_ascii_case("y")))
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

/// What the user asked for, after merging arguments and configuration
#[derive(Debug, Clone, Default)]
pub struct RestoreOptions {
    pub input: PathBuf,
    pub attempt: Option<String>,
    pub output: Option<PathBuf>,
    pub assume_yes: bool,
    pub dry_run: bool,
    pub list_only: bool,
    pub export: Option<PathBuf>,
    pub restore: RestoreConfig,
}

/// How a session ended without error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Restored splits written to this path
    Saved(PathBuf),
    /// Attempts listed, nothing else requested
    Listed,
    /// Plan shown, saving skipped on request
    DryRun,
    /// User declined to save or cancelled the output path
    Declined,
    /// User quit at the attempt prompt
    Quit,
}

/// Ask for an attempt id until a restorable one is given.
///
/// The attempt table is shown first and again after every `relist_every`
/// rejected answers. `q` or end of input quits.
pub fn choose_attempt<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    file: &SplitsFile,
    relist_every: u32,
) -> Result<Option<String>> {
    let relist_every = relist_every.max(1);
    let mut since_listing = relist_every;

    loop {
        if since_listing >= relist_every {
            since_listing = 0;
            console.say(&format!(
                "Listing all apparently valid runs.\n\n{}\n",
                file.list_attempts()
            ))?;
        }

        let Some(answer) = console.ask("Choose a run to restore by its ID: [q=quit] ")? else {
            return Ok(None);
        };
        if answer.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        if file.is_restorable(&answer) {
            return Ok(Some(answer));
        }
        since_listing += 1;
    }
}

/// `<dir>/<stem><suffix>.<ext>` next to the input
pub fn default_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "splits".to_string());
    let file_name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    input.with_file_name(file_name)
}

/// Ask where to save; an empty answer takes `default`, end of input cancels
pub fn ask_output_path<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    default: &Path,
) -> Result<Option<PathBuf>> {
    let prompt = format!("Save to [{}]: ", default.display());
    Ok(console.ask(&prompt)?.map(|answer| {
        if answer.is_empty() {
            default.to_path_buf()
        } else {
            PathBuf::from(answer)
        }
    }))
}

/// Run one open → choose → plan → save session.
pub fn run_session<R: BufRead, W: Write>(
    options: &RestoreOptions,
    console: &mut Console<R, W>,
) -> Result<SessionOutcome> {
    console.say(&format!(
        "Analyzing '{}' for compatibility...",
        options.input.display()
    ))?;
    let mut file = SplitsFile::open(&options.input)?;
    console.say(&format!(
        "Opened '{}' successfully. Version {} LSS file, ready.",
        file.name(),
        file.version()
    ))?;
    for diagnostic in file.diagnostics() {
        console.say(&format!("WARNING: {}", diagnostic))?;
    }

    if options.list_only {
        console.say(&file.list_attempts())?;
        file.close();
        return Ok(SessionOutcome::Listed);
    }

    let attempt = match &options.attempt {
        Some(id) => id.clone(),
        None => match choose_attempt(console, &file, options.restore.relist_every)? {
            Some(id) => id,
            None => {
                file.close();
                return Ok(SessionOutcome::Quit);
            }
        },
    };
    console.say(&format!("... Attempting to restore run # {} ...\n", attempt))?;

    let status = file.reconstruct(&attempt)?;
    console.say("---Proposed alterations to each segment---")?;
    console.say(&file.show_plan())?;
    if let Some(plan) = file.plan() {
        for diagnostic in &plan.diagnostics {
            console.say(&format!("WARNING: {}", diagnostic))?;
        }
    }
    if status.is_warning() {
        console.say(
            "\nWARNING: Multiple missing/skipped splits detected. Accurate restoration is uncertain.\n\
             Carefully review the proposed changes.",
        )?;
    }

    if let (Some(path), Some(plan)) = (&options.export, file.plan()) {
        export_plan(path, plan)?;
        console.say(&format!("Plan exported to '{}'.", path.display()))?;
    }

    if options.dry_run {
        file.close();
        return Ok(SessionOutcome::DryRun);
    }

    if options.restore.confirm
        && !options.assume_yes
        && !console.confirm("\nWould you like to save these changes? [y/n] ")?
    {
        file.close();
        return Ok(SessionOutcome::Declined);
    }

    let output = match &options.output {
        Some(path) => path.clone(),
        None => {
            let default = default_output_path(&options.input, &options.restore.output_suffix);
            match ask_output_path(console, &default)? {
                Some(path) => path,
                None => {
                    console.say("Save cancelled.")?;
                    file.close();
                    return Ok(SessionOutcome::Declined);
                }
            }
        }
    };

    console.say("Saving...")?;
    file.apply_and_save(&output)?;
    console.say(&format!("Changes successfully saved to '{}'.", output.display()))?;
    file.close();

    info!("Restored run {} into {}", attempt, output.display());
    Ok(SessionOutcome::Saved(output))
}

fn export_plan(path: &Path, plan: &crate::plan::Plan) -> Result<()> {
    let save_failed = |reason: String| RestoreError::SaveFailed {
        path: path.to_path_buf(),
        reason,
    };
    let json = serde_json::to_string_pretty(plan).map_err(|e| save_failed(e.to_string()))?;
    fs::write(path, json).map_err(|e| save_failed(e.to_string()))
}
