//! Event handling and progress display

use crate::logging::log_event_with_tracing;
use console::{style, StyledObject, Term};
use depbuild_events::{
    AppEvent, BuildEvent, DownloadEvent, GeneralEvent, PackageEvent, PackageStage,
};
use std::io::Write;

const BANNER_WIDTH: usize = 80;

/// What a single event turns into on the terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Output {
    /// A complete line on stdout
    Line(String),
    /// A line on stderr
    Error(String),
    /// Rewrite the current stdout line in place
    Progress(String),
    /// Terminate an in-place line
    EndProgress,
}

/// Event handler for progress display and user feedback
pub struct EventHandler {
    colors_enabled: bool,
    debug_enabled: bool,
    progress_active: bool,
    stdout: Term,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, debug_enabled: bool) -> Self {
        Self {
            colors_enabled,
            debug_enabled,
            progress_active: false,
            stdout: Term::stdout(),
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        log_event_with_tracing(&event);
        if let Some(output) = self.render(&event) {
            self.write(output);
        }
    }

    fn write(&mut self, output: Output) {
        // Terminal write failures are not worth aborting a build over.
        match output {
            Output::Progress(text) => {
                let _ = write!(self.stdout, "\r{text}");
                let _ = self.stdout.flush();
                self.progress_active = true;
            }
            Output::EndProgress => self.end_progress(),
            Output::Line(text) => {
                self.end_progress();
                let _ = self.stdout.write_line(&text);
            }
            Output::Error(text) => {
                self.end_progress();
                eprintln!("{text}");
            }
        }
    }

    fn end_progress(&mut self) {
        if self.progress_active {
            let _ = self.stdout.write_line("");
            self.progress_active = false;
        }
    }

    pub(crate) fn render(&self, event: &AppEvent) -> Option<Output> {
        match event {
            AppEvent::Package(event) => self.render_package(event),
            AppEvent::Download(event) => self.render_download(event),
            AppEvent::Build(event) => self.render_build(event),
            AppEvent::General(event) => self.render_general(event),
        }
    }

    fn render_package(&self, event: &PackageEvent) -> Option<Output> {
        match event {
            PackageEvent::Banner { name } => Some(Output::Line(self.banner(name))),
            PackageEvent::SourceCached { path, .. } => Some(Output::Line(
                self.dim(&format!("Using cached {}", path.display())),
            )),
            PackageEvent::Completed { name } => Some(Output::Line(
                self.green(&format!("Installed {name}")),
            )),
            // The error itself is printed once the run ends.
            PackageEvent::Failed { name, stage, .. } => Some(Output::Error(
                self.red(&format!("{name} failed while {}", stage_activity(*stage))),
            )),
            PackageEvent::StageChanged { name, stage } if self.debug_enabled => {
                Some(Output::Line(self.dim(&format!("{name}: {stage}"))))
            }
            PackageEvent::Extracted { work_dir, .. } if self.debug_enabled => Some(
                Output::Line(self.dim(&format!("Extracted into {}", work_dir.display()))),
            ),
            PackageEvent::Skipped { name } if self.debug_enabled => {
                Some(Output::Line(self.dim(&format!("Skipping disabled {name}"))))
            }
            _ => None,
        }
    }

    fn render_download(&self, event: &DownloadEvent) -> Option<Output> {
        match event {
            DownloadEvent::Started { filename, .. } => {
                Some(Output::Progress(format!("Downloading {filename}: 0 bytes")))
            }
            DownloadEvent::Progress {
                filename,
                bytes_downloaded,
                ..
            } => Some(Output::Progress(format!(
                "Downloading {filename}: {bytes_downloaded} bytes"
            ))),
            DownloadEvent::Completed { .. } => Some(Output::EndProgress),
            DownloadEvent::Retrying { url, reason } => Some(Output::Line(self.yellow(&format!(
                "{reason}; retrying {url} with a browser user agent"
            )))),
            DownloadEvent::Failed { .. } => Some(Output::EndProgress),
        }
    }

    fn render_build(&self, event: &BuildEvent) -> Option<Output> {
        match event {
            BuildEvent::ToolchainDetected {
                tool,
                path: Some(path),
            } if self.debug_enabled => {
                Some(Output::Line(self.dim(&format!("Using {tool} at {path}"))))
            }
            BuildEvent::CommandStarted { package, command, .. } => Some(Output::Line(
                self.bold(&format!("{package} > {command}")),
            )),
            BuildEvent::CommandFailed {
                command, exit_code, ..
            } if self.debug_enabled => {
                let status = exit_code.map_or_else(
                    || "was terminated".to_string(),
                    |code| format!("exited with {code}"),
                );
                Some(Output::Line(self.dim(&format!("`{command}` {status}"))))
            }
            _ => None,
        }
    }

    fn render_general(&self, event: &GeneralEvent) -> Option<Output> {
        match event {
            GeneralEvent::Warning { message } => {
                Some(Output::Line(self.yellow(&format!("Warning: {message}"))))
            }
            GeneralEvent::OperationStarted { .. } | GeneralEvent::OperationCompleted { .. } => None,
        }
    }

    fn banner(&self, name: &str) -> String {
        let rule = "=".repeat(BANNER_WIDTH);
        let text = format!("{rule}\n Building {name}\n{rule}");
        if self.colors_enabled {
            style(text).cyan().bold().to_string()
        } else {
            text
        }
    }

    fn styled(&self, text: &str, apply: fn(StyledObject<String>) -> StyledObject<String>) -> String {
        if self.colors_enabled {
            apply(style(text.to_string())).to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.styled(text, StyledObject::bold)
    }

    fn dim(&self, text: &str) -> String {
        self.styled(text, StyledObject::dim)
    }

    fn green(&self, text: &str) -> String {
        self.styled(text, StyledObject::green)
    }

    fn yellow(&self, text: &str) -> String {
        self.styled(text, StyledObject::yellow)
    }

    fn red(&self, text: &str) -> String {
        self.styled(text, StyledObject::red)
    }
}

fn stage_activity(stage: PackageStage) -> &'static str {
    match stage {
        PackageStage::ResolvingSource => "fetching its source",
        PackageStage::Verified => "extracting",
        PackageStage::Extracted | PackageStage::Building => "building",
        PackageStage::Idle | PackageStage::Failed => "finishing",
    }
}
