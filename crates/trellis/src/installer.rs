//! shadcn/ui component installation through `npx`.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Components published in the shadcn registry.
pub const SHADCN_COMPONENTS: &[&str] = &[
    "accordion",
    "alert",
    "alert-dialog",
    "aspect-ratio",
    "avatar",
    "badge",
    "breadcrumb",
    "button",
    "calendar",
    "card",
    "carousel",
    "chart",
    "checkbox",
    "collapsible",
    "command",
    "context-menu",
    "data-table",
    "date-picker",
    "dialog",
    "drawer",
    "dropdown-menu",
    "form",
    "hover-card",
    "input",
    "input-otp",
    "label",
    "menubar",
    "navigation-menu",
    "pagination",
    "popover",
    "progress",
    "radio-group",
    "resizable",
    "scroll-area",
    "select",
    "separator",
    "sheet",
    "sidebar",
    "skeleton",
    "slider",
    "sonner",
    "switch",
    "table",
    "tabs",
    "textarea",
    "toast",
    "toggle",
    "toggle-group",
    "tooltip",
];

/// Per-component install timeout.
pub const INSTALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors from running an external command.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("npx not found. Please install Node.js.")]
    NotFound,

    #[error("Timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Exit status and captured stderr of a finished command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub success: bool,
    pub stderr: String,
}

/// Runs external programs on behalf of the installer.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput, InstallError>;
}

/// Spawns real processes, killing any that outlive the timeout.
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(INSTALL_TIMEOUT)
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput, InstallError> {
        let mut child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => InstallError::NotFound,
                _ => InstallError::Io(e),
            })?;

        let stderr_reader = child.stderr.take().map(|mut stderr| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf);
                buf
            })
        });

        let start = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if start.elapsed() >= self.timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(InstallError::Timeout(self.timeout));
            }
            std::thread::sleep(Duration::from_millis(100));
        };

        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        Ok(CommandOutput {
            success: status.success(),
            stderr,
        })
    }
}

fn ui_dir(project: &Path) -> PathBuf {
    project.join("src").join("components").join("ui")
}

/// Known components with a `.tsx` file under `src/components/ui`, sorted.
pub fn installed_components(project: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(ui_dir(project)) else {
        return Vec::new();
    };

    let mut installed: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "tsx"))
        .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
        .filter(|name| SHADCN_COMPONENTS.contains(&name.as_str()))
        .collect();
    installed.sort();
    installed
}

/// Entries of `required` not yet installed, in the order given.
pub fn missing_components<'a>(required: &'a [String], project: &Path) -> Vec<&'a str> {
    let installed = installed_components(project);
    required
        .iter()
        .map(String::as_str)
        .filter(|name| !installed.iter().any(|i| i == name))
        .collect()
}

/// Install one component with `npx shadcn@latest add`.
pub fn install_component(runner: &dyn CommandRunner, name: &str, project: &Path) -> bool {
    if !SHADCN_COMPONENTS.contains(&name) {
        tracing::warn!("'{}' is not a known shadcn component", name);
    }

    match runner.run(
        "npx",
        &["shadcn@latest", "add", name, "--yes", "--overwrite"],
        project,
    ) {
        Ok(output) if output.success => {
            tracing::info!("Installed {}", name);
            true
        }
        Ok(output) => {
            let stderr: String = output.stderr.chars().take(200).collect();
            tracing::error!("Failed to install {}: {}", name, stderr.trim());
            false
        }
        Err(e) => {
            tracing::error!("Failed to install {}: {}", name, e);
            false
        }
    }
}

/// Install every missing entry of `required`, returning `(installed, failed)`.
pub fn ensure_components(
    runner: &dyn CommandRunner,
    required: &[String],
    project: &Path,
) -> (usize, usize) {
    if required.is_empty() {
        return (0, 0);
    }

    let missing = missing_components(required, project);
    if missing.is_empty() {
        tracing::info!("All {} required components already installed", required.len());
        return (0, 0);
    }

    tracing::info!("Installing {} missing component(s)...", missing.len());

    let mut installed = 0;
    let mut failed = 0;
    for name in missing {
        if install_component(runner, name, project) {
            installed += 1;
        } else {
            failed += 1;
        }
    }

    (installed, failed)
}

/// Append `export * from './ui/<name>'` to `src/components/index.ts` for
/// installed components not yet exported.
///
/// Returns the number of exports added.
pub fn update_component_exports(project: &Path) -> io::Result<usize> {
    let index_path = project.join("src").join("components").join("index.ts");
    let current = fs::read_to_string(&index_path)?;

    let missing: Vec<String> = installed_components(project)
        .into_iter()
        .filter(|name| !current.contains(&format!("from './ui/{}'", name)))
        .collect();
    if missing.is_empty() {
        return Ok(0);
    }

    let mut updated = current;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str("\n// Auto-added component exports\n");
    for name in &missing {
        updated.push_str(&format!("export * from './ui/{}'\n", name));
    }
    fs::write(&index_path, updated)?;

    Ok(missing.len())
}
