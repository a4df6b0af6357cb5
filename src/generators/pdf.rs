use std::io::{ErrorKind, Read};
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const DEFAULT_RENDERER_BIN: &str = "libreoffice";
pub const DEFAULT_CONVERSION_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Motivo por el que falló un intento de renderizado.
#[derive(Debug, Error)]
pub enum RenderFailure {
    #[error("{tool} not found: {cause}")]
    ToolMissing { tool: String, cause: String },

    #[error("timed out after {}s", elapsed.as_secs())]
    Timeout { elapsed: Duration },

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("failed to run renderer: {0}")]
    Io(#[from] std::io::Error),
}

/// Convierte un DOCX en `<out_dir>/<nombre base>.pdf`.
pub trait PdfRenderer: Send + Sync {
    fn render_to_pdf(&self, input: &Path, out_dir: &Path) -> Result<(), RenderFailure>;

    /// Nombre usado en logs y mensajes de error.
    fn tool_name(&self) -> &str;

    fn timeout(&self) -> Duration;
}

/// Conversión con LibreOffice en modo headless.
#[derive(Debug, Clone)]
pub struct LibreOfficeRenderer {
    binary: String,
    timeout: Duration,
}

impl LibreOfficeRenderer {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        LibreOfficeRenderer {
            binary: binary.into(),
            timeout,
        }
    }

    fn spawn(&self, input: &Path, out_dir: &Path) -> Result<Child, RenderFailure> {
        let mut command = Command::new(&self.binary);
        command
            .arg("--headless")
            .args(["--convert-to", "pdf", "--outdir"])
            .arg(out_dir)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        // Grupo de procesos propio: el lanzador de LibreOffice deja hijos (oosplash, soffice.bin)
        #[cfg(unix)]
        command.process_group(0);

        command.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => RenderFailure::ToolMissing {
                tool: self.binary.clone(),
                cause: e.to_string(),
            },
            _ => RenderFailure::Io(e),
        })
    }

    /// Espera a `child` hasta el plazo; al vencer mata todo su grupo de procesos.
    fn wait_with_deadline(&self, child: &mut Child) -> Result<ExitStatus, RenderFailure> {
        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if started.elapsed() >= self.timeout {
                if let Err(e) = terminate(child) {
                    tracing::warn!("Failed to kill {} after timeout: {}", self.binary, e);
                }
                // Recoger al líder para no dejar zombis
                let _ = child.wait();
                return Err(RenderFailure::Timeout {
                    elapsed: started.elapsed(),
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

#[cfg(unix)]
fn terminate(child: &mut Child) -> std::io::Result<()> {
    // El líder creó el grupo, así que el pgid es su pid
    let pgid = child.id() as libc::pid_t;
    if unsafe { libc::killpg(pgid, libc::SIGKILL) } == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) -> std::io::Result<()> {
    child.kill()
}

impl PdfRenderer for LibreOfficeRenderer {
    fn render_to_pdf(&self, input: &Path, out_dir: &Path) -> Result<(), RenderFailure> {
        tracing::debug!("Running {} on {:?}", self.binary, input);
        let mut child = self.spawn(input, out_dir)?;

        // Leer stderr en otro hilo para que el proceso no se bloquee con el pipe lleno
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf);
                buf
            })
        });

        // Tras matar el grupo nadie conserva el pipe, así que el join no se bloquea
        let waited = self.wait_with_deadline(&mut child);
        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();
        let status = waited?;

        if !status.success() {
            return Err(RenderFailure::Failed {
                tool: self.binary.clone(),
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(())
    }

    fn tool_name(&self) -> &str {
        &self.binary
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
