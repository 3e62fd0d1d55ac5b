//! Transpiler port and the external-command implementation

use crate::error::TransformError;
use crate::logger;
use crate::BoxFuture;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Turns JSX source into plain JavaScript
///
/// Caching, if any, is the implementation's concern.
pub trait JsxTransformer: Send + Sync {
    /// Transform `source`, identified by `path`, into output text
    fn transform<'a>(
        &'a self,
        path: &'a str,
        source: &'a str,
    ) -> BoxFuture<'a, Result<String, TransformError>>;
}

/// Placeholder in argument lists replaced by the request path
const PATH_PLACEHOLDER: &str = "{path}";

/// Pipes source through an external tool, e.g. `esbuild --loader=jsx`
///
/// The source is written to the tool's stdin and its stdout is the output.
/// A non-zero exit status is reported with the tool's stderr.
#[derive(Debug, Clone)]
pub struct CommandTransformer {
    program: String,
    args: Vec<String>,
}

impl CommandTransformer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, path: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args.iter().map(|a| a.replace(PATH_PLACEHOLDER, path)))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl JsxTransformer for CommandTransformer {
    fn transform<'a>(
        &'a self,
        path: &'a str,
        source: &'a str,
    ) -> BoxFuture<'a, Result<String, TransformError>> {
        Box::pin(async move {
            let io_err = |source| TransformError::Io {
                path: path.to_string(),
                source,
            };

            let mut child = self.command(path).spawn().map_err(io_err)?;
            let mut stdin = child.stdin.take();

            // Feed stdin while draining stdout so large files cannot deadlock
            let write = async {
                if let Some(pipe) = stdin.as_mut() {
                    pipe.write_all(source.as_bytes()).await?;
                    pipe.shutdown().await?;
                }
                drop(stdin);
                Ok::<(), std::io::Error>(())
            };
            let (written, output) = tokio::join!(write, child.wait_with_output());
            let output = output.map_err(io_err)?;

            if !output.status.success() {
                let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
                logger::log_warning(&format!(
                    "Transformer '{}' failed for {path}: {message}",
                    self.program
                ));
                return Err(TransformError::Failed {
                    path: path.to_string(),
                    message: if message.is_empty() {
                        format!("exited with {}", output.status)
                    } else {
                        message
                    },
                });
            }
            // A closed stdin only matters when the tool did not succeed
            if let Err(e) = written {
                logger::log_debug(&format!("Transformer closed stdin early for {path}: {e}"));
            }

            String::from_utf8(output.stdout).map_err(|_| TransformError::InvalidUtf8 {
                path: path.to_string(),
            })
        })
    }
}
