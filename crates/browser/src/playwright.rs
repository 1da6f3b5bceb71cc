use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::session::{Browser, BrowserError, BrowserSession, Navigation};
use agent_core::config::BrowserConfig;

const SCRIPT: &str = r#"
const fs = require('fs');

function out(obj) { process.stdout.write(JSON.stringify(obj)); }

async function main() {
  const req = JSON.parse(fs.readFileSync(0, 'utf8'));
  let pw;
  try { pw = require('playwright'); } catch (e) {
    return out({ ok: false, code: 'launch', message: 'Playwright is not installed for Node.js' });
  }

  let context;
  try {
    context = await pw.chromium.launchPersistentContext(req.profile_dir, {
      headless: true,
      userAgent: req.user_agent,
    });
    const page = context.pages()[0] || await context.newPage();
    const resp = await page.goto(req.url, { waitUntil: 'domcontentloaded', timeout: req.page_timeout_ms });
    try { await page.waitForLoadState('networkidle', { timeout: Math.min(5000, req.page_timeout_ms) }); } catch (_) {}

    let selectorFound = null;
    if (req.wait_for) {
      try {
        await page.waitForSelector(req.wait_for, { timeout: req.selector_timeout_ms });
        selectorFound = true;
      } catch (_) {
        selectorFound = false;
      }
    }

    out({
      ok: true,
      final_url: page.url(),
      status: resp ? resp.status() : null,
      selector_found: selectorFound,
      html: await page.content(),
    });
  } catch (e) {
    const code = (e && e.name === 'TimeoutError') ? 'timeout' : 'navigation';
    out({ ok: false, code, message: String(e && e.message ? e.message : e) });
  } finally {
    try { if (context) await context.close(); } catch (_) {}
  }
}

main().catch((e) => out({ ok: false, code: 'navigation', message: String(e) }));
"#;

#[derive(Debug, Deserialize)]
struct ScriptOutput {
    ok: bool,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    final_url: Option<String>,
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    selector_found: Option<bool>,
    #[serde(default)]
    html: String,
}

/// Headless Chromium driven through Node and Playwright. Each session owns a temporary
/// profile directory, so cookies carry over between navigations of the same session.
pub struct PlaywrightBrowser {
    node_bin: String,
    user_agent: String,
    page_timeout: Duration,
    selector_timeout: Duration,
}

impl PlaywrightBrowser {
    pub fn new(config: &BrowserConfig) -> Self {
        Self {
            node_bin: config
                .node_bin
                .clone()
                .unwrap_or_else(|| "node".to_string()),
            user_agent: config.user_agent.clone(),
            page_timeout: Duration::from_secs(config.page_timeout_secs),
            selector_timeout: Duration::from_secs(config.selector_timeout_secs),
        }
    }
}

#[async_trait]
impl Browser for PlaywrightBrowser {
    async fn new_session(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let profile = tempfile::Builder::new()
            .prefix("research-agent-profile-")
            .tempdir()
            .map_err(|e| BrowserError::Launch(format!("profile directory: {e}")))?;

        Ok(Box::new(PlaywrightSession {
            profile,
            node_bin: self.node_bin.clone(),
            user_agent: self.user_agent.clone(),
            page_timeout: self.page_timeout,
            selector_timeout: self.selector_timeout,
            html: String::new(),
        }))
    }
}

struct PlaywrightSession {
    profile: TempDir,
    node_bin: String,
    user_agent: String,
    page_timeout: Duration,
    selector_timeout: Duration,
    html: String,
}

impl PlaywrightSession {
    fn hard_timeout(&self) -> Duration {
        self.page_timeout + self.selector_timeout + Duration::from_secs(15)
    }

    async fn run_script(
        &self,
        url: &str,
        wait_for: Option<&str>,
    ) -> Result<ScriptOutput, BrowserError> {
        let args = serde_json::json!({
            "url": url,
            "wait_for": wait_for,
            "profile_dir": self.profile.path(),
            "user_agent": self.user_agent,
            "page_timeout_ms": self.page_timeout.as_millis() as u64,
            "selector_timeout_ms": self.selector_timeout.as_millis() as u64,
        })
        .to_string();

        let mut child = tokio::process::Command::new(&self.node_bin)
            .arg("-e")
            .arg(SCRIPT)
            .kill_on_drop(true)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BrowserError::Launch(format!("{}: {e}", self.node_bin)))?;

        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(args.as_bytes()).await;
            let _ = stdin.shutdown().await;
        }

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| BrowserError::Launch("missing stdout pipe".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| BrowserError::Launch("missing stderr pipe".to_string()))?;

        let stdout_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stdout.read_to_end(&mut buf).await;
            buf
        });
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            buf
        });

        let hard_timeout = self.hard_timeout();
        match tokio::time::timeout(hard_timeout, child.wait()).await {
            Ok(status) => {
                status.map_err(|e| BrowserError::Launch(e.to_string()))?;
            }
            Err(_) => {
                let _ = child.kill().await;
                let _ = child.wait().await;
                stdout_task.abort();
                stderr_task.abort();
                return Err(BrowserError::Timeout {
                    url: url.to_string(),
                    secs: hard_timeout.as_secs(),
                });
            }
        }

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        serde_json::from_slice(&stdout).map_err(|e| BrowserError::Navigation {
            url: url.to_string(),
            message: format!(
                "browser script returned invalid output: {e}. stderr: {}",
                String::from_utf8_lossy(&stderr).trim()
            ),
        })
    }
}

#[async_trait]
impl BrowserSession for PlaywrightSession {
    async fn goto(
        &mut self,
        url: &str,
        wait_for: Option<&str>,
    ) -> Result<Navigation, BrowserError> {
        reqwest::Url::parse(url).map_err(|_| BrowserError::InvalidUrl(url.to_string()))?;

        let output = self.run_script(url, wait_for).await?;
        into_navigation(url, output, self.page_timeout).map(|(navigation, html)| {
            self.html = html;
            navigation
        })
    }

    fn content(&self) -> &str {
        &self.html
    }
}

fn into_navigation(
    url: &str,
    output: ScriptOutput,
    page_timeout: Duration,
) -> Result<(Navigation, String), BrowserError> {
    if !output.ok {
        let message = output
            .message
            .unwrap_or_else(|| "browser script failed".to_string());
        return Err(match output.code.as_deref() {
            Some("timeout") => BrowserError::Timeout {
                url: url.to_string(),
                secs: page_timeout.as_secs(),
            },
            Some("launch") => BrowserError::Launch(message),
            _ => BrowserError::Navigation {
                url: url.to_string(),
                message,
            },
        });
    }

    let navigation = Navigation {
        final_url: output.final_url.unwrap_or_else(|| url.to_string()),
        status: output.status,
        selector_found: output.selector_found,
    };
    Ok((navigation, output.html))
}
