use anyhow::{Context, Result, anyhow};
use std::process::Stdio;
use tokio::{
  io::BufReader as TokioBufReader,
  io::AsyncBufReadExt,
  process::{Child as TokioChild, Command},
  sync::mpsc,
  task::JoinHandle,
};
use tracing::info;

/// What `mpv` is currently playing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
  pub channel_id: i64,
  pub title: String,
  pub url: String,
}

/// Platform command that opens a URL in the default browser.
pub fn opener_command() -> &'static str {
  #[cfg(target_os = "macos")]
  let cmd = "open";
  #[cfg(not(target_os = "macos"))]
  let cmd = "xdg-open";
  cmd
}

/// Open `url` in the default browser without waiting for it.
pub fn open_in_browser(url: &str) -> Result<()> {
  let mut child = std::process::Command::new(opener_command())
    .arg(url)
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn()
    .with_context(|| format!("Failed to open browser with {}", opener_command()))?;
  // Reap the child in a background thread to avoid zombie processes.
  std::thread::spawn(move || {
    let _ = child.wait();
  });
  info!(url = %url, "opened in browser");
  Ok(())
}

/// Plays raw stream URLs in an `mpv` window and relays its status line.
#[derive(Default)]
pub struct StreamPlayer {
  current_process: Option<TokioChild>,
  pub now_playing: Option<NowPlaying>,
  mpv_monitor_handle: Option<JoinHandle<()>>,
  mpv_status_rx: Option<mpsc::Receiver<String>>,
  last_mpv_status: Option<String>,
  ipc_socket_path: Option<String>,
  pub paused: bool,
}

impl StreamPlayer {
  pub fn is_playing(&self) -> bool {
    self.current_process.is_some()
  }

  pub fn check_mpv_status(&mut self) {
    if let Some(rx) = &mut self.mpv_status_rx {
      while let Ok(status) = rx.try_recv() {
        self.last_mpv_status = Some(status);
      }
    }
  }

  pub fn last_mpv_status(&self) -> Option<&str> {
    self.last_mpv_status.as_deref()
  }

  pub async fn play(&mut self, now_playing: NowPlaying) -> Result<()> {
    self.stop().await.context("Failed to stop previous playback")?;
    self.paused = false;

    let socket_path = std::env::temp_dir().join(format!("televe-mpv-{}.sock", std::process::id()));
    let socket_path_str = socket_path.to_str().context("Temp dir path is not valid UTF-8")?.to_string();
    // Remove stale socket if it exists from a previous crash.
    let _ = std::fs::remove_file(&socket_path);

    let mut cmd = Command::new("mpv");
    cmd.args([
      "--force-window=yes",
      &format!("--title={}", now_playing.title),
      "--term-status-msg=${time-pos} | ${media-title} | ${pause} | cache ${demuxer-cache-duration}s",
      &format!("--input-ipc-server={}", socket_path_str),
      "--",
      &now_playing.url,
    ]);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    // Send stderr to null: if piped but never drained, the pipe buffer
    // fills and mpv blocks.
    cmd.stderr(Stdio::null());

    let mut child = cmd.spawn().map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        anyhow!("mpv not found. Install it with: brew install mpv (macOS) or apt install mpv (Linux)")
      } else {
        anyhow!(e).context("Failed to spawn mpv process")
      }
    })?;

    let stdout = child.stdout.take().context("Failed to get mpv stdout")?;
    let (tx, rx) = mpsc::channel::<String>(10);
    self.mpv_status_rx = Some(rx);

    let monitor_handle = tokio::spawn(async move {
      let reader = TokioBufReader::new(stdout);
      let mut lines = reader.lines();
      while let Ok(Some(line)) = lines.next_line().await {
        if tx.send(line).await.is_err() {
          break;
        }
      }
    });

    info!(channel = %now_playing.title, url = %now_playing.url, "mpv started");
    self.current_process = Some(child);
    self.now_playing = Some(now_playing);
    self.mpv_monitor_handle = Some(monitor_handle);
    self.ipc_socket_path = Some(socket_path_str);
    Ok(())
  }

  pub async fn toggle_pause(&mut self) -> Result<()> {
    let Some(ref socket_path) = self.ipc_socket_path else {
      return Ok(());
    };
    let stream = tokio::net::UnixStream::connect(socket_path).await.context("Failed to connect to mpv IPC socket")?;
    stream.writable().await.context("mpv IPC socket not writable")?;
    let cmd = b"{\"command\":[\"cycle\",\"pause\"]}\n";
    let written = stream.try_write(cmd).context("Failed to send pause command to mpv")?;
    if written < cmd.len() {
      return Err(anyhow!("Partial write to mpv IPC socket: wrote {} of {} bytes", written, cmd.len()));
    }
    self.paused = !self.paused;
    Ok(())
  }

  pub async fn stop(&mut self) -> Result<()> {
    if let Some(handle) = self.mpv_monitor_handle.take() {
      handle.abort();
      let _ = handle.await;
    }
    self.mpv_status_rx = None;
    self.last_mpv_status = None;

    if let Some(mut child) = self.current_process.take() {
      child.kill().await.context("Failed to kill mpv process")?;
      let _ = child.wait().await;
    }

    self.now_playing = None;
    self.paused = false;

    if let Some(path) = self.ipc_socket_path.take() {
      let _ = std::fs::remove_file(&path);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn opener_matches_platform() {
    if cfg!(target_os = "macos") {
      assert_eq!(opener_command(), "open");
    } else {
      assert_eq!(opener_command(), "xdg-open");
    }
  }

  #[tokio::test]
  async fn stop_when_idle_is_a_no_op() {
    let mut player = StreamPlayer::default();
    assert!(!player.is_playing());
    player.stop().await.unwrap();
    player.toggle_pause().await.unwrap();
    assert!(!player.paused);
    assert_eq!(player.last_mpv_status(), None);
  }
}
