//! Follows the server's `latest.log` and relays it to the log channel.
//!
//! The file is polled rather than watched: the server rotates it on every boot,
//! and a shrinking file is how rotation is detected.

use std::{collections::BTreeSet, io::SeekFrom, path::PathBuf, sync::Arc, time::Duration};

use tokio::{
    io::{AsyncReadExt, AsyncSeekExt},
    sync::watch,
    time::{Instant, MissedTickBehavior},
};

use crate::{
    error::AppError,
    model::log_event::{ConsoleLine, LogEvent},
    service::notifier::Notifier,
};

/// Incremental reader of an append-only log file.
pub struct LogTail {
    path: PathBuf,
    offset: u64,
    /// Bytes after the last newline; decoded once the line is complete.
    partial: Vec<u8>,
}

impl LogTail {
    /// Starts at the current end of the file so old lines are not replayed.
    pub async fn open_at_end(path: PathBuf) -> Self {
        let offset = tokio::fs::metadata(&path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);

        Self {
            path,
            offset,
            partial: Vec::new(),
        }
    }

    /// Returns the complete lines appended since the last call.
    ///
    /// A missing file yields no lines. A file shorter than the current offset is
    /// treated as rotated and read from the start.
    pub async fn poll(&mut self) -> Result<Vec<String>, AppError> {
        let len = match tokio::fs::metadata(&self.path).await {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if len < self.offset {
            tracing::debug!("{} rotated, reading from start", self.path.display());
            self.offset = 0;
            self.partial.clear();
        }
        if len == self.offset {
            return Ok(Vec::new());
        }

        let mut file = tokio::fs::File::open(&self.path).await?;
        file.seek(SeekFrom::Start(self.offset)).await?;
        let mut buf = Vec::with_capacity((len - self.offset) as usize);
        let read = file.take(len - self.offset).read_to_end(&mut buf).await?;
        self.offset += read as u64;

        self.partial.extend_from_slice(&buf);

        let Some(end) = self.partial.iter().rposition(|&b| b == b'\n') else {
            return Ok(Vec::new());
        };
        let rest = self.partial.split_off(end + 1);
        let complete = std::mem::replace(&mut self.partial, rest);

        Ok(complete
            .split(|&b| b == b'\n')
            .map(|line| String::from_utf8_lossy(line).trim_end_matches('\r').to_string())
            .filter(|line| !line.is_empty())
            .collect())
    }
}

/// Console lines per mirrored message.
const MIRROR_BATCH_LINES: usize = 10;
/// Oldest a pending console batch may get before it is posted.
const MIRROR_BATCH_AGE: Duration = Duration::from_secs(2);
/// Discord rejects messages above this many characters.
const MESSAGE_LIMIT: usize = 2000;

/// What the relay forwards besides player events.
#[derive(Debug, Clone, Default)]
pub struct RelaySettings {
    /// Mirror console lines in batches.
    pub mirror: bool,
    /// Console lines containing any of these are not mirrored.
    pub blacklist: Vec<String>,
}

/// Turns tailed log lines into chat messages and a live player count.
///
/// Player events are announced immediately. Console lines are batched and
/// posted as a code block once the batch is full or old enough.
pub struct LogRelay {
    notifier: Arc<dyn Notifier>,
    settings: RelaySettings,
    batch: Vec<String>,
    batch_started: Option<Instant>,
    online: BTreeSet<String>,
    players: watch::Sender<u32>,
}

impl LogRelay {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        settings: RelaySettings,
        players: watch::Sender<u32>,
    ) -> Self {
        Self {
            notifier,
            settings,
            batch: Vec::new(),
            batch_started: None,
            online: BTreeSet::new(),
            players,
        }
    }

    /// Handles one poll's worth of lines; call it on every tick, even with none.
    pub async fn handle(&mut self, lines: &[String]) {
        for line in lines {
            if let Some(event) = LogEvent::parse(line) {
                self.track(&event);
                self.notifier.log(&event.announcement()).await;
            }

            if self.settings.mirror {
                self.mirror(line).await;
            }
        }

        if self
            .batch_started
            .is_some_and(|started| started.elapsed() >= MIRROR_BATCH_AGE)
        {
            self.flush().await;
        }
    }

    /// Posts the pending console batch, if any.
    pub async fn flush(&mut self) {
        self.batch_started = None;
        if self.batch.is_empty() {
            return;
        }

        let message = code_block(&self.batch.join("\n"));
        self.batch.clear();
        self.notifier.log(&message).await;
    }

    async fn mirror(&mut self, line: &str) {
        let Some(console) = ConsoleLine::parse(line) else {
            return;
        };
        if self
            .settings
            .blacklist
            .iter()
            .any(|pattern| console.message.contains(pattern.as_str()))
        {
            return;
        }

        self.batch.push(console.formatted());
        self.batch_started.get_or_insert_with(Instant::now);

        if self.batch.len() >= MIRROR_BATCH_LINES {
            self.flush().await;
        }
    }

    fn track(&mut self, event: &LogEvent) {
        match event {
            LogEvent::Joined(name) => {
                self.online.insert(name.clone());
            }
            LogEvent::Left(name) => {
                self.online.remove(name);
            }
            // A fresh boot starts with nobody online
            LogEvent::Ready => self.online.clear(),
            LogEvent::Died { .. } => return,
        }

        let count = self.online.len() as u32;
        self.players.send_if_modified(|current| {
            let changed = *current != count;
            *current = count;
            changed
        });
    }
}

/// Wraps console output in a code block that fits one Discord message.
fn code_block(body: &str) -> String {
    const OPEN: &str = "```ansi\n";
    const CLOSE: &str = "\n```";
    let budget = MESSAGE_LIMIT - OPEN.len() - CLOSE.len();

    let body = match body.char_indices().nth(budget) {
        Some((index, _)) => &body[..index],
        None => body,
    };
    format!("{}{}{}", OPEN, body, CLOSE)
}

/// Polls the log forever, feeding every batch of lines to `relay`.
pub async fn run(path: PathBuf, mut relay: LogRelay, interval: Duration) {
    let mut tail = LogTail::open_at_end(path).await;
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let lines = match tail.poll().await {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!("Failed to read server log: {}", e);
                Vec::new()
            }
        };

        relay.handle(&lines).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::notifier::recording::{Destination, RecordingNotifier};
    use test_utils::{builder::TestBuilder, error::TestError, factory, fixture::server_log};

    fn relay(settings: RelaySettings) -> (LogRelay, Arc<RecordingNotifier>, watch::Receiver<u32>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let (players_tx, players_rx) = watch::channel(0);
        let relay = LogRelay::new(notifier.clone(), settings, players_tx);
        (relay, notifier, players_rx)
    }

    /// Tests that existing content is skipped and appended lines are returned.
    ///
    /// Expected: only the lines appended after opening
    #[tokio::test]
    async fn reads_appended_lines() -> Result<(), TestError> {
        let test = TestBuilder::new()
            .with_latest_log(vec![server_log::starting("1.21.1")])
            .build()?;
        let mut tail = LogTail::open_at_end(test.latest_log()).await;

        assert!(tail.poll().await.unwrap().is_empty());

        factory::log::append_lines(
            &test.latest_log(),
            &[server_log::joined("Steve"), server_log::done()],
        )?;

        assert_eq!(
            tail.poll().await.unwrap(),
            vec![server_log::joined("Steve"), server_log::done()]
        );
        assert!(tail.poll().await.unwrap().is_empty());

        Ok(())
    }

    /// Tests that a line written in two parts is returned once complete.
    ///
    /// Expected: nothing for the partial write, the full line afterwards
    #[tokio::test]
    async fn buffers_partial_lines() -> Result<(), TestError> {
        let test = TestBuilder::new().with_latest_log(Vec::new()).build()?;
        let mut tail = LogTail::open_at_end(test.latest_log()).await;

        std::fs::write(test.latest_log(), "[12:00:00] [Server thread/INFO]: Ste")?;
        assert!(tail.poll().await.unwrap().is_empty());

        std::fs::write(
            test.latest_log(),
            "[12:00:00] [Server thread/INFO]: Steve joined the game\n",
        )?;
        assert_eq!(
            tail.poll().await.unwrap(),
            vec![server_log::joined("Steve").replace("12:34:56", "12:00:00")]
        );

        Ok(())
    }

    /// Tests rotation, where the server replaces the log with a shorter file.
    ///
    /// Expected: lines of the new file read from its start
    #[tokio::test]
    async fn detects_rotation() -> Result<(), TestError> {
        let test = TestBuilder::new()
            .with_latest_log(vec![
                server_log::starting("1.21.1"),
                server_log::joined("Steve"),
                server_log::left("Steve"),
            ])
            .build()?;
        let mut tail = LogTail::open_at_end(test.latest_log()).await;

        factory::log::create_log(&test.latest_log(), &[server_log::done()])?;

        assert_eq!(tail.poll().await.unwrap(), vec![server_log::done()]);

        Ok(())
    }

    /// Tests a log that does not exist yet.
    ///
    /// Expected: no lines and no error, then lines once the file appears
    #[tokio::test]
    async fn tolerates_missing_file() -> Result<(), TestError> {
        let test = TestBuilder::new().build()?;
        let mut tail = LogTail::open_at_end(test.latest_log()).await;

        assert!(tail.poll().await.unwrap().is_empty());

        factory::log::create_log(&test.latest_log(), &[server_log::left("Alex")])?;
        assert_eq!(tail.poll().await.unwrap(), vec![server_log::left("Alex")]);

        Ok(())
    }

    /// Tests a multi-byte character split across two polls.
    ///
    /// Expected: the name decoded intact once the line is complete
    #[tokio::test]
    async fn keeps_split_utf8_intact() -> Result<(), TestError> {
        let test = TestBuilder::new().with_latest_log(Vec::new()).build()?;
        let mut tail = LogTail::open_at_end(test.latest_log()).await;

        let line = "[12:00:00] [Server thread/INFO]: Zoë joined the game\n".as_bytes();
        let split = line.iter().position(|&b| b == 0xC3).unwrap() + 1;

        std::fs::write(test.latest_log(), &line[..split])?;
        assert!(tail.poll().await.unwrap().is_empty());

        std::fs::write(test.latest_log(), line)?;
        assert_eq!(
            tail.poll().await.unwrap(),
            vec!["[12:00:00] [Server thread/INFO]: Zoë joined the game".to_string()]
        );

        Ok(())
    }

    /// Tests player events and the online count.
    ///
    /// Expected: announcements in order, count follows joins, leaves and reboots
    #[tokio::test]
    async fn announces_events_and_counts_players() {
        let (mut relay, notifier, players) = relay(RelaySettings::default());

        relay
            .handle(&[
                server_log::joined("Steve"),
                server_log::joined("Alex"),
                server_log::death("Alex", "drowned"),
            ])
            .await;
        assert_eq!(*players.borrow(), 2);

        relay.handle(&[server_log::left("Steve")]).await;
        assert_eq!(*players.borrow(), 1);

        relay.handle(&[server_log::done()]).await;
        assert_eq!(*players.borrow(), 0);

        assert_eq!(
            notifier.to(Destination::Log),
            vec![
                "🚪 **Steve** joined the server".to_string(),
                "🚪 **Alex** joined the server".to_string(),
                "💀 **Alex** died: Alex drowned".to_string(),
                "🚶 **Steve** left the server".to_string(),
                "✅ Server is **ONLINE**!".to_string(),
            ]
        );
    }

    /// Tests console mirroring with a blacklist.
    ///
    /// Expected: one code block once the batch is old enough, filtered lines absent
    #[tokio::test(start_paused = true)]
    async fn mirrors_console_in_batches() {
        let (mut relay, notifier, _players) = relay(RelaySettings {
            mirror: true,
            blacklist: vec!["Can't keep up".to_string()],
        });

        relay
            .handle(&[
                server_log::starting("1.21.1"),
                server_log::warning("Can't keep up! Is the server overloaded?"),
                server_log::warning("Ambiguity between arguments"),
                "not a console line".to_string(),
            ])
            .await;
        assert!(notifier.messages().is_empty());

        tokio::time::advance(MIRROR_BATCH_AGE).await;
        relay.handle(&[]).await;

        assert_eq!(
            notifier.to(Destination::Log),
            vec![
                "```ansi\n[INFO] Starting minecraft server version 1.21.1\n[WARN] Ambiguity between arguments\n```"
                    .to_string()
            ]
        );
    }

    /// Tests that a full batch is posted without waiting.
    ///
    /// Expected: one message per ten lines, the remainder held back
    #[tokio::test(start_paused = true)]
    async fn posts_full_batches_immediately() {
        let (mut relay, notifier, _players) = relay(RelaySettings {
            mirror: true,
            blacklist: Vec::new(),
        });

        let lines: Vec<String> = (0..12)
            .map(|i| server_log::warning(&format!("line {}", i)))
            .collect();
        relay.handle(&lines).await;

        let posted = notifier.to(Destination::Log);
        assert_eq!(posted.len(), 1);
        assert!(posted[0].contains("[WARN] line 9"));
        assert!(!posted[0].contains("line 10"));

        relay.flush().await;
        assert_eq!(notifier.to(Destination::Log).len(), 2);
    }

    #[test]
    fn code_block_fits_one_message() {
        let block = code_block(&"x".repeat(5000));

        assert_eq!(block.chars().count(), MESSAGE_LIMIT);
        assert!(block.ends_with("\n```"));
    }
}
