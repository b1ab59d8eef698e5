/// Death message predicates as printed after the player name.
const DEATH_PHRASES: [&str; 26] = [
    "was slain",
    "was shot",
    "was killed",
    "was blown up",
    "blew up",
    "drowned",
    "experienced kinetic energy",
    "hit the ground",
    "fell from",
    "fell off",
    "fell out of the world",
    "went up in flames",
    "burned to death",
    "walked into fire",
    "tried to swim in lava",
    "was squashed",
    "was pummeled",
    "was pricked",
    "starved to death",
    "suffocated",
    "was impaled",
    "was frozen",
    "withered away",
    "was struck by lightning",
    "was fireballed",
    "died",
];

/// One `[HH:MM:SS] [thread/LEVEL]: message` line of the server console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleLine<'a> {
    pub thread: &'a str,
    pub level: &'a str,
    pub message: &'a str,
}

impl<'a> ConsoleLine<'a> {
    /// Splits a console line; anything not in the vanilla layout is `None`.
    pub fn parse(line: &'a str) -> Option<Self> {
        let rest = line.strip_prefix('[')?;
        let (_time, rest) = rest.split_once("] [")?;
        let (source, message) = rest.split_once("]: ")?;
        let (thread, level) = source.rsplit_once('/')?;

        Some(Self {
            thread,
            level,
            message: message.trim_end(),
        })
    }

    /// `[LEVEL] message`, the form mirrored into chat.
    pub fn formatted(&self) -> String {
        format!("[{}] {}", self.level, self.message)
    }
}

/// Events of interest in the server's `latest.log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    Joined(String),
    Left(String),
    Died {
        player: String,
        /// Full death message, e.g. `Steve was slain by Zombie`.
        message: String,
    },
    /// `Done (12.3s)! For help, type "help"` - the server accepts connections.
    Ready,
}

impl LogEvent {
    /// Recognises a single log line.
    ///
    /// Only INFO messages count, and names must look like Minecraft names, so a
    /// player typing "Steve joined the game" in chat does not produce an event.
    pub fn parse(line: &str) -> Option<Self> {
        let console = ConsoleLine::parse(line)?;
        if console.level != "INFO" {
            return None;
        }
        let message = console.message;

        if message.starts_with("Done (") && message.contains("For help") {
            return Some(LogEvent::Ready);
        }
        if let Some(name) = message.strip_suffix(" joined the game") {
            return player_name(name).map(LogEvent::Joined);
        }
        if let Some(name) = message.strip_suffix(" left the game") {
            return player_name(name).map(LogEvent::Left);
        }

        let (name, rest) = message.split_once(' ')?;
        if DEATH_PHRASES.iter().any(|phrase| rest.starts_with(phrase)) {
            return player_name(name).map(|player| LogEvent::Died {
                player,
                message: message.to_string(),
            });
        }

        None
    }

    /// Chat line posted to the log channel.
    pub fn announcement(&self) -> String {
        match self {
            LogEvent::Joined(name) => format!("🚪 **{}** joined the server", name),
            LogEvent::Left(name) => format!("🚶 **{}** left the server", name),
            LogEvent::Died { player, message } => format!("💀 **{}** died: {}", player, message),
            LogEvent::Ready => "✅ Server is **ONLINE**!".to_string(),
        }
    }
}

/// Minecraft names are at most 16 word characters; anything else is chat or plugin noise.
fn player_name(candidate: &str) -> Option<String> {
    let valid = (1..=16).contains(&candidate.len())
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

    valid.then(|| candidate.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixture::server_log;

    #[test]
    fn recognises_join_leave_and_ready() {
        assert_eq!(
            LogEvent::parse(&server_log::joined("Steve")),
            Some(LogEvent::Joined("Steve".to_string()))
        );
        assert_eq!(
            LogEvent::parse(&server_log::left("Alex_99")),
            Some(LogEvent::Left("Alex_99".to_string()))
        );
        assert_eq!(LogEvent::parse(&server_log::done()), Some(LogEvent::Ready));
    }

    #[test]
    fn recognises_deaths() {
        assert_eq!(
            LogEvent::parse(&server_log::death("Steve", "was slain by Zombie")),
            Some(LogEvent::Died {
                player: "Steve".to_string(),
                message: "Steve was slain by Zombie".to_string(),
            })
        );
        assert!(matches!(
            LogEvent::parse(&server_log::death("Alex", "fell from a high place")),
            Some(LogEvent::Died { .. })
        ));
        // Entity deaths are logged with a description, not a player name
        assert_eq!(
            LogEvent::parse(&server_log::death(
                "Villager",
                "EntityVillager['Villager'/42] died, message: 'Villager was slain'"
            )),
            None
        );
    }

    #[test]
    fn ignores_chat_and_other_lines() {
        assert_eq!(
            LogEvent::parse(&server_log::chat("Steve", "Alex joined the game")),
            None
        );
        assert_eq!(LogEvent::parse(&server_log::chat("Steve", "I died")), None);
        assert_eq!(LogEvent::parse(&server_log::starting("1.21.1")), None);
        assert_eq!(LogEvent::parse(&server_log::warning("Steve died")), None);
        assert_eq!(LogEvent::parse("garbage"), None);
    }

    #[test]
    fn splits_console_lines() {
        let line = server_log::warning("Can't keep up!");
        let console = ConsoleLine::parse(&line).unwrap();

        assert_eq!(console.thread, "Server thread");
        assert_eq!(console.level, "WARN");
        assert_eq!(console.formatted(), "[WARN] Can't keep up!");
        assert_eq!(ConsoleLine::parse("java.lang.NullPointerException"), None);
    }

    #[test]
    fn announcements() {
        assert_eq!(
            LogEvent::Joined("Steve".to_string()).announcement(),
            "🚪 **Steve** joined the server"
        );
        assert_eq!(LogEvent::Ready.announcement(), "✅ Server is **ONLINE**!");
    }
}
