/// Player list parsed from the RCON `list` reply.
///
/// Vanilla replies look like
/// `There are 2 of a max of 20 players online: Steve, Alex`; older servers and
/// some forks use `There are 2/20 players online:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerList {
    pub online: u32,
    pub max: Option<u32>,
    pub names: Vec<String>,
}

impl PlayerList {
    /// Parses a `list` reply, returning `None` for anything unrecognised.
    pub fn parse(reply: &str) -> Option<Self> {
        let rest = reply.trim().strip_prefix("There are ")?;
        let (counts, names) = match rest.split_once(':') {
            Some((counts, names)) => (counts, names),
            None => (rest, ""),
        };

        let mut words = counts.split_whitespace();
        let first = words.next()?;

        let (online, max) = if let Some((online, max)) = first.split_once('/') {
            (online.parse().ok()?, max.parse().ok())
        } else {
            let online = first.parse().ok()?;
            // "of a max of N"
            let max = counts
                .split_whitespace()
                .skip_while(|word| *word != "max")
                .nth(2)
                .and_then(|word| word.parse().ok());
            (online, max)
        };

        let names = names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        Some(Self { online, max, names })
    }

    /// One-line summary, e.g. `2/20 online: Steve, Alex`.
    pub fn summary(&self) -> String {
        let capacity = match self.max {
            Some(max) => format!("{}/{}", self.online, max),
            None => self.online.to_string(),
        };

        if self.names.is_empty() {
            format!("{} online", capacity)
        } else {
            format!("{} online: {}", capacity, self.names.join(", "))
        }
    }
}
