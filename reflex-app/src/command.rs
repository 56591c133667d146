use reflex_core::{Difficulty, Mode};
use reflex_store::{ModeFilter, UserType};
use std::str::FromStr;

/// One line of console input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A bare Enter.
    Tap,
    Login { name: String, user_type: UserType },
    Logout,
    Play { mode: Mode, difficulty: Option<Difficulty> },
    Recall(u32),
    /// Abandon the running session.
    Stop,
    Ranking(ModeFilter),
    History,
    Session,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Command::Tap);
        }
        if let Ok(sum) = line.parse::<u32>() {
            return Ok(Command::Recall(sum));
        }

        let mut words: Vec<&str> = line.split_whitespace().collect();
        let verb = words.remove(0).to_ascii_lowercase();
        match verb.as_str() {
            "login" => {
                let user_type = match words.last().map(|w| w.parse::<UserType>()) {
                    Some(Ok(t)) if words.len() > 1 => {
                        words.pop();
                        t
                    }
                    _ => UserType::default(),
                };
                if words.is_empty() {
                    return Err("usage: login <name> [student|adult]".to_string());
                }
                Ok(Command::Login {
                    name: words.join(" "),
                    user_type,
                })
            }
            "logout" => Ok(Command::Logout),
            "play" => {
                let mode = words
                    .first()
                    .ok_or("usage: play <simple|sprint|color|dual> [easy|medium|hard]")?
                    .parse::<Mode>()?;
                let difficulty = words.get(1).map(|d| d.parse::<Difficulty>()).transpose()?;
                Ok(Command::Play { mode, difficulty })
            }
            "recall" => words
                .first()
                .and_then(|w| w.parse::<u32>().ok())
                .map(Command::Recall)
                .ok_or_else(|| "usage: recall <sum>".to_string()),
            "stop" => Ok(Command::Stop),
            "ranking" | "rank" => {
                let filter = words.first().map(|w| w.parse::<ModeFilter>()).transpose()?;
                Ok(Command::Ranking(filter.unwrap_or_default()))
            }
            "history" => Ok(Command::History),
            "session" => Ok(Command::Session),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command '{other}', try 'help'")),
        }
    }
}

pub const HELP: &str = "\
Commands:
  login <name> [student|adult]   sign in (name up to 20 characters)
  play <mode> [difficulty]       simple, sprint, color or dual; easy, medium or hard
  <Enter>                        tap
  recall <sum> | <sum>           answer the dual-task digit sum
  stop                           abandon the running session
  ranking [all|<mode>]           top 50 by reaction time
  history                        your records
  session                        current training session
  logout, help, quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_is_tap() {
        assert_eq!("".parse::<Command>(), Ok(Command::Tap));
        assert_eq!("   ".parse::<Command>(), Ok(Command::Tap));
    }

    #[test]
    fn test_login_parsing() {
        assert_eq!(
            "login Mio Tanaka adult".parse::<Command>(),
            Ok(Command::Login {
                name: "Mio Tanaka".to_string(),
                user_type: UserType::Adult,
            })
        );
        assert_eq!(
            "login Mio".parse::<Command>(),
            Ok(Command::Login {
                name: "Mio".to_string(),
                user_type: UserType::Student,
            })
        );
        // a lone word is the name even if it looks like a type
        assert_eq!(
            "login adult".parse::<Command>(),
            Ok(Command::Login {
                name: "adult".to_string(),
                user_type: UserType::Student,
            })
        );
        assert!("login".parse::<Command>().is_err());
    }

    #[test]
    fn test_play_parsing() {
        assert_eq!(
            "play dual hard".parse::<Command>(),
            Ok(Command::Play {
                mode: Mode::Dual,
                difficulty: Some(Difficulty::Hard),
            })
        );
        assert_eq!(
            "PLAY Sprint".parse::<Command>(),
            Ok(Command::Play {
                mode: Mode::Sprint,
                difficulty: None,
            })
        );
        assert!("play".parse::<Command>().is_err());
        assert!("play tennis".parse::<Command>().is_err());
        assert!("play color extreme".parse::<Command>().is_err());
    }

    #[test]
    fn test_recall_and_ranking() {
        assert_eq!("23".parse::<Command>(), Ok(Command::Recall(23)));
        assert_eq!("recall 7".parse::<Command>(), Ok(Command::Recall(7)));
        assert!("recall x".parse::<Command>().is_err());
        assert_eq!("ranking".parse::<Command>(), Ok(Command::Ranking(ModeFilter::All)));
        assert_eq!(
            "ranking color".parse::<Command>(),
            Ok(Command::Ranking(ModeFilter::Only(Mode::Color)))
        );
        assert!("dance".parse::<Command>().is_err());
    }
}
