/// Process-wide tracing setup
///
/// `RUST_LOG` takes a single level name (`error`, `warn`, `info`, `debug`,
/// `trace`). Anything else falls back to info and is reported once the
/// subscriber is live.

use std::env;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_LEVEL: Level = Level::INFO;

/// Level for a `RUST_LOG` value; `Err` carries the rejected text
fn parse_level(value: Option<&str>) -> Result<Level, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(DEFAULT_LEVEL),
        Some(text) => text.parse::<Level>().map_err(|_| text.to_string()),
    }
}

/// Install the fmt subscriber for the whole process
pub fn init_logger() -> Result<(), SetGlobalDefaultError> {
    let requested = env::var("RUST_LOG").ok();
    let parsed = parse_level(requested.as_deref());

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parsed.clone().unwrap_or(DEFAULT_LEVEL))
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Err(rejected) = parsed {
        warn!(rejected, "unknown RUST_LOG level, logging at info");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names() {
        assert_eq!(parse_level(None), Ok(Level::INFO));
        assert_eq!(parse_level(Some("")), Ok(Level::INFO));
        assert_eq!(parse_level(Some("debug")), Ok(Level::DEBUG));
        assert_eq!(parse_level(Some(" WARN ")), Ok(Level::WARN));
        assert_eq!(parse_level(Some("loud")), Err("loud".to_string()));
    }
}
