//! Erase command implementation

use super::{open_bridge, resolve_range, CmdResult, IndicatifProgress, LinkOptions, Outcome};
use crate::cli::RangeArgs;
use at49prog_core::range::{Mode, RangeRequest};

/// Run the erase command
///
/// Any address bound is rejected before the link is opened: the chip can
/// only be erased as a whole.
pub fn run_erase(link: &LinkOptions, range: &RangeArgs) -> CmdResult<Outcome> {
    let request = RangeRequest {
        mode: Mode::Erase,
        start: range.start,
        end: range.end,
        payload_len: None,
    };
    resolve_range(&request)?;

    let mut bridge = open_bridge(link)?;
    bridge.erase_chip(&mut IndicatifProgress::new())?;
    println!("Chip erase complete");

    Ok(Outcome::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use at49prog_core::error::ConfigError;
    use std::time::Duration;

    fn unreachable_link() -> LinkOptions {
        LinkOptions {
            port: "/nonexistent/at49prog-test-port".to_string(),
            baud: 115_200,
            timeout: Duration::from_millis(10),
        }
    }

    #[test]
    fn test_erase_with_address_fails_before_link() {
        let args = RangeArgs {
            start: Some(0x100),
            end: None,
        };
        let err = run_erase(&unreachable_link(), &args).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::EraseWithAddress)
        );
    }

    #[test]
    fn test_erase_on_dummy() {
        let link = LinkOptions {
            port: crate::commands::DUMMY_PORT.to_string(),
            baud: 115_200,
            timeout: Duration::from_millis(50),
        };
        let outcome = run_erase(&link, &RangeArgs::default()).unwrap();
        assert_eq!(outcome, Outcome::Success);
    }
}
