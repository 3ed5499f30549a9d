//! Release selection by client mod version
//!
//! A release applies to a client when both were built for the same
//! `major.minor` mod line and the release does not require a newer patch than
//! the client runs. The newest applicable release (by `release_version`) wins.

use semver::Version;

use super::{Module, Release};

#[derive(Debug, thiserror::Error)]
#[error("invalid version '{input}': {reason}")]
pub struct VersionError {
    pub input: String,
    pub reason: String,
}

/// Parse a version leniently: `1`, `1.2`, `v1.2.3`, `1.2.3-beta.1`
pub fn parse_lenient(input: &str) -> Result<Version, VersionError> {
    let trimmed = input.trim();
    let raw = trimmed.strip_prefix('v').unwrap_or(trimmed);

    // Pad missing components only when no pre-release/build suffix is present
    let core_len = raw.find(&['-', '+'][..]).unwrap_or(raw.len());
    let dots = raw[..core_len].matches('.').count();
    let padded = if core_len == raw.len() && dots < 2 {
        format!("{raw}{}", ".0".repeat(2 - dots))
    } else {
        raw.to_string()
    };

    Version::parse(&padded).map_err(|e| VersionError {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Select the release applicable to `mod_version`
///
/// Returns `Ok(None)` when no release matches. Any unparseable version, the
/// client's or a stored one, is an error.
pub fn release_for_mod_version<'a>(
    module: &'a Module,
    mod_version: &str,
) -> Result<Option<&'a Release>, VersionError> {
    let client = parse_lenient(mod_version)?;

    let mut best: Option<(Version, &Release)> = None;
    for release in &module.releases {
        let target = parse_lenient(&release.mod_version)?;
        if target.major != client.major || target.minor != client.minor || target > client {
            continue;
        }

        let release_version = parse_lenient(&release.release_version)?;
        let newer = best
            .as_ref()
            .is_none_or(|(current, _)| release_version > *current);
        if newer {
            best = Some((release_version, release));
        }
    }

    Ok(best.map(|(_, release)| release))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(id: u64, release_version: &str, mod_version: &str) -> Release {
        Release {
            id,
            release_version: release_version.to_string(),
            mod_version: mod_version.to_string(),
        }
    }

    fn module(releases: Vec<Release>) -> Module {
        Module {
            id: 1,
            name: "SkyblockAddon".to_string(),
            releases,
        }
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(parse_lenient("1").unwrap(), Version::new(1, 0, 0));
        assert_eq!(parse_lenient("1.2").unwrap(), Version::new(1, 2, 0));
        assert_eq!(parse_lenient("v1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(parse_lenient(" 0.18.4 ").unwrap(), Version::new(0, 18, 4));
        assert!(!parse_lenient("1.2.3-beta.1").unwrap().pre.is_empty());
        assert!(parse_lenient("").is_err());
        assert!(parse_lenient("abc").is_err());
        assert!(parse_lenient("1.x").is_err());
    }

    #[test]
    fn test_matches_same_minor_line() {
        let m = module(vec![
            release(7, "1.0.0", "1.2.0"),
            release(9, "2.0.0", "1.3.0"),
        ]);
        assert_eq!(release_for_mod_version(&m, "1.2").unwrap().unwrap().id, 7);
        assert_eq!(release_for_mod_version(&m, "1.2.5").unwrap().unwrap().id, 7);
        assert_eq!(release_for_mod_version(&m, "1.3.0").unwrap().unwrap().id, 9);
    }

    #[test]
    fn test_picks_newest_release() {
        let m = module(vec![
            release(7, "1.0.0", "1.2.0"),
            release(8, "1.1.0", "1.2.0"),
            release(6, "0.9.0", "1.2.0"),
        ]);
        assert_eq!(release_for_mod_version(&m, "1.2.0").unwrap().unwrap().id, 8);
    }

    #[test]
    fn test_release_requiring_newer_patch_is_skipped() {
        let m = module(vec![
            release(7, "1.0.0", "1.2.0"),
            release(8, "1.1.0", "1.2.3"),
        ]);
        assert_eq!(release_for_mod_version(&m, "1.2.1").unwrap().unwrap().id, 7);
        assert_eq!(release_for_mod_version(&m, "1.2.3").unwrap().unwrap().id, 8);
    }

    #[test]
    fn test_no_applicable_release() {
        let m = module(vec![release(7, "1.0.0", "1.2.0")]);
        assert!(release_for_mod_version(&m, "2.0").unwrap().is_none());
        assert!(release_for_mod_version(&module(Vec::new()), "1.2").unwrap().is_none());
    }

    #[test]
    fn test_invalid_versions_are_errors() {
        let m = module(vec![release(7, "1.0.0", "1.2.0")]);
        let err = release_for_mod_version(&m, "not-a-version").unwrap_err();
        assert_eq!(err.input, "not-a-version");

        let broken = module(vec![release(7, "1.0.0", "garbage")]);
        assert!(release_for_mod_version(&broken, "1.2").is_err());
    }
}
