//! Name-Version-Release parsing.
//!
//! Splits identifiers like `1:net-snmp-5.3.2.2-5.el5` into their parts.
//! Accepted forms: `N-V-R`, `E:N-V-R`, `N-V-R:E` and `N-E:V-R`, optionally
//! prefixed by a path.
//!
//! The name is whatever is left after taking the rightmost two dash-separated
//! fields, so `openmpi-1.10-1.10.2-2.el6` yields the name `openmpi-1.10`.
//! Names that end in something version-like are therefore indistinguishable
//! from a real version field; that ambiguity is accepted.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::CoreError;

/// Parsed N-V-R identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nvr {
    pub name: String,
    pub version: String,
    pub release: String,
    /// Numeric epoch, as written. `None` when the identifier has none.
    pub epoch: Option<String>,
}

impl Nvr {
    /// Parse an identifier, failing on anything that is not one of the
    /// accepted forms.
    pub fn parse(identifier: &str) -> Result<Self, CoreError> {
        debug!("Parsing NVR");
        let nvre = identifier
            .rsplit_once('/')
            .map_or(identifier, |(_, file)| file);

        let (nvr, mut epoch) = split_epoch(nvre)?;

        debug!("Splitting NVR parts");
        let parts: Vec<&str> = nvr.rsplitn(3, '-').collect();
        let [release, version, name] = parts.as_slice() else {
            return Err(CoreError::InvalidNvr {
                message: format!("Invalid NVR: {nvr}"),
            });
        };
        let mut version = *version;

        if epoch.is_empty() {
            if let Some((e, v)) = version.split_once(':') {
                debug!("Parsing E:V");
                epoch = e;
                version = v;
            }
        }

        if !epoch.is_empty() && epoch.parse::<i64>().is_err() {
            return Err(CoreError::InvalidNvr {
                message: format!("Invalid epoch '{epoch}' in '{nvr}'"),
            });
        }

        Ok(Self {
            name: (*name).to_owned(),
            version: version.to_owned(),
            release: (*release).to_owned(),
            epoch: (!epoch.is_empty()).then(|| epoch.to_owned()),
        })
    }
}

/// Separate an `E:` prefix or `:E` suffix from the N-V-R core.
///
/// Returns the core and the epoch (empty when none was split off). For the
/// `N-E:V-R` form the whole string is returned and the epoch is picked up
/// later from the version field.
fn split_epoch(nvre: &str) -> Result<(&str, &str), CoreError> {
    let Some((left, right)) = nvre.rsplit_once(':') else {
        debug!("No epoch to split");
        return Ok((nvre, ""));
    };
    debug!("Splitting NVR and Epoch");
    if left.contains(':') {
        return Err(CoreError::InvalidNvr {
            message: format!("Invalid NVRE: {nvre}"),
        });
    }

    if right.contains('-') {
        if left.contains('-') {
            // N-E:V-R
            Ok((nvre, ""))
        } else {
            // E:N-V-R
            Ok((right, left))
        }
    } else {
        // N-V-R:E
        Ok((left, right))
    }
}

impl FromStr for Nvr {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Nvr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(epoch) = &self.epoch {
            write!(f, "{epoch}:")?;
        }
        write!(f, "{}-{}-{}", self.name, self.version, self.release)
    }
}

/// Parse an identifier into its parts.
pub fn parse_nvr(identifier: &str) -> Result<Nvr, CoreError> {
    Nvr::parse(identifier)
}

/// The image name out of a full identifier; empty for a missing or empty input.
pub fn get_image_name(image: Option<&str>) -> Result<String, CoreError> {
    match image {
        None | Some("") => Ok(String::new()),
        Some(image) => Nvr::parse(image).map(|nvr| nvr.name),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn nvr(name: &str, version: &str, release: &str, epoch: Option<&str>) -> Nvr {
        Nvr {
            name: name.into(),
            version: version.into(),
            release: release.into(),
            epoch: epoch.map(Into::into),
        }
    }

    #[test]
    fn parses_every_epoch_placement() {
        let plain = nvr("net-snmp", "5.3.2.2", "5.el5", None);
        let with_epoch = nvr("net-snmp", "5.3.2.2", "5.el5", Some("1"));

        assert_eq!(parse_nvr("net-snmp-5.3.2.2-5.el5").unwrap(), plain);
        for input in [
            "1:net-snmp-5.3.2.2-5.el5",
            "net-snmp-1:5.3.2.2-5.el5",
            "net-snmp-5.3.2.2-5.el5:1",
            "/net-snmp-5.3.2.2-5.el5:1",
            "/1:net-snmp-5.3.2.2-5.el5",
            "foo/net-snmp-5.3.2.2-5.el5:1",
            "foo/1:net-snmp-5.3.2.2-5.el5",
            "/foo/bar/net-snmp-5.3.2.2-5.el5:1",
            "/foo/bar/1:net-snmp-5.3.2.2-5.el5",
        ] {
            assert_eq!(parse_nvr(input).unwrap(), with_epoch, "input: {input}");
        }
    }

    #[test]
    fn name_may_contain_a_version_like_segment() {
        assert_eq!(
            parse_nvr("openmpi-1.10-1.10.2-2.el6").unwrap(),
            nvr("openmpi-1.10", "1.10.2", "2.el6", None)
        );
    }

    #[test]
    fn rejects_malformed_identifiers() {
        for input in [
            "net-snmp",
            "net-snmp-5.3.2.2-1:5.el5",
            "1:net-snmp-5.3.2.2-5.el5:1",
            "1:net-snmp-1:5.3.2.2-5.el5",
            "net-snmp-1:5.3.2.2-5.el5:1",
            "1:net-snmp-1:5.3.2.2-5.el5:1",
        ] {
            let err = parse_nvr(input).unwrap_err();
            assert!(
                matches!(err, CoreError::InvalidNvr { .. }),
                "input {input} gave {err:?}"
            );
        }
    }

    #[test]
    fn non_numeric_epoch_is_reported() {
        let err = parse_nvr("x:net-snmp-5.3.2.2-5.el5").unwrap_err();
        assert!(err.to_string().contains("Invalid epoch 'x'"));
    }

    #[test]
    fn display_puts_epoch_first() {
        let parsed: Nvr = "net-snmp-5.3.2.2-5.el5:1".parse().unwrap();
        assert_eq!(parsed.to_string(), "1:net-snmp-5.3.2.2-5.el5");
    }

    #[test]
    fn image_name_helper() {
        assert_eq!(
            get_image_name(Some("sample-product-8.0-1.raw.xz")).unwrap(),
            "sample-product"
        );
        assert_eq!(
            get_image_name(Some("/foo/bar/1:net-snmp-5.3.2.2-5.el5")).unwrap(),
            "net-snmp"
        );
        assert_eq!(get_image_name(None).unwrap(), "");
        assert_eq!(get_image_name(Some("")).unwrap(), "");
        assert!(get_image_name(Some("net-snmp")).is_err());
    }
}
