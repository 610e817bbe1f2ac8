use std::path::{Path, PathBuf};

/// The two DNSSEC key roles.
///
/// Each role has a stable on-disk name that aliases the tool-generated,
/// algorithm-encoded file name, plus the role-specific generation flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    Zsk,
    Ksk,
}

impl KeyRole {
    pub fn name(&self) -> &'static str {
        match self {
            KeyRole::Zsk => "zsk",
            KeyRole::Ksk => "ksk",
        }
    }

    /// Role-specific flags passed to the key generation tool.
    pub fn keygen_flags(&self) -> &'static [&'static str] {
        match self {
            KeyRole::Zsk => &["-b", "2048"],
            KeyRole::Ksk => &["-f", "KSK", "-b", "4096"],
        }
    }
}

/// Whether `name` is usable as a domain directory name directly under the
/// base directory.
///
/// Empty names, `.`/`..`, and anything containing a path separator would
/// resolve outside the domain's own directory (`Path::join` replaces the
/// base entirely for absolute inputs) and are rejected.
pub fn is_valid_zone_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.chars().any(std::path::is_separator)
}

/// Domain name derived from a source zone file path (its basename).
pub fn domain_name(source: &Path) -> String {
    source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Path of the aggregate include file at the base directory level.
pub fn aggregate_config(base_dir: &Path) -> PathBuf {
    base_dir.join("named.conf.local.signed")
}

/// Pure mapping from a domain to every artifact path in its directory.
///
/// Deterministic and side-effect-free; the directory name is always the
/// domain name, so distinct domains never collide.
#[derive(Debug, Clone)]
pub struct DomainPaths {
    name: String,
    dir: PathBuf,
}

impl DomainPaths {
    /// Paths for the domain named after `source`'s basename.
    pub fn from_source(base_dir: &Path, source: &Path) -> Self {
        Self::for_domain(base_dir, &domain_name(source))
    }

    pub fn for_domain(base_dir: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            dir: base_dir.join(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Canonical copy of the user-authored zone file.
    pub fn original_zone(&self) -> PathBuf {
        self.dir.join("original.zone")
    }

    /// Unsigned zone with `$INCLUDE` key directives appended.
    pub fn unsigned_zone(&self) -> PathBuf {
        self.dir.join("include_keys.zone")
    }

    pub fn signed_zone(&self) -> PathBuf {
        self.dir.join("signed.zone")
    }

    /// Snapshot of the signed zone, present iff the domain is frozen.
    pub fn freeze_marker(&self) -> PathBuf {
        self.dir.join("signed.zone.freezed")
    }

    /// Per-domain server configuration fragment.
    pub fn named_block(&self) -> PathBuf {
        self.dir.join("named.block")
    }

    /// Stable alias for a key file, e.g. `zsk.key` or `ksk.private`.
    pub fn key_file(&self, role: KeyRole, ext: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", role.name(), ext))
    }
}
